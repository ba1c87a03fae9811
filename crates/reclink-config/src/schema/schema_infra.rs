//! Browser connection, export and logging settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Chrome connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    /// Launch Chrome headless when reclink has to start it.
    #[serde(default)]
    pub headless: bool,

    /// Profile directory for a launched Chrome (keeps the site login).
    #[serde(default)]
    pub profile_dir: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: false,
            profile_dir: None,
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

/// Report export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_prefix() -> String {
    "recordings".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for rotated log files. Defaults to `~/.reclink/logs`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn log_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| reclink_home().join("logs"))
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// `~/.reclink`, or `.reclink` when there is no home directory.
pub fn reclink_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".reclink"))
        .unwrap_or_else(|| PathBuf::from(".reclink"))
}
