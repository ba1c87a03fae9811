//! Browser manager type definitions and configuration.

use std::path::PathBuf;

use reclink_config::{reclink_home, BrowserConfig};
use reclink_protocols::HostError;
use thiserror::Error;

use crate::cdp::CdpError;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Action failed: {0}")]
    ActionFailed(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Please install Google Chrome.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::ConnectionFailed(msg) | CdpError::ChromeNotAvailable(msg) => {
                BrowserError::ConnectionFailed(msg)
            }
            CdpError::PageNotFound(id) => BrowserError::TabNotFound(id),
            CdpError::JavaScript(msg) => BrowserError::ActionFailed(format!("JS error: {}", msg)),
            CdpError::Timeout(msg) => BrowserError::ActionFailed(format!("Timeout: {}", msg)),
            CdpError::SessionClosed => BrowserError::NotConnected,
            _ => BrowserError::ActionFailed(e.to_string()),
        }
    }
}

impl From<BrowserError> for HostError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::TabNotFound(id) => HostError::TabNotFound(id),
            BrowserError::ActionFailed(msg) => HostError::OperationFailed(msg),
            other => HostError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    /// Chrome debugging port.
    pub debug_port: u16,
    /// Profile directory for persistent login state.
    pub profile_dir: Option<PathBuf>,
    /// Whether to run a launched Chrome headless.
    pub headless: bool,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self::from_config(&BrowserConfig::default())
    }
}

impl BrowserManagerConfig {
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            debug_port: config.debug_port,
            profile_dir: config.profile_dir.clone(),
            headless: config.headless,
        }
    }

    /// The configured profile directory, or `~/.reclink/browser-profile`.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir
            .clone()
            .unwrap_or_else(|| reclink_home().join("browser-profile"))
    }

    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}
