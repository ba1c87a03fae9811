//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_capture;
mod schema_extraction;
mod schema_infra;

pub use schema_capture::*;
pub use schema_extraction::*;
pub use schema_infra::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The institutional scheduling site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Host the schedule page must be served from.
    #[serde(default = "default_site_domain")]
    pub domain: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: default_site_domain(),
        }
    }
}

impl SiteConfig {
    /// Whether `host` is the schedule site.
    pub fn matches_host(&self, host: &str) -> bool {
        host.eq_ignore_ascii_case(&self.domain)
    }
}

fn default_site_domain() -> String {
    "conference.utec.edu.pe".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
