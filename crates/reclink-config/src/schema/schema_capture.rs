//! Recording provider and capture timing.

use serde::{Deserialize, Serialize};

/// Video-conference provider whose recording URLs are captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider domain; subdomains match too.
    #[serde(default = "default_provider_domain")]
    pub domain: String,

    /// Institution's own sub-domain of the provider.
    #[serde(default = "default_institution_host")]
    pub institution_host: Option<String>,

    /// Path prefixes that mark a recording page.
    #[serde(default = "default_recording_path_markers")]
    pub recording_path_markers: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            domain: default_provider_domain(),
            institution_host: default_institution_host(),
            recording_path_markers: default_recording_path_markers(),
        }
    }
}

fn default_provider_domain() -> String {
    "zoom.us".to_string()
}

fn default_institution_host() -> Option<String> {
    Some("utec.zoom.us".to_string())
}

fn default_recording_path_markers() -> Vec<String> {
    vec![
        "/rec/share/".to_string(),
        "/rec/play/".to_string(),
        "/rec/component-page".to_string(),
    ]
}

/// Coordinator capture behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Captures older than this are dropped when the next pass starts.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Delay before a spawned recording tab is closed.
    #[serde(default = "default_close_tab_delay_ms")]
    pub close_tab_delay_ms: u64,

    /// How long an unclaimed click expectation stays eligible for a new tab.
    #[serde(default = "default_expectation_ttl_secs")]
    pub expectation_ttl_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention_secs(),
            close_tab_delay_ms: default_close_tab_delay_ms(),
            expectation_ttl_secs: default_expectation_ttl_secs(),
        }
    }
}

fn default_retention_secs() -> u64 {
    300
}

fn default_close_tab_delay_ms() -> u64 {
    1500
}

fn default_expectation_ttl_secs() -> u64 {
    60
}
