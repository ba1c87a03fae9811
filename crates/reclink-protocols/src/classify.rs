//! Syntactic classification of recording URLs.
//!
//! No network access is involved: a URL is a recording URL purely by its
//! shape. The rule, with the default provider settings:
//!
//! - scheme is `http` or `https`;
//! - host is the provider domain (`zoom.us`) or a dot-separated subdomain of it;
//! - and either the path starts with a recording marker (`/rec/share/`,
//!   `/rec/play/`, `/rec/component-page`), or the host is the institutional
//!   sub-domain (`utec.zoom.us`) and the path starts with `/rec`.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s"'<>()\\`]+"#).expect("valid URL regex"));

/// Extract every `http(s)://` URL-looking token from free text.
pub fn find_recording_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!']).to_string())
        .collect()
}

/// Decides whether a URL points at a video-conference recording.
#[derive(Debug, Clone)]
pub struct RecordingClassifier {
    provider_domain: String,
    institution_host: Option<String>,
    path_markers: Vec<String>,
}

impl Default for RecordingClassifier {
    fn default() -> Self {
        Self::new(
            "zoom.us",
            Some("utec.zoom.us".to_string()),
            vec![
                "/rec/share/".to_string(),
                "/rec/play/".to_string(),
                "/rec/component-page".to_string(),
            ],
        )
    }
}

impl RecordingClassifier {
    pub fn new(
        provider_domain: impl Into<String>,
        institution_host: Option<String>,
        path_markers: Vec<String>,
    ) -> Self {
        Self {
            provider_domain: provider_domain.into().to_ascii_lowercase(),
            institution_host: institution_host.map(|h| h.to_ascii_lowercase()),
            path_markers,
        }
    }

    pub fn provider_domain(&self) -> &str {
        &self.provider_domain
    }

    /// Whether `candidate` is a recording URL.
    pub fn is_recording_url(&self, candidate: &str) -> bool {
        let Some(url) = Self::parse_web_url(candidate) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };
        if !self.host_matches(host) {
            return false;
        }

        let path = url.path();
        if self.path_markers.iter().any(|m| path.starts_with(m.as_str())) {
            return true;
        }

        self.institution_host.as_deref() == Some(host) && path.starts_with("/rec")
    }

    /// Whether `candidate` is hosted on the provider's domain at all.
    pub fn is_provider_url(&self, candidate: &str) -> bool {
        Self::parse_web_url(candidate)
            .and_then(|url| url.host_str().map(|h| self.host_matches(h)))
            .unwrap_or(false)
    }

    /// First recording URL embedded in `text`, if any.
    pub fn extract_from(&self, text: &str) -> Option<String> {
        find_recording_urls(text)
            .into_iter()
            .find(|candidate| self.is_recording_url(candidate))
    }

    fn host_matches(&self, host: &str) -> bool {
        host == self.provider_domain
            || host
                .strip_suffix(self.provider_domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    fn parse_web_url(candidate: &str) -> Option<Url> {
        let url = Url::parse(candidate.trim()).ok()?;
        matches!(url.scheme(), "http" | "https").then_some(url)
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
