//! Operator commands and the schedule-site gate.

use std::fmt;

use reclink_config::SiteConfig;
use reclink_protocols::{TabId, TabInfo};
use url::Url;

/// Name of the command that starts an extraction pass.
pub const EXTRACT_LINKS: &str = "extract-links";

/// Whether the active tab can run a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// The active tab is on the schedule site.
    Ready { host: String },
    /// The active tab is somewhere else.
    WrongDomain { host: String },
    /// No active tab, or its URL has no host.
    Unknown,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready { host } => write!(f, "Ready ({})", host),
            Self::WrongDomain { host } => write!(f, "Wrong domain ({})", host),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Evaluate the site gate for the active tab.
pub fn readiness_of(tab: Option<&TabInfo>, site: &SiteConfig) -> Readiness {
    let host = tab
        .and_then(|t| Url::parse(&t.url).ok())
        .and_then(|u| u.host_str().map(str::to_string));
    match host {
        Some(host) if site.matches_host(&host) => Readiness::Ready { host },
        Some(host) => Readiness::WrongDomain { host },
        None => Readiness::Unknown,
    }
}

/// Result of an operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// `extract-links` was pushed to the page in this tab.
    Dispatched(TabId),
    /// Active tab is not the schedule site; the operator was notified.
    WrongDomain,
    /// Schedule site is open but no page is connected; the operator was notified.
    PageNotConnected,
    /// The host could not report an active tab.
    HostUnavailable(String),
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_on_site() {
        let site = SiteConfig::default();
        let tab = TabInfo::new("1", "https://conference.utec.edu.pe/horario?x=1");
        assert_eq!(
            readiness_of(Some(&tab), &site),
            Readiness::Ready {
                host: "conference.utec.edu.pe".to_string()
            }
        );
    }

    #[test]
    fn test_readiness_wrong_domain() {
        let site = SiteConfig::default();
        let tab = TabInfo::new("1", "https://example.com/");
        let readiness = readiness_of(Some(&tab), &site);
        assert!(!readiness.is_ready());
        assert_eq!(readiness.to_string(), "Wrong domain (example.com)");
    }

    #[test]
    fn test_readiness_unknown() {
        let site = SiteConfig::default();
        assert_eq!(readiness_of(None, &site), Readiness::Unknown);
        let blank = TabInfo::new("1", "about:blank");
        assert_eq!(readiness_of(Some(&blank), &site), Readiness::Unknown);
    }

    #[test]
    fn test_subdomain_is_not_the_site() {
        let site = SiteConfig::default();
        let tab = TabInfo::new("1", "https://evil.conference.utec.edu.pe.example/");
        assert!(!readiness_of(Some(&tab), &site).is_ready());
    }
}
