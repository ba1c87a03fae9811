//! Browser tab identity and normalized tab lifecycle events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque browser tab identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub String);

impl TabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Snapshot of a browser tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Tab that opened this one, when the host reports it.
    #[serde(default)]
    pub opener: Option<TabId>,
}

impl TabInfo {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: TabId::new(id),
            url: url.into(),
            title: String::new(),
            opener: None,
        }
    }

    pub fn with_opener(mut self, opener: impl Into<String>) -> Self {
        self.opener = Some(TabId::new(opener));
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Tab lifecycle event, normalized from whatever the host emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    /// A tab was opened. Its URL may still be empty or `about:blank`.
    Created(TabInfo),
    /// A tab's URL or title changed.
    Updated(TabInfo),
    /// A navigation committed in a tab.
    Navigated(TabInfo),
    /// A tab was closed.
    Removed(TabId),
}

impl TabEvent {
    /// The tab snapshot carried by the event, if any.
    pub fn tab(&self) -> Option<&TabInfo> {
        match self {
            Self::Created(tab) | Self::Updated(tab) | Self::Navigated(tab) => Some(tab),
            Self::Removed(_) => None,
        }
    }
}
