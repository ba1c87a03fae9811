//! Captured recordings and click correlation tokens.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SessionMetadata, TabId};

/// Per-click token carried through the click → capture round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationToken(Uuid);

impl CorrelationToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recording URL observed by the coordinator in a spawned tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedRecording {
    pub url: String,
    pub source_tab_id: TabId,
    pub captured_at: DateTime<Utc>,
    pub display_title: String,
    /// Token of the click this capture was correlated with, if any.
    pub token: Option<CorrelationToken>,
    /// Session fields that were expected when the capture happened.
    pub expected: Option<SessionMetadata>,
}

impl CapturedRecording {
    pub fn button_id(&self) -> Option<&str> {
        self.expected.as_ref().and_then(|m| m.button_id.as_deref())
    }
}
