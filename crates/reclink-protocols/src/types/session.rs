//! Schedule sessions and their recording links.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Serialized form of [`RecordingLink::Unresolved`].
pub const UNRESOLVED_SENTINEL: &str = "pending";

/// Recording link of a session.
///
/// `Unresolved` means the button was clicked and a tab opened, but no URL
/// could be tied back to the session. It is kept distinct from "no recording"
/// (`None` on the session) so manual reconciliation can find it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RecordingLink {
    Resolved(String),
    Unresolved,
}

impl RecordingLink {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The resolved URL, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Resolved(url) => Some(url),
            Self::Unresolved => None,
        }
    }
}

impl From<RecordingLink> for String {
    fn from(link: RecordingLink) -> Self {
        match link {
            RecordingLink::Resolved(url) => url,
            RecordingLink::Unresolved => UNRESOLVED_SENTINEL.to_string(),
        }
    }
}

impl From<String> for RecordingLink {
    fn from(value: String) -> Self {
        if value == UNRESOLVED_SENTINEL {
            Self::Unresolved
        } else {
            Self::Resolved(value)
        }
    }
}

/// Composite identity of a session within one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub course: String,
    pub section: String,
    pub date: String,
    pub start_time: String,
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} {}",
            self.course, self.section, self.date, self.start_time
        )
    }
}

/// One row of the schedule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub course: String,
    pub section: String,
    pub date: String,
    pub start_time: String,
    pub instructor: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub status: String,
    pub modality: String,
    pub week: Option<u32>,
    pub has_link: bool,
    pub link_url: Option<RecordingLink>,
    pub button_id: Option<String>,
    pub button_enabled: bool,
    pub extracted_at: DateTime<Utc>,
}

impl Session {
    pub fn key(&self) -> SessionKey {
        SessionKey {
            course: self.course.clone(),
            section: self.section.clone(),
            date: self.date.clone(),
            start_time: self.start_time.clone(),
        }
    }

    /// The resolved recording URL, ignoring the unresolved sentinel.
    pub fn resolved_url(&self) -> Option<&str> {
        self.link_url.as_ref().and_then(RecordingLink::url)
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self.link_url, Some(RecordingLink::Unresolved))
    }

    /// Snapshot of the fields handed to the coordinator before a click.
    pub fn metadata(&self) -> SessionMetadata {
        SessionMetadata {
            course: self.course.clone(),
            section: self.section.clone(),
            date: self.date.clone(),
            start_time: self.start_time.clone(),
            instructor: self.instructor.clone(),
            session_type: self.session_type.clone(),
            status: self.status.clone(),
            modality: self.modality.clone(),
            week: self.week,
            button_id: self.button_id.clone(),
        }
    }
}

/// Session fields attached to a capture ("expected recording" payload).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub course: String,
    pub section: String,
    pub date: String,
    pub start_time: String,
    pub instructor: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub status: String,
    pub modality: String,
    pub week: Option<u32>,
    pub button_id: Option<String>,
}
