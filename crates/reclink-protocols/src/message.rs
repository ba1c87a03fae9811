//! Action-tagged messages exchanged between the page side and the coordinator.
//!
//! | Action | Direction | Reply |
//! |---|---|---|
//! | `extract-links` | Coordinator → Page | - |
//! | `set-extraction-tab` | Page → Coordinator | `{success}` |
//! | `expect-recording` | Page → Coordinator | `{success, token}` |
//! | `withdraw-expectation` | Page → Coordinator | `{success}` |
//! | `recording-captured` | Coordinator → Page | - |
//! | `get-captured-recordings` | Page → Coordinator | `{success, recordings}` |
//! | `clear-captured-recordings` | Page → Coordinator | `{success}` |
//! | `close-zoom-tabs` | Page → Coordinator | `{success, count}` |
//! | `show-notification` | Page → Coordinator | - |

use serde::{Deserialize, Serialize};

use crate::error::MessagingError;
use crate::types::{CapturedRecording, CorrelationToken, SessionMetadata, TabId};

/// Title used for operator notifications.
pub const NOTIFICATION_TITLE: &str = "UTEC Extractor";

/// Page → Coordinator request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Request {
    /// The sender tab becomes the extraction tab.
    SetExtractionTab,
    ExpectRecording { expected: SessionMetadata },
    /// A click whose tab never showed up gives its token back, so the next
    /// click's tab cannot claim it.
    WithdrawExpectation { token: CorrelationToken },
    GetCapturedRecordings,
    ClearCapturedRecordings,
    CloseZoomTabs,
    ShowNotification { title: String, message: String },
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Self::SetExtractionTab => "set-extraction-tab",
            Self::ExpectRecording { .. } => "expect-recording",
            Self::WithdrawExpectation { .. } => "withdraw-expectation",
            Self::GetCapturedRecordings => "get-captured-recordings",
            Self::ClearCapturedRecordings => "clear-captured-recordings",
            Self::CloseZoomTabs => "close-zoom-tabs",
            Self::ShowNotification { .. } => "show-notification",
        }
    }
}

/// Coordinator reply. Untagged so the wire form is the bare payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Expecting {
        success: bool,
        token: CorrelationToken,
    },
    Recordings {
        success: bool,
        recordings: Vec<CapturedRecording>,
    },
    Closed {
        success: bool,
        count: usize,
    },
    Ack {
        success: bool,
    },
    NoReply,
}

impl Response {
    pub fn ok() -> Self {
        Self::Ack { success: true }
    }

    pub fn into_token(self) -> Result<CorrelationToken, MessagingError> {
        match self {
            Self::Expecting { token, .. } => Ok(token),
            other => Err(unexpected("expect-recording", &other)),
        }
    }

    pub fn into_recordings(self) -> Result<Vec<CapturedRecording>, MessagingError> {
        match self {
            Self::Recordings { recordings, .. } => Ok(recordings),
            other => Err(unexpected("get-captured-recordings", &other)),
        }
    }

    pub fn into_count(self) -> Result<usize, MessagingError> {
        match self {
            Self::Closed { count, .. } => Ok(count),
            other => Err(unexpected("close-zoom-tabs", &other)),
        }
    }
}

fn unexpected(action: &str, reply: &Response) -> MessagingError {
    MessagingError::UnexpectedReply {
        action: action.to_string(),
        reply: format!("{:?}", reply),
    }
}

/// Coordinator → Page push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum PageMessage {
    ExtractLinks,
    RecordingCaptured { recording: CapturedRecording },
}

/// A push addressed to one page tab.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub to: TabId,
    pub message: PageMessage,
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
