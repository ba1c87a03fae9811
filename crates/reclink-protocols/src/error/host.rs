//! Browser host errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Host unavailable: {0}")]
    Unavailable(String),

    #[error("Host operation failed: {0}")]
    OperationFailed(String),

    #[error("Notification failed: {0}")]
    Notification(String),
}
