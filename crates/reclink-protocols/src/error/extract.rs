//! Page-side extraction errors.

use thiserror::Error;

use super::MessagingError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Session table not found on the page")]
    TableNotFound,

    #[error("Not on the schedule site: {0}")]
    WrongDomain(String),

    #[error("Row {row}: {message}")]
    Row { row: usize, message: String },

    #[error("Not a recording URL: {0}")]
    InvalidRecordingUrl(String),

    #[error("No session at position {0}")]
    SessionIndex(usize),

    #[error("No extraction pass has completed yet")]
    NoPass,

    #[error("An extraction pass is already in progress")]
    PassInProgress,

    #[error("Page error: {0}")]
    Page(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExtractError {
    /// Whether the error only affects a single row of the table.
    pub fn is_row_local(&self) -> bool {
        matches!(self, Self::Row { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_display() {
        let err = ExtractError::Row {
            row: 3,
            message: "missing course".to_string(),
        };
        assert_eq!(err.to_string(), "Row 3: missing course");
        assert!(err.is_row_local());
    }

    #[test]
    fn test_messaging_error_from() {
        let err: ExtractError = MessagingError::NoReply("expect-recording".to_string()).into();
        assert!(err.to_string().contains("expect-recording"));
        assert!(!err.is_row_local());
    }

    #[test]
    fn test_table_not_found_display() {
        assert!(ExtractError::TableNotFound.to_string().contains("table"));
    }
}
