//! Message channel errors between the page side and the coordinator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessagingError {
    /// The receiving end is gone (coordinator stopped, or page not connected).
    #[error("Receiving end does not exist: {0}")]
    ReceiverGone(String),

    /// The request was delivered but no reply came back.
    #[error("No reply for {0}")]
    NoReply(String),

    /// The reply did not match the request.
    #[error("Unexpected reply for {action}: {reply}")]
    UnexpectedReply { action: String, reply: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_gone_display() {
        let err = MessagingError::ReceiverGone("coordinator".to_string());
        assert!(err.to_string().contains("Receiving end does not exist"));
    }

    #[test]
    fn test_unexpected_reply_display() {
        let err = MessagingError::UnexpectedReply {
            action: "get-captured-recordings".to_string(),
            reply: "Ack".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("get-captured-recordings"));
        assert!(display.contains("Ack"));
    }
}
