//! Transport-level errors shared by the server and client.

use thiserror::Error;

/// Failure to send or receive one message on a connection.
///
/// The `Display` form is what a terminating session broadcasts to the
/// remaining peers, so keep it short and human readable.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer closed the connection or the stream ended.
    #[error("connection closed")]
    Closed,

    /// The payload was not a valid message.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The underlying socket or protocol layer failed.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    /// Wrap any displayable transport failure as [`TransportError::Protocol`].
    pub fn protocol(err: impl std::fmt::Display) -> Self {
        Self::Protocol(err.to_string())
    }

    /// Whether this error means the peer went away rather than misbehaved.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_display() {
        assert_eq!(TransportError::Closed.to_string(), "connection closed");
    }

    #[test]
    fn protocol_display_carries_cause() {
        let err = TransportError::protocol("reset by peer");
        assert_eq!(err.to_string(), "protocol error: reset by peer");
    }

    #[test]
    fn malformed_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TransportError = serde_err.into();
        assert!(err.to_string().starts_with("malformed message:"));
        assert!(!err.is_closed());
    }

    #[test]
    fn is_closed_only_for_closed() {
        assert!(TransportError::Closed.is_closed());
        assert!(!TransportError::protocol("x").is_closed());
    }
}
