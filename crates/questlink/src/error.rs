//! Unified error type for the Questlink client.

use questlink_protocol::ProtocolError;
use questlink_session::SessionError;
use questlink_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `questlink` crate you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]` attribute
/// on each variant auto-generates `From` impls, so `?` converts sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuestlinkError {
    /// A transport-level error (connect, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (bad endpoint, unknown action).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The client task has stopped; no further intents can be delivered.
    #[error("client runtime is not running")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectFailed(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        let questlink_err: QuestlinkError = err.into();
        assert!(matches!(questlink_err, QuestlinkError::Transport(_)));
        assert!(questlink_err.to_string().contains("refused"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let questlink_err: QuestlinkError = err.into();
        assert!(matches!(questlink_err, QuestlinkError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::InvalidEndpoint("host is empty".into());
        let questlink_err: QuestlinkError = err.into();
        assert!(matches!(questlink_err, QuestlinkError::Session(_)));
        assert_eq!(questlink_err.to_string(), "invalid endpoint: host is empty");
    }

    #[test]
    fn test_unavailable_display() {
        assert_eq!(
            QuestlinkError::Unavailable.to_string(),
            "client runtime is not running"
        );
    }
}
