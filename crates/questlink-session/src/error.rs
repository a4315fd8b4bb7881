//! Error types for the session layer.

use questlink_protocol::ProtocolError;

/// Errors that can occur while driving a session.
///
/// Most failures in a session are NOT errors in this sense: a dropped
/// socket or a malformed frame is reported to the operator as a
/// [`Notice`](crate::Notice) and the engine carries on. These variants are
/// for the few operations that hand a result back to their caller.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The operator-supplied endpoint can't be connected to
    /// (empty host, port 0, empty player name).
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The name doesn't match any pending action.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A request couldn't be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
