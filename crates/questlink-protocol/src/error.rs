//! Error types for the protocol layer.
//!
//! Each crate in Questlink defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in serialization or
//! deserialization, not in networking or session state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a request into text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a frame into an update).
    ///
    /// Common causes: malformed JSON, a field with the wrong type, or an
    /// item without an `id`. Missing optional fields are NOT errors.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame is unusable before any parsing is attempted
    /// (e.g. an empty frame).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
