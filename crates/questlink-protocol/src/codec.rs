//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and the text that
//! travels in a WebSocket text frame. The session engine doesn't care HOW
//! requests are serialized; it just needs something that implements the
//! [`Codec`] trait.
//!
//! The game server speaks JSON, so [`JsonCodec`] is the only implementation.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to text frames and decode them back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → the codec can live inside a session engine that is
///   moved onto a Tokio task.
/// - `'static` → the codec doesn't borrow temporary data.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// owns all its strings, so the frame can be dropped right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a text frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the text is malformed or has the
    /// wrong shape (e.g. a field with the wrong type).
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use questlink_protocol::{ActionRequest, ActionType, Codec, JsonCodec, SnapshotUpdate};
///
/// let codec = JsonCodec;
///
/// let request = ActionRequest::new("ann", ActionType::Take).with_primary(Some("lamp".into()));
/// let text = codec.encode(&request).unwrap();
/// assert!(text.contains("\"action_type\":\"take\""));
///
/// let update: SnapshotUpdate = codec.decode(r#"{"message":"Taken."}"#).unwrap();
/// assert_eq!(update.message.as_deref(), Some("Taken."));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        if text.trim().is_empty() {
            return Err(ProtocolError::InvalidMessage("empty frame".into()));
        }
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
