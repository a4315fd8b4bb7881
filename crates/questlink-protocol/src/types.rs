//! Core protocol types for the Questlink wire format.
//!
//! This module defines every type that travels "on the wire": the action
//! requests the client sends and the snapshot updates the game server
//! sends back. Both are single JSON objects in a text frame.
//!
//! ```text
//! client → server   { "player": "ann", "action_type": "take",
//!                     "target_1": "lamp", "target_2": null }
//! server → client   { "inventory": [...], "surroundings": [...],
//!                     "image": "...", "message": "...", "error": "..." }
//! ```
//!
//! There is no version field. Unknown fields are ignored and missing
//! fields mean "no change", so both sides can grow the format by omission.

use std::fmt;

use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// ActionType: what the player wants to do
// ---------------------------------------------------------------------------

/// The verb of an action request.
///
/// `#[serde(rename_all = "lowercase")]` makes the JSON representation
/// `"view"`, `"enter"`, ... exactly as the game server expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Establishes the session server-side. Sent once per connection,
    /// automatically, never by the operator.
    Connect,
    /// Look at the surroundings or at a target.
    View,
    /// Walk into a target (or out, with no target).
    Enter,
    /// Pick a target up into the inventory.
    Take,
    /// Put an inventory item into a target.
    Put,
    /// Say something; the text travels in `target_2`.
    Send,
}

impl ActionType {
    /// Returns the wire name of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::View => "view",
            Self::Enter => "enter",
            Self::Take => "take",
            Self::Put => "put",
            Self::Send => "send",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionRequest: client → server
// ---------------------------------------------------------------------------

/// One action submission. Every request carries the player identifier,
/// so the server can route it without connection-level state.
///
/// Unset targets are sent as `null` rather than omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Free-text player identifier supplied by the operator.
    pub player: String,
    /// What to do.
    pub action_type: ActionType,
    /// The environment object the action binds to.
    #[serde(default)]
    pub target_1: Option<String>,
    /// The inventory object, or the spoken text for [`ActionType::Send`].
    #[serde(default)]
    pub target_2: Option<String>,
}

impl ActionRequest {
    /// Creates a request with no targets.
    pub fn new(player: impl Into<String>, action_type: ActionType) -> Self {
        Self {
            player: player.into(),
            action_type,
            target_1: None,
            target_2: None,
        }
    }

    /// The session-establishing request sent right after the socket opens.
    pub fn connect(player: impl Into<String>) -> Self {
        Self::new(player, ActionType::Connect)
    }

    /// Sets `target_1`.
    #[must_use]
    pub fn with_primary(mut self, target: Option<String>) -> Self {
        self.target_1 = target;
        self
    }

    /// Sets `target_2`.
    #[must_use]
    pub fn with_secondary(mut self, target: Option<String>) -> Self {
        self.target_2 = target;
        self
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// An object in the inventory or in the surroundings.
///
/// `id` is unique within the list it arrived in, not globally. The server
/// may send ids as strings or as numbers; both are kept as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Human-readable name (`"name"` on the wire).
    #[serde(rename = "name", default)]
    pub display_name: String,
    /// Illustration URI (`"image"` on the wire).
    #[serde(rename = "image", default)]
    pub image: String,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            image: image.into(),
        }
    }
}

/// Accepts `"lamp"` or `7` for an id.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// SnapshotUpdate: server → client
// ---------------------------------------------------------------------------

/// A partial world snapshot from the server.
///
/// Every field is optional. `None` means "the server said nothing about
/// this", which is different from an empty list or an empty string. An
/// explicit JSON `null` is treated the same as an absent field.
///
/// Only a JSON object decodes. serde's derived visitor would also fill the
/// fields from an array by position, so `Deserialize` is written by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surroundings: Option<Vec<Item>>,
    /// Scene illustration URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Narrative text for this turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error text for this turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The object fields of a [`SnapshotUpdate`], as derived serde reads them.
#[derive(Deserialize)]
struct SnapshotFields {
    #[serde(default)]
    inventory: Option<Vec<Item>>,
    #[serde(default)]
    surroundings: Option<Vec<Item>>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl<'de> Deserialize<'de> for SnapshotUpdate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ObjectOnly;

        impl<'de> Visitor<'de> for ObjectOnly {
            type Value = SnapshotUpdate;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a snapshot update object")
            }

            fn visit_map<A>(self, map: A) -> Result<SnapshotUpdate, A::Error>
            where
                A: MapAccess<'de>,
            {
                let fields = SnapshotFields::deserialize(MapAccessDeserializer::new(map))?;
                Ok(SnapshotUpdate {
                    inventory: fields.inventory,
                    surroundings: fields.surroundings,
                    image: fields.image,
                    message: fields.message,
                    error: fields.error,
                })
            }
        }

        deserializer.deserialize_map(ObjectOnly)
    }
}

impl SnapshotUpdate {
    /// Returns `true` if the update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.inventory.is_none()
            && self.surroundings.is_none()
            && self.image.is_none()
            && self.message.is_none()
            && self.error.is_none()
    }
}

// =========================================================================
// Tests
// =========================================================================
