//! The client's view of the game world and how server updates merge into it.
//!
//! The server sends *partial* snapshots: a field it doesn't mention keeps
//! whatever value the client already had. [`reconcile`] is the single place
//! that rule lives. It is a plain function over plain data, so it can be
//! tested without a socket or an engine.

use std::collections::VecDeque;

use questlink_protocol::{Item, SnapshotUpdate};

use crate::Selection;

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// The narrative log, newest message first.
///
/// Unbounded and in memory only. Rendered as text, each message is
/// followed by a blank line, so `["You see a door.", "Hello"]` renders as
/// `"You see a door.\n\nHello\n\n"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: VecDeque<String>,
}

impl Transcript {
    /// Prepends `message` to a rendered transcript.
    ///
    /// Identity when `message` is empty.
    pub fn accumulate(prior: &str, message: &str) -> String {
        if message.is_empty() {
            return prior.to_string();
        }
        let mut next = String::with_capacity(message.len() + 2 + prior.len());
        next.push_str(message);
        next.push_str("\n\n");
        next.push_str(prior);
        next
    }

    /// Adds `message` as the newest entry. Empty messages are not logged.
    pub fn push(&mut self, message: &str) {
        if !message.is_empty() {
            self.entries.push_front(message.to_string());
        }
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// The transcript as one block of text.
    ///
    /// Same result as folding [`accumulate`](Self::accumulate) over the
    /// entries oldest first, built in one pass.
    pub fn to_text(&self) -> String {
        let len = self.entries.iter().map(|entry| entry.len() + 2).sum();
        let mut text = String::with_capacity(len);
        for entry in &self.entries {
            text.push_str(entry);
            text.push_str("\n\n");
        }
        text
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// GameSnapshot
// ---------------------------------------------------------------------------

/// The client's current belief about the game world.
///
/// Lists keep the order the server sent; nothing is sorted client-side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSnapshot {
    pub inventory: Vec<Item>,
    pub surroundings: Vec<Item>,
    /// Scene illustration URI.
    pub scene_image: String,
    /// Latest narrative text.
    pub status_message: String,
    /// Error text of the latest update; empty when the turn had no error.
    pub error_message: String,
    pub transcript: Transcript,
}

/// Merges `update` into `snapshot`.
///
/// 1. `inventory`, `surroundings`, `image` and `message` replace the
///    snapshot's value when present and leave it alone when absent.
/// 2. `error_message` is always overwritten: with the update's error, or
///    with `""` when the update has none. Errors belong to one turn.
/// 3. Both selection slots are cleared.
/// 4. A non-empty status message supplied by this update is prepended to
///    the transcript. An update without `message` logs nothing, so error
///    turns don't repeat the standing narrative.
///
/// The caller holds `&mut` to both, so no observer can see a half-applied
/// update.
pub fn reconcile(
    snapshot: &mut GameSnapshot,
    selection: &mut Selection,
    update: SnapshotUpdate,
) {
    let SnapshotUpdate {
        inventory,
        surroundings,
        image,
        message,
        error,
    } = update;
    let message_supplied = message.is_some();

    if let Some(inventory) = inventory {
        snapshot.inventory = inventory;
    }
    if let Some(surroundings) = surroundings {
        snapshot.surroundings = surroundings;
    }
    if let Some(image) = image {
        snapshot.scene_image = image;
    }
    if let Some(message) = message {
        snapshot.status_message = message;
    }

    snapshot.error_message = error.unwrap_or_default();

    selection.clear();

    if message_supplied {
        snapshot.transcript.push(&snapshot.status_message);
    }
}
