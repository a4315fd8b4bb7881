//! Wire protocol for Questlink.
//!
//! This crate defines the "language" the client and the game server speak:
//!
//! - **Types** ([`ActionRequest`], [`ActionType`], [`SnapshotUpdate`],
//!   [`Item`]): the structures that travel in text frames.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those structures
//!   are converted to/from text.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (text frames) and session
//! (game state). It doesn't know about sockets or about how updates are
//! merged; it only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (text) → Protocol (SnapshotUpdate) → Session (GameSnapshot)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ActionRequest, ActionType, Item, SnapshotUpdate};
