//! Client transport abstraction layer for Questlink.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the socket a game client talks through. A transport opens connections;
//! a connection sends text frames and can be closed. Everything the socket
//! has to say back (opened, a message arrived, closed, failed) is delivered
//! as a [`TransportEvent`] on a channel owned by the caller.
//!
//! Every connection is tagged with a [`HandleId`] chosen by its owner. Events
//! carry that tag, so an owner that has moved on to a newer connection can
//! recognise and discard late events from the old one.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client transport via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

use tokio::sync::mpsc;

/// Opaque tag for one connection attempt.
///
/// Tags are handed out by the connection's owner and are never reused
/// within that owner's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    /// Creates a new `HandleId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }

    /// Returns the tag that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle-{}", self.0)
    }
}

/// Lifecycle of a single connection as seen from its handle.
///
/// ```text
///   Connecting ──(socket up)──→ Open ──(close / peer gone)──→ Closed
///       │                                                       ↑
///       └──────────────(close / connect failed)─────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Connecting = 0,
    Open = 1,
    Closed = 2,
}

impl LinkState {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Open,
            _ => Self::Closed,
        }
    }
}

/// What happened on a connection.
#[derive(Debug)]
pub enum TransportEventKind {
    /// The socket is established and ready for `send`.
    Open,
    /// A text frame arrived.
    Message(String),
    /// The connection closed (by either side).
    Closed,
    /// The connection failed. No further events follow for this handle.
    Error(TransportError),
}

/// An event from a connection, tagged with the connection's handle.
#[derive(Debug)]
pub struct TransportEvent {
    pub handle: HandleId,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn new(handle: HandleId, kind: TransportEventKind) -> Self {
        Self { handle, kind }
    }
}

/// Channel sender on which connections deliver their events.
pub type EventSink = mpsc::UnboundedSender<TransportEvent>;

/// Opens client connections.
pub trait Transport: Send + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Starts opening a connection to `url` and returns its handle at once.
    ///
    /// The handle starts in [`LinkState::Connecting`]. Progress is reported
    /// through `events`, every event tagged with `handle`.
    fn open(
        &mut self,
        url: &str,
        handle: HandleId,
        events: EventSink,
    ) -> Self::Connection;
}

/// A single client connection.
///
/// Neither method blocks: work that needs the network happens on the
/// connection's own task.
pub trait Connection: Send + 'static {
    /// Queues a text frame for the peer.
    ///
    /// A no-op unless the connection is [`LinkState::Open`]: frames are
    /// neither queued for later nor reported as errors.
    fn send(&self, text: String);

    /// Closes the connection. Closing twice is harmless.
    fn close(&self);

    /// Returns the tag this connection was opened with.
    fn id(&self) -> HandleId;

    /// Returns the current lifecycle state.
    fn state(&self) -> LinkState;

    /// Returns `true` if frames can currently be sent.
    fn is_open(&self) -> bool {
        self.state() == LinkState::Open
    }
}
