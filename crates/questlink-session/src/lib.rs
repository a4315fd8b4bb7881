//! Session engine for Questlink game clients.
//!
//! This crate turns a stream of operator intents and transport events into
//! a consistent picture of one game session:
//!
//! 1. **Connection lifecycle**: where to connect ([`SessionEndpoint`]) and
//!    what state the link is in ([`ConnectionState`])
//! 2. **Game snapshot**: inventory, surroundings, scene and the narrative
//!    [`Transcript`], merged from partial server updates by [`reconcile`]
//! 3. **Operator input**: the [`PendingAction`] and the two-slot
//!    [`Selection`] the next submission binds to
//!
//! [`SessionEngine`] ties the three together. It is owned by exactly one
//! task and every method runs to completion, so no update is ever observed
//! half-applied.
//!
//! # How it fits in the stack
//!
//! ```text
//! Client runtime (above)  ← owns the engine, routes intents and socket events
//!     ↕
//! Session Layer (this crate)  ← state machine + snapshot reconciliation
//!     ↕
//! Protocol / Transport (below)  ← wire types, codec, WebSocket connections
//! ```

mod engine;
mod error;
mod selection;
mod snapshot;
mod state;

pub use engine::{EngineEvent, EngineEventSender, Notice, SessionEngine, SessionView};
pub use error::SessionError;
pub use selection::{PendingAction, Selection, TargetSlot};
pub use snapshot::{GameSnapshot, Transcript, reconcile};
pub use state::{ConnectionState, SessionConfig, SessionEndpoint};
