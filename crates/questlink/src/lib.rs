//! # Questlink
//!
//! Connection and session engine for text-adventure game clients.
//!
//! Questlink keeps one WebSocket connection to a game server, sends the
//! operator's actions as JSON requests, and merges the server's partial
//! state updates into a single game snapshot. A user interface only has to
//! send intents through a [`ClientHandle`] and re-render whenever an
//! [`EngineEvent`] arrives.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use questlink::prelude::*;
//!
//! # async fn demo() -> Result<(), QuestlinkError> {
//! let (client, mut events) = spawn_client(ClientConfig::default());
//! client
//!     .connect(SessionEndpoint::new("localhost", 8080, "ann"))
//!     .await?;
//!
//! while let Some(event) = events.recv().await {
//!     if event == EngineEvent::SnapshotUpdated {
//!         let view = client.view().await?;
//!         println!("{}", view.transcript.to_text());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handle;
mod runtime;

pub use config::ClientConfig;
pub use error::QuestlinkError;
pub use handle::ClientHandle;
pub use runtime::{EngineEvents, spawn_client, spawn_client_with_transport};

/// Re-exports everything a client application needs.
pub mod prelude {
    pub use crate::{
        ClientConfig, ClientHandle, EngineEvents, QuestlinkError, spawn_client,
        spawn_client_with_transport,
    };
    pub use questlink_protocol::{ActionRequest, ActionType, Item, SnapshotUpdate};
    pub use questlink_session::{
        ConnectionState, EngineEvent, Notice, PendingAction, Selection,
        SessionConfig, SessionEndpoint, SessionView, TargetSlot, Transcript,
    };
    pub use questlink_transport::{
        Connection, HandleId, Transport, WebSocketTransport,
    };
}
