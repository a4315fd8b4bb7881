//! The client task: an isolated Tokio task that owns the session engine.
//!
//! The engine is never shared. Operator intents arrive on one channel,
//! connection events on another, and the task applies them one at a time,
//! so every reaction runs to completion before the next event is looked at.

use questlink_protocol::JsonCodec;
use questlink_session::{EngineEvent, SessionEngine};
use questlink_transport::{Transport, TransportEvent, WebSocketTransport};
use tokio::sync::mpsc;

use crate::ClientConfig;
use crate::handle::{ClientHandle, Intent};

/// Receiver for the events a client publishes.
///
/// Each event means "something changed"; call
/// [`ClientHandle::view`] to read the new state.
pub type EngineEvents = mpsc::UnboundedReceiver<EngineEvent>;

/// Spawns a client that connects over WebSocket.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_client(config: ClientConfig) -> (ClientHandle, EngineEvents) {
    spawn_client_with_transport(WebSocketTransport::new(), config)
}

/// Spawns a client that opens its connections through `transport`.
///
/// Must be called from within a Tokio runtime. The task stops when
/// [`ClientHandle::shutdown`] is called or every handle is dropped.
pub fn spawn_client_with_transport<T: Transport>(
    transport: T,
    config: ClientConfig,
) -> (ClientHandle, EngineEvents) {
    // tokio's bounded channel panics on a capacity of zero.
    let (intent_tx, intent_rx) = mpsc::channel(config.intent_channel_capacity.max(1));
    let (transport_tx, transport_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let engine = SessionEngine::new(
        transport,
        JsonCodec,
        config.session,
        transport_tx,
        event_tx,
    );
    let task = ClientTask {
        engine,
        intents: intent_rx,
        transport_events: transport_rx,
    };
    tokio::spawn(task.run());

    (ClientHandle::new(intent_tx), event_rx)
}

/// The internal client state. Runs inside a Tokio task.
struct ClientTask<T: Transport> {
    engine: SessionEngine<T>,
    intents: mpsc::Receiver<Intent>,
    transport_events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl<T: Transport> ClientTask<T> {
    /// Runs the event loop until shutdown or until every handle is gone.
    async fn run(mut self) {
        tracing::info!("client task started");

        loop {
            tokio::select! {
                intent = self.intents.recv() => match intent {
                    Some(Intent::Shutdown) | None => break,
                    Some(intent) => self.apply(intent),
                },
                // The engine holds a sender, so this never yields `None`.
                Some(event) = self.transport_events.recv() => {
                    self.engine.handle_transport_event(event);
                }
            }
        }

        self.engine.terminate_connection();
        tracing::info!("client task stopped");
    }

    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Initiate { endpoint, reply } => {
                let result = self.engine.initiate_connection(endpoint);
                if let Err(e) = &result {
                    tracing::warn!(error = %e, "connection not started");
                }
                let _ = reply.send(result);
            }
            Intent::Terminate => self.engine.terminate_connection(),
            Intent::SetPendingAction(action) => {
                self.engine.set_pending_action(action);
            }
            Intent::ToggleSelect { slot, id } => {
                self.engine.toggle_select(slot, id);
            }
            Intent::SetSpeechPayload(text) => {
                self.engine.set_speech_payload(text);
            }
            Intent::Submit { reply } => {
                let _ = reply.send(self.engine.submit_action());
            }
            Intent::View { reply } => {
                let _ = reply.send(self.engine.view());
            }
            // Handled by the loop.
            Intent::Shutdown => {}
        }
    }
}
