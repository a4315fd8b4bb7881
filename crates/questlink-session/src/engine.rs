//! The session engine: one connection, one game snapshot, one state machine.
//!
//! The engine is synchronous. Every method is a reaction to one
//! discrete event (an operator intent or a transport event) and runs to
//! completion before the next one is looked at. Whoever owns the engine
//! feeds it those events one at a time; in Questlink that is the runtime
//! task in the `questlink` crate, in tests it is the test itself.
//!
//! # Transition table
//!
//! ```text
//! Disconnected  initiate_connection  → Connecting   (close stale, open new)
//! Connecting    Open                 → Connected    (send `connect`, clear transcript)
//! Connecting/Connected  Closed       → Disconnected (drop handle)
//! Connecting/Connected  Error        → Disconnected (Failed notice, drop handle)
//! Connected     Message(text)        → Connected    (decode + reconcile, or report)
//! Connecting/Connected  terminate    → Disconnected (close handle)
//! Disconnected  terminate            → Disconnected (no-op)
//! ```
//!
//! # Stale events
//!
//! Every connection is opened with a fresh [`HandleId`]. Events whose tag
//! isn't the current connection's are dropped, so a socket that was
//! superseded or terminated can never touch the snapshot again, even if its
//! task is still winding down.

use std::fmt;

use questlink_protocol::{ActionRequest, Codec, Item, JsonCodec, SnapshotUpdate};
use questlink_transport::{
    Connection, EventSink, HandleId, Transport, TransportError, TransportEvent,
    TransportEventKind,
};
use tokio::sync::mpsc;

use crate::snapshot::{GameSnapshot, Transcript, reconcile};
use crate::{
    ConnectionState, PendingAction, Selection, SessionConfig, SessionEndpoint,
    SessionError, TargetSlot,
};

// ---------------------------------------------------------------------------
// Output: events and views
// ---------------------------------------------------------------------------

/// A one-shot message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The connection failed; the engine is back to Disconnected.
    ConnectionFailed { reason: String },
    /// A frame from the server couldn't be decoded and was skipped.
    DecodeFailed { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { reason } => {
                write!(f, "connection failed: {reason}")
            }
            Self::DecodeFailed { reason } => {
                write!(f, "could not read server message: {reason}")
            }
        }
    }
}

/// Something observable changed. Re-read [`SessionEngine::view`] to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The connection state changed. `Failed` only ever appears here.
    StateChanged(ConnectionState),
    /// A server update was reconciled into the snapshot (or the snapshot
    /// was reset for a new session).
    SnapshotUpdated,
    /// The pending action, a selection slot, or the speech buffer changed.
    InputChanged,
    Notice(Notice),
}

/// Channel sender the engine publishes its events on.
pub type EngineEventSender = mpsc::UnboundedSender<EngineEvent>;

/// A read-only copy of everything an output collaborator renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionView {
    pub connection_state: ConnectionState,
    pub endpoint: Option<SessionEndpoint>,
    pub inventory: Vec<Item>,
    pub surroundings: Vec<Item>,
    pub scene_image: String,
    pub status_message: String,
    pub error_message: String,
    pub transcript: Transcript,
    pub selection: Selection,
    pub pending_action: PendingAction,
    pub speech_payload: String,
}

// ---------------------------------------------------------------------------
// SessionEngine
// ---------------------------------------------------------------------------

/// Owns the connection, the game snapshot and the operator's input.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ initiate_connection() ──→ handle_transport_event(Open)
///                  ↑                        │
///                  │                        ▼
///           (any time)             handle_transport_event(Message) ...
///                  │                        │
///                  └── terminate_connection() / Closed / Error
/// ```
pub struct SessionEngine<T: Transport, C: Codec = JsonCodec> {
    transport: T,
    codec: C,
    config: SessionConfig,

    state: ConnectionState,
    endpoint: Option<SessionEndpoint>,
    /// The one live connection, present exactly while Connecting/Connected.
    connection: Option<T::Connection>,
    /// Tag of the most recently opened connection. Tags only grow.
    last_handle: HandleId,

    snapshot: GameSnapshot,
    selection: Selection,
    pending_action: PendingAction,
    /// Free text for the speak action. Cleared on submission only.
    speech_payload: String,

    /// Handed to every connection the transport opens.
    transport_events: EventSink,
    events: EngineEventSender,
}

impl<T: Transport, C: Codec> SessionEngine<T, C> {
    /// Creates an engine in the Disconnected state with an empty snapshot.
    ///
    /// Connections opened by this engine report on `transport_events`; the
    /// owner must feed whatever arrives on the matching receiver into
    /// [`handle_transport_event`](Self::handle_transport_event).
    pub fn new(
        transport: T,
        codec: C,
        config: SessionConfig,
        transport_events: EventSink,
        events: EngineEventSender,
    ) -> Self {
        Self {
            transport,
            codec,
            config,
            state: ConnectionState::Disconnected,
            endpoint: None,
            connection: None,
            last_handle: HandleId::new(0),
            snapshot: GameSnapshot::default(),
            selection: Selection::default(),
            pending_action: PendingAction::default(),
            speech_payload: String::new(),
            transport_events,
            events,
        }
    }

    // -- Read side --------------------------------------------------------

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pending_action(&self) -> PendingAction {
        self.pending_action
    }

    /// Tag of the live connection, if any.
    pub fn current_handle(&self) -> Option<HandleId> {
        self.connection.as_ref().map(|connection| connection.id())
    }

    /// Copies out everything an output collaborator needs.
    pub fn view(&self) -> SessionView {
        SessionView {
            connection_state: self.state,
            endpoint: self.endpoint.clone(),
            inventory: self.snapshot.inventory.clone(),
            surroundings: self.snapshot.surroundings.clone(),
            scene_image: self.snapshot.scene_image.clone(),
            status_message: self.snapshot.status_message.clone(),
            error_message: self.snapshot.error_message.clone(),
            transcript: self.snapshot.transcript.clone(),
            selection: self.selection.clone(),
            pending_action: self.pending_action,
            speech_payload: self.speech_payload.clone(),
        }
    }

    // -- Operator intents -------------------------------------------------

    /// Starts a new connection attempt, superseding any current one.
    ///
    /// The old connection (if any) is closed and its events are ignored
    /// from this call on. Returns the new connection's tag.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidEndpoint`] without touching the
    /// current connection if `endpoint` can't be connected to.
    pub fn initiate_connection(
        &mut self,
        endpoint: SessionEndpoint,
    ) -> Result<HandleId, SessionError> {
        endpoint.validate()?;

        if let Some(stale) = self.connection.take() {
            tracing::debug!(handle = %stale.id(), "superseding connection");
            stale.close();
        }

        self.last_handle = self.last_handle.next();
        let handle = self.last_handle;
        let url = endpoint.url(&self.config.scheme);
        tracing::info!(%handle, %url, player = %endpoint.player, "connecting");

        let connection =
            self.transport
                .open(&url, handle, self.transport_events.clone());
        self.connection = Some(connection);
        self.endpoint = Some(endpoint);
        self.set_state(ConnectionState::Connecting);

        Ok(handle)
    }

    /// Closes the current connection. A no-op when there is none.
    pub fn terminate_connection(&mut self) {
        match self.connection.take() {
            Some(connection) => {
                tracing::info!(handle = %connection.id(), "terminating connection");
                connection.close();
                self.set_state(ConnectionState::Disconnected);
            }
            None => {
                tracing::debug!("terminate with no connection ignored");
            }
        }
    }

    pub fn set_pending_action(&mut self, action: PendingAction) {
        if self.pending_action != action {
            self.pending_action = action;
            self.emit(EngineEvent::InputChanged);
        }
    }

    /// Toggles `id` in `slot` (see [`Selection::toggle`]).
    pub fn toggle_select(&mut self, slot: TargetSlot, id: impl Into<String>) {
        self.selection.toggle(slot, id);
        self.emit(EngineEvent::InputChanged);
    }

    /// Replaces the free text sent with the speak action.
    pub fn set_speech_payload(&mut self, text: impl Into<String>) {
        self.speech_payload = text.into();
        self.emit(EngineEvent::InputChanged);
    }

    /// Sends the pending action with the current targets.
    ///
    /// Silently does nothing unless Connected. For the speak action the
    /// speech buffer is sent as `target_2` and then cleared; otherwise
    /// `target_2` is the secondary selection. Selections are left as they
    /// are; the server's answer clears them.
    ///
    /// # Errors
    /// Returns [`SessionError::Protocol`] if the request can't be encoded.
    pub fn submit_action(&mut self) -> Result<(), SessionError> {
        if !self.state.is_connected() {
            tracing::debug!(state = %self.state, "submit while not connected ignored");
            return Ok(());
        }
        let (Some(connection), Some(endpoint)) =
            (self.connection.as_ref(), self.endpoint.as_ref())
        else {
            return Ok(());
        };

        let action = self.pending_action;
        let secondary = if action.takes_speech() {
            Some(self.speech_payload.clone()).filter(|text| !text.is_empty())
        } else {
            self.selection.secondary.clone()
        };
        let request = ActionRequest::new(endpoint.player.clone(), action.action_type())
            .with_primary(self.selection.primary.clone())
            .with_secondary(secondary);

        let text = self.codec.encode(&request)?;
        tracing::debug!(handle = %connection.id(), %action, "submitting action");
        connection.send(text);

        if action.takes_speech() && !self.speech_payload.is_empty() {
            self.speech_payload.clear();
            self.emit(EngineEvent::InputChanged);
        }
        Ok(())
    }

    // -- Transport events -------------------------------------------------

    /// Applies one event from a connection.
    ///
    /// Events from any connection other than the current one are dropped.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        if self.current_handle() != Some(event.handle) {
            tracing::debug!(
                handle = %event.handle,
                current = ?self.current_handle(),
                "dropping event from stale connection"
            );
            return;
        }

        match event.kind {
            TransportEventKind::Open => self.on_open(),
            TransportEventKind::Message(text) => self.on_message(&text),
            TransportEventKind::Closed => self.on_closed(),
            TransportEventKind::Error(e) => self.on_error(e),
        }
    }

    fn on_open(&mut self) {
        if self.state != ConnectionState::Connecting {
            tracing::debug!(state = %self.state, "unexpected open ignored");
            return;
        }
        let (Some(connection), Some(endpoint)) =
            (self.connection.as_ref(), self.endpoint.as_ref())
        else {
            return;
        };

        match self.codec.encode(&ActionRequest::connect(endpoint.player.clone())) {
            Ok(text) => connection.send(text),
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode connect request");
            }
        }
        tracing::info!(handle = %connection.id(), endpoint = %endpoint, "connected");

        // A fresh session starts with an empty log and nothing selected.
        self.snapshot.transcript.clear();
        self.selection.clear();
        self.set_state(ConnectionState::Connected);
        self.emit(EngineEvent::SnapshotUpdated);
    }

    fn on_message(&mut self, text: &str) {
        if !self.state.is_connected() {
            tracing::debug!(state = %self.state, "message before open ignored");
            return;
        }

        let update: SnapshotUpdate = match self.codec.decode(text) {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode snapshot update");
                self.emit(EngineEvent::Notice(Notice::DecodeFailed {
                    reason: e.to_string(),
                }));
                return;
            }
        };

        if update.is_empty() {
            tracing::debug!("update carries no fields; clearing error and selection only");
        }
        reconcile(&mut self.snapshot, &mut self.selection, update);
        self.emit(EngineEvent::SnapshotUpdated);
    }

    fn on_closed(&mut self) {
        if let Some(connection) = self.connection.take() {
            tracing::info!(handle = %connection.id(), "connection closed");
        }
        self.set_state(ConnectionState::Disconnected);
    }

    fn on_error(&mut self, error: TransportError) {
        if let Some(connection) = self.connection.take() {
            tracing::warn!(handle = %connection.id(), error = %error, "connection failed");
            connection.close();
        }
        self.state = ConnectionState::Failed;
        self.emit(EngineEvent::StateChanged(ConnectionState::Failed));
        self.emit(EngineEvent::Notice(Notice::ConnectionFailed {
            reason: error.to_string(),
        }));
        self.set_state(ConnectionState::Disconnected);
    }

    // -- Helpers ----------------------------------------------------------

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            self.state = state;
            self.emit(EngineEvent::StateChanged(state));
        }
    }

    /// Publishes an event. Nobody listening is not an error.
    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionEngine`.
    //!
    //! No sockets are involved: a recording transport hands out fake
    //! connections that log what is sent and closed, and the tests play
    //! the part of the socket by injecting `TransportEvent`s directly.

    use std::sync::{Arc, Mutex};

    use questlink_protocol::ActionType;
    use questlink_transport::LinkState;

    use super::*;

    // -- Recording transport ---------------------------------------------

    #[derive(Debug, Default)]
    struct Log {
        opened: Vec<(String, HandleId)>,
        sent: Vec<(HandleId, String)>,
        closed: Vec<HandleId>,
    }

    #[derive(Clone, Default)]
    struct RecordingTransport {
        log: Arc<Mutex<Log>>,
    }

    struct FakeConnection {
        id: HandleId,
        log: Arc<Mutex<Log>>,
    }

    impl Transport for RecordingTransport {
        type Connection = FakeConnection;

        fn open(&mut self, url: &str, handle: HandleId, _events: EventSink) -> FakeConnection {
            self.log.lock().unwrap().opened.push((url.to_string(), handle));
            FakeConnection {
                id: handle,
                log: Arc::clone(&self.log),
            }
        }
    }

    impl Connection for FakeConnection {
        fn send(&self, text: String) {
            self.log.lock().unwrap().sent.push((self.id, text));
        }

        fn close(&self) {
            self.log.lock().unwrap().closed.push(self.id);
        }

        fn id(&self) -> HandleId {
            self.id
        }

        fn state(&self) -> LinkState {
            LinkState::Open
        }
    }

    // -- Helpers ----------------------------------------------------------

    struct Harness {
        engine: SessionEngine<RecordingTransport>,
        log: Arc<Mutex<Log>>,
        events: mpsc::UnboundedReceiver<EngineEvent>,
        _transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let transport = RecordingTransport::default();
            let log = Arc::clone(&transport.log);
            let (transport_tx, transport_rx) = mpsc::unbounded_channel();
            let (events_tx, events) = mpsc::unbounded_channel();
            let engine = SessionEngine::new(
                transport,
                JsonCodec,
                SessionConfig::default(),
                transport_tx,
                events_tx,
            );
            Self {
                engine,
                log,
                events,
                _transport_rx: transport_rx,
            }
        }

        fn initiate(&mut self) -> HandleId {
            self.engine
                .initiate_connection(SessionEndpoint::new("localhost", 8765, "ann"))
                .expect("endpoint is valid")
        }

        fn inject(&mut self, handle: HandleId, kind: TransportEventKind) {
            self.engine
                .handle_transport_event(TransportEvent::new(handle, kind));
        }

        fn message(&mut self, handle: HandleId, json: &str) {
            self.inject(handle, TransportEventKind::Message(json.to_string()));
        }

        /// Initiates and opens a connection, then forgets the events so far.
        fn connected(&mut self) -> HandleId {
            let handle = self.initiate();
            self.inject(handle, TransportEventKind::Open);
            self.drain();
            self.log.lock().unwrap().sent.clear();
            handle
        }

        fn drain(&mut self) -> Vec<EngineEvent> {
            let mut out = Vec::new();
            while let Ok(event) = self.events.try_recv() {
                out.push(event);
            }
            out
        }

        /// Every request sent so far, decoded back into `ActionRequest`s.
        fn sent(&self) -> Vec<ActionRequest> {
            self.log
                .lock()
                .unwrap()
                .sent
                .iter()
                .map(|(_, text)| JsonCodec.decode(text).expect("engine sends valid requests"))
                .collect()
        }
    }

    fn io_error() -> TransportError {
        TransportError::ReceiveFailed(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset by peer",
        ))
    }

    // =====================================================================
    // initiate_connection()
    // =====================================================================

    #[test]
    fn test_initiate_from_disconnected_opens_and_connects() {
        let mut h = Harness::new();

        let handle = h.initiate();

        assert_eq!(h.engine.state(), ConnectionState::Connecting);
        assert_eq!(h.engine.current_handle(), Some(handle));
        let log = h.log.lock().unwrap();
        assert_eq!(log.opened, vec![("ws://localhost:8765".to_string(), handle)]);
        drop(log);
        assert_eq!(
            h.drain(),
            vec![EngineEvent::StateChanged(ConnectionState::Connecting)]
        );
    }

    #[test]
    fn test_initiate_invalid_endpoint_returns_error_and_stays_disconnected() {
        let mut h = Harness::new();

        let result = h
            .engine
            .initiate_connection(SessionEndpoint::new("", 8765, "ann"));

        assert!(matches!(result, Err(SessionError::InvalidEndpoint(_))));
        assert_eq!(h.engine.state(), ConnectionState::Disconnected);
        assert!(h.log.lock().unwrap().opened.is_empty());
    }

    #[test]
    fn test_initiate_twice_closes_first_and_uses_new_tag() {
        let mut h = Harness::new();
        let first = h.initiate();

        let second = h.initiate();

        assert!(second > first);
        assert_eq!(h.engine.current_handle(), Some(second));
        assert_eq!(h.log.lock().unwrap().closed, vec![first]);
    }

    #[test]
    fn test_events_from_superseded_handle_do_not_mutate_state() {
        let mut h = Harness::new();
        let first = h.initiate();
        let _second = h.initiate();
        h.drain();

        h.inject(first, TransportEventKind::Open);
        h.message(first, r#"{"message":"ghost","inventory":[{"id":"x"}]}"#);
        h.inject(first, TransportEventKind::Error(io_error()));
        h.inject(first, TransportEventKind::Closed);

        assert_eq!(h.engine.state(), ConnectionState::Connecting);
        assert!(h.engine.snapshot().inventory.is_empty());
        assert!(h.engine.snapshot().transcript.is_empty());
        assert!(h.log.lock().unwrap().sent.is_empty());
        assert!(h.drain().is_empty());
    }

    // =====================================================================
    // Open
    // =====================================================================

    #[test]
    fn test_open_sends_connect_once_and_clears_transcript() {
        let mut h = Harness::new();
        let handle = h.connected();
        h.message(handle, r#"{"message":"Hello"}"#);
        assert_eq!(h.engine.snapshot().transcript.len(), 1);

        // Reconnect: the log must be empty before the first update lands.
        let again = h.initiate();
        h.inject(again, TransportEventKind::Open);

        assert_eq!(h.engine.state(), ConnectionState::Connected);
        assert!(h.engine.snapshot().transcript.is_empty());
        let sent = h.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], ActionRequest::connect("ann"));
    }

    #[test]
    fn test_open_emits_connected_and_snapshot_reset() {
        let mut h = Harness::new();
        let handle = h.initiate();
        h.drain();

        h.inject(handle, TransportEventKind::Open);

        assert_eq!(
            h.drain(),
            vec![
                EngineEvent::StateChanged(ConnectionState::Connected),
                EngineEvent::SnapshotUpdated,
            ]
        );
    }

    // =====================================================================
    // Message
    // =====================================================================

    #[test]
    fn test_message_reconciles_into_snapshot() {
        let mut h = Harness::new();
        let handle = h.connected();

        h.message(
            handle,
            r#"{"inventory":[{"id":"key","name":"Key","image":"key.png"}],
                "surroundings":[{"id":"door","name":"Door"}],
                "image":"hall.png","message":"You see a door."}"#,
        );

        let view = h.engine.view();
        assert_eq!(view.inventory, vec![Item::new("key", "Key", "key.png")]);
        assert_eq!(view.surroundings[0].id, "door");
        assert_eq!(view.scene_image, "hall.png");
        assert_eq!(view.status_message, "You see a door.");
        assert_eq!(view.error_message, "");
        assert_eq!(view.transcript.to_text(), "You see a door.\n\n");
        assert_eq!(h.drain(), vec![EngineEvent::SnapshotUpdated]);
    }

    #[test]
    fn test_message_clears_selection() {
        let mut h = Harness::new();
        let handle = h.connected();
        h.engine.toggle_select(TargetSlot::Primary, "door");
        h.engine.toggle_select(TargetSlot::Secondary, "key");

        h.message(handle, r#"{"image":"hall.png"}"#);

        assert!(h.engine.selection().is_empty());
    }

    #[test]
    fn test_message_malformed_reports_and_keeps_snapshot() {
        let mut h = Harness::new();
        let handle = h.connected();
        h.message(handle, r#"{"message":"Hello","error":"Locked."}"#);
        h.engine.toggle_select(TargetSlot::Primary, "door");
        let before = h.engine.view();
        h.drain();

        h.message(handle, "{this is not json");

        assert_eq!(h.engine.view(), before);
        assert_eq!(h.engine.state(), ConnectionState::Connected);
        let events = h.drain();
        assert!(matches!(
            events.as_slice(),
            [EngineEvent::Notice(Notice::DecodeFailed { .. })]
        ));
    }

    #[test]
    fn test_message_json_array_reports_and_keeps_snapshot() {
        let mut h = Harness::new();
        let handle = h.connected();
        h.message(handle, r#"{"message":"Hello","error":"Locked."}"#);
        h.engine.toggle_select(TargetSlot::Primary, "door");
        let before = h.engine.view();
        h.drain();

        h.message(handle, r#"[[{"id":"bogus"}]]"#);

        assert_eq!(h.engine.view(), before);
        assert_eq!(h.engine.selection().get(TargetSlot::Primary), Some("door"));
        assert_eq!(h.engine.snapshot().error_message, "Locked.");
        let events = h.drain();
        assert!(matches!(
            events.as_slice(),
            [EngineEvent::Notice(Notice::DecodeFailed { .. })]
        ));
    }

    #[test]
    fn test_message_while_connecting_is_ignored() {
        let mut h = Harness::new();
        let handle = h.initiate();

        h.message(handle, r#"{"message":"too early"}"#);

        assert!(h.engine.snapshot().status_message.is_empty());
        assert_eq!(h.engine.state(), ConnectionState::Connecting);
    }

    // =====================================================================
    // Closed / Error
    // =====================================================================

    #[test]
    fn test_closed_drops_handle_and_disconnects() {
        let mut h = Harness::new();
        let handle = h.connected();

        h.inject(handle, TransportEventKind::Closed);

        assert_eq!(h.engine.state(), ConnectionState::Disconnected);
        assert_eq!(h.engine.current_handle(), None);
        assert_eq!(
            h.drain(),
            vec![EngineEvent::StateChanged(ConnectionState::Disconnected)]
        );
    }

    #[test]
    fn test_error_while_connecting_fails_then_disconnects() {
        let mut h = Harness::new();
        let handle = h.initiate();
        h.drain();

        h.inject(handle, TransportEventKind::Error(io_error()));

        assert_eq!(h.engine.state(), ConnectionState::Disconnected);
        assert_eq!(h.engine.current_handle(), None);
        let events = h.drain();
        assert_eq!(events[0], EngineEvent::StateChanged(ConnectionState::Failed));
        assert!(matches!(
            &events[1],
            EngineEvent::Notice(Notice::ConnectionFailed { reason }) if reason.contains("reset by peer")
        ));
        assert_eq!(
            events[2],
            EngineEvent::StateChanged(ConnectionState::Disconnected)
        );

        // The dead handle can't deliver anything any more.
        h.inject(handle, TransportEventKind::Open);
        assert_eq!(h.engine.state(), ConnectionState::Disconnected);
        assert!(h.drain().is_empty());
    }

    #[test]
    fn test_error_keeps_snapshot_for_next_session() {
        let mut h = Harness::new();
        let handle = h.connected();
        h.message(handle, r#"{"image":"hall.png","inventory":[{"id":"key"}]}"#);

        h.inject(handle, TransportEventKind::Error(io_error()));

        assert_eq!(h.engine.snapshot().scene_image, "hall.png");
        assert_eq!(h.engine.snapshot().inventory.len(), 1);
    }

    // =====================================================================
    // terminate_connection()
    // =====================================================================

    #[test]
    fn test_terminate_when_disconnected_is_noop() {
        let mut h = Harness::new();

        h.engine.terminate_connection();

        assert_eq!(h.engine.state(), ConnectionState::Disconnected);
        assert!(h.drain().is_empty());
        assert!(h.log.lock().unwrap().closed.is_empty());
    }

    #[test]
    fn test_terminate_closes_and_ignores_late_events() {
        let mut h = Harness::new();
        let handle = h.connected();

        h.engine.terminate_connection();
        h.message(handle, r#"{"message":"late"}"#);

        assert_eq!(h.engine.state(), ConnectionState::Disconnected);
        assert_eq!(h.log.lock().unwrap().closed, vec![handle]);
        assert!(h.engine.snapshot().status_message.is_empty());
    }

    #[test]
    fn test_terminate_while_connecting_disconnects() {
        let mut h = Harness::new();
        let handle = h.initiate();

        h.engine.terminate_connection();
        h.inject(handle, TransportEventKind::Open);

        assert_eq!(h.engine.state(), ConnectionState::Disconnected);
        assert!(h.log.lock().unwrap().sent.is_empty());
    }

    // =====================================================================
    // submit_action()
    // =====================================================================

    #[test]
    fn test_submit_while_disconnected_sends_nothing() {
        let mut h = Harness::new();
        h.engine.toggle_select(TargetSlot::Primary, "door");
        h.engine.set_speech_payload("hello");
        let before = h.engine.view();
        h.drain();

        h.engine.submit_action().expect("no-op is not an error");

        assert!(h.log.lock().unwrap().sent.is_empty());
        assert_eq!(h.engine.view(), before);
        assert!(h.drain().is_empty());
    }

    #[test]
    fn test_submit_default_action_is_view() {
        let mut h = Harness::new();
        h.connected();

        h.engine.submit_action().unwrap();

        assert_eq!(h.sent(), vec![ActionRequest::new("ann", ActionType::View)]);
    }

    #[test]
    fn test_submit_deposit_uses_both_selected_targets() {
        let mut h = Harness::new();
        h.connected();
        h.engine.set_pending_action(PendingAction::Deposit);
        h.engine.toggle_select(TargetSlot::Primary, "chest");
        h.engine.toggle_select(TargetSlot::Secondary, "key");

        h.engine.submit_action().unwrap();

        let sent = h.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].action_type, ActionType::Put);
        assert_eq!(sent[0].target_1.as_deref(), Some("chest"));
        assert_eq!(sent[0].target_2.as_deref(), Some("key"));
        // Selections persist until the server answers.
        assert_eq!(h.engine.selection().get(TargetSlot::Primary), Some("chest"));
    }

    #[test]
    fn test_submit_speak_sends_payload_and_clears_buffer() {
        let mut h = Harness::new();
        h.connected();
        h.engine.set_pending_action(PendingAction::Speak);
        h.engine.toggle_select(TargetSlot::Primary, "guard");
        h.engine.toggle_select(TargetSlot::Secondary, "key");
        h.engine.set_speech_payload("open the gate");

        h.engine.submit_action().unwrap();

        let sent = h.sent();
        assert_eq!(sent[0].action_type, ActionType::Send);
        assert_eq!(sent[0].target_1.as_deref(), Some("guard"));
        assert_eq!(sent[0].target_2.as_deref(), Some("open the gate"));
        assert!(h.engine.view().speech_payload.is_empty());
    }

    #[test]
    fn test_submit_speak_with_empty_buffer_sends_null_payload() {
        let mut h = Harness::new();
        h.connected();
        h.engine.set_pending_action(PendingAction::Speak);

        h.engine.submit_action().unwrap();

        assert_eq!(h.sent()[0].target_2, None);
    }

    // =====================================================================
    // Input intents
    // =====================================================================

    #[test]
    fn test_toggle_select_twice_round_trips() {
        let mut h = Harness::new();

        h.engine.toggle_select(TargetSlot::Secondary, "key");
        h.engine.toggle_select(TargetSlot::Secondary, "key");

        assert_eq!(h.engine.selection().get(TargetSlot::Secondary), None);
        assert_eq!(
            h.drain(),
            vec![EngineEvent::InputChanged, EngineEvent::InputChanged]
        );
    }

    #[test]
    fn test_set_pending_action_same_value_emits_nothing() {
        let mut h = Harness::new();

        h.engine.set_pending_action(PendingAction::Observe);

        assert!(h.drain().is_empty());
        assert_eq!(h.engine.pending_action(), PendingAction::Observe);
    }
}
