//! WebSocket client transport implementation using `tokio-tungstenite`.
//!
//! Each opened connection gets its own Tokio task that owns the socket.
//! The [`WebSocketConnection`] handle talks to that task through an
//! unbounded channel, so `send` and `close` return immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::{
    Connection, EventSink, HandleId, LinkState, Transport, TransportError,
    TransportEvent, TransportEventKind,
};

/// Commands from a handle to its socket task.
#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

/// A [`Transport`] that opens WebSocket client connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;

    fn open(
        &mut self,
        url: &str,
        handle: HandleId,
        events: EventSink,
    ) -> Self::Connection {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(AtomicU8::new(LinkState::Connecting as u8));

        tracing::debug!(%handle, url, "opening WebSocket connection");
        tokio::spawn(run_socket(
            url.to_string(),
            handle,
            events,
            rx,
            Arc::clone(&state),
        ));

        WebSocketConnection {
            id: handle,
            outbound: tx,
            state,
        }
    }
}

/// Handle to a WebSocket connection running on its own task.
///
/// Dropping the handle without calling [`close`](Connection::close) also
/// shuts the socket down, because the task sees its command channel end.
#[derive(Debug)]
pub struct WebSocketConnection {
    id: HandleId,
    outbound: mpsc::UnboundedSender<Outbound>,
    state: Arc<AtomicU8>,
}

impl Connection for WebSocketConnection {
    fn send(&self, text: String) {
        if !self.is_open() {
            tracing::debug!(handle = %self.id, "send on non-open connection ignored");
            return;
        }
        let _ = self.outbound.send(Outbound::Text(text));
    }

    fn close(&self) {
        let previous = self.state.swap(LinkState::Closed as u8, Ordering::AcqRel);
        if LinkState::from_u8(previous) != LinkState::Closed {
            tracing::debug!(handle = %self.id, "closing WebSocket connection");
            let _ = self.outbound.send(Outbound::Close);
        }
    }

    fn id(&self) -> HandleId {
        self.id
    }

    fn state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// Waits until the handle asks for a close (or is dropped).
///
/// Used while the socket is still connecting. Text frames are never queued
/// before the socket is open, so anything else on the channel is ignored.
async fn close_requested(outbound: &mut mpsc::UnboundedReceiver<Outbound>) {
    while let Some(cmd) = outbound.recv().await {
        if matches!(cmd, Outbound::Close) {
            return;
        }
    }
}

/// Drives one socket from connect to close, reporting through `events`.
async fn run_socket(
    url: String,
    handle: HandleId,
    events: EventSink,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    state: Arc<AtomicU8>,
) {
    let emit = |kind| {
        let _ = events.send(TransportEvent::new(handle, kind));
    };

    let ws = tokio::select! {
        result = tokio_tungstenite::connect_async(url.as_str()) => match result {
            Ok((ws, _response)) => ws,
            Err(e) => {
                state.store(LinkState::Closed as u8, Ordering::Release);
                tracing::debug!(%handle, error = %e, "WebSocket connect failed");
                emit(TransportEventKind::Error(TransportError::ConnectFailed(
                    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e),
                )));
                return;
            }
        },
        _ = close_requested(&mut outbound) => {
            state.store(LinkState::Closed as u8, Ordering::Release);
            tracing::debug!(%handle, "connect abandoned");
            emit(TransportEventKind::Closed);
            return;
        }
    };

    // A close may have raced the end of the handshake.
    if state
        .compare_exchange(
            LinkState::Connecting as u8,
            LinkState::Open as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        )
        .is_err()
    {
        let (mut write, _read) = ws.split();
        let _ = write.send(Message::Close(None)).await;
        emit(TransportEventKind::Closed);
        return;
    }

    tracing::debug!(%handle, "WebSocket connection open");
    emit(TransportEventKind::Open);

    let (mut write, mut read) = ws.split();
    loop {
        tokio::select! {
            cmd = outbound.recv() => match cmd {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = write.send(Message::text(text)).await {
                        state.store(LinkState::Closed as u8, Ordering::Release);
                        emit(TransportEventKind::Error(TransportError::SendFailed(
                            std::io::Error::new(std::io::ErrorKind::BrokenPipe, e),
                        )));
                        return;
                    }
                }
                Some(Outbound::Close) | None => {
                    state.store(LinkState::Closed as u8, Ordering::Release);
                    let _ = write.send(Message::Close(None)).await;
                    emit(TransportEventKind::Closed);
                    return;
                }
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    emit(TransportEventKind::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => emit(TransportEventKind::Message(text)),
                    Err(_) => {
                        tracing::debug!(%handle, len = data.len(), "dropping non-UTF-8 binary frame");
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    state.store(LinkState::Closed as u8, Ordering::Release);
                    tracing::debug!(%handle, "peer closed WebSocket connection");
                    emit(TransportEventKind::Closed);
                    return;
                }
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    state.store(LinkState::Closed as u8, Ordering::Release);
                    emit(TransportEventKind::Error(TransportError::ReceiveFailed(
                        std::io::Error::new(std::io::ErrorKind::ConnectionReset, e),
                    )));
                    return;
                }
            }
        }
    }
}
