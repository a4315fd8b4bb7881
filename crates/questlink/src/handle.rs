//! The operator-facing handle to a running client.

use questlink_session::{
    PendingAction, SessionEndpoint, SessionError, SessionView, TargetSlot,
};
use questlink_transport::HandleId;
use tokio::sync::{mpsc, oneshot};

use crate::QuestlinkError;

/// Intents sent to the client task through its channel.
///
/// Variants with a `oneshot::Sender` are requests: the caller waits on the
/// reply channel for the engine's answer. The rest are fire-and-forget.
pub(crate) enum Intent {
    Initiate {
        endpoint: SessionEndpoint,
        reply: oneshot::Sender<Result<HandleId, SessionError>>,
    },
    Terminate,
    SetPendingAction(PendingAction),
    ToggleSelect {
        slot: TargetSlot,
        id: String,
    },
    SetSpeechPayload(String),
    Submit {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    View {
        reply: oneshot::Sender<SessionView>,
    },
    Shutdown,
}

/// Handle to a running client. Used to send it operator intents.
///
/// Cheap to clone; it's just an `mpsc::Sender` wrapper. Every method fails
/// with [`QuestlinkError::Unavailable`] once the client task has stopped.
#[derive(Clone)]
pub struct ClientHandle {
    sender: mpsc::Sender<Intent>,
}

impl ClientHandle {
    pub(crate) fn new(sender: mpsc::Sender<Intent>) -> Self {
        Self { sender }
    }

    /// Starts connecting to `endpoint`, superseding any current connection.
    ///
    /// Returns as soon as the attempt has started. Watch for
    /// `StateChanged(Connected)` to learn when it succeeds.
    pub async fn connect(
        &self,
        endpoint: SessionEndpoint,
    ) -> Result<HandleId, QuestlinkError> {
        let (reply, rx) = oneshot::channel();
        self.send(Intent::Initiate { endpoint, reply }).await?;
        Ok(rx.await.map_err(|_| QuestlinkError::Unavailable)??)
    }

    /// Closes the current connection, if any.
    pub async fn disconnect(&self) -> Result<(), QuestlinkError> {
        self.send(Intent::Terminate).await
    }

    pub async fn set_pending_action(
        &self,
        action: PendingAction,
    ) -> Result<(), QuestlinkError> {
        self.send(Intent::SetPendingAction(action)).await
    }

    /// Toggles `id` in a target slot: selecting the held id clears it.
    pub async fn toggle_select(
        &self,
        slot: TargetSlot,
        id: impl Into<String>,
    ) -> Result<(), QuestlinkError> {
        self.send(Intent::ToggleSelect {
            slot,
            id: id.into(),
        })
        .await
    }

    pub async fn set_speech_payload(
        &self,
        text: impl Into<String>,
    ) -> Result<(), QuestlinkError> {
        self.send(Intent::SetSpeechPayload(text.into())).await
    }

    /// Sends the pending action. Does nothing unless connected.
    pub async fn submit(&self) -> Result<(), QuestlinkError> {
        let (reply, rx) = oneshot::channel();
        self.send(Intent::Submit { reply }).await?;
        Ok(rx.await.map_err(|_| QuestlinkError::Unavailable)??)
    }

    /// Returns a copy of the current session state.
    pub async fn view(&self) -> Result<SessionView, QuestlinkError> {
        let (reply, rx) = oneshot::channel();
        self.send(Intent::View { reply }).await?;
        rx.await.map_err(|_| QuestlinkError::Unavailable)
    }

    /// Closes any connection and stops the client task.
    pub async fn shutdown(&self) -> Result<(), QuestlinkError> {
        self.send(Intent::Shutdown).await
    }

    async fn send(&self, intent: Intent) -> Result<(), QuestlinkError> {
        self.sender
            .send(intent)
            .await
            .map_err(|_| QuestlinkError::Unavailable)
    }
}
