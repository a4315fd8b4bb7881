//! Client configuration.

use questlink_session::SessionConfig;

/// Configuration for a spawned client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Passed through to the session engine.
    pub session: SessionConfig,

    /// Capacity of the intent channel between [`ClientHandle`]s and the
    /// client task. A full channel makes intent calls wait. Zero is treated
    /// as one.
    ///
    /// Default: 64.
    ///
    /// [`ClientHandle`]: crate::ClientHandle
    pub intent_channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            intent_channel_capacity: 64,
        }
    }
}

impl ClientConfig {
    /// Sets the URL scheme used for every connection (`"ws"` or `"wss"`).
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.session = self.session.with_scheme(scheme);
        self
    }

    /// Sets the intent channel capacity. Zero is bumped to one, since
    /// tokio's bounded channel needs room for at least one message.
    #[must_use]
    pub fn with_intent_channel_capacity(mut self, capacity: usize) -> Self {
        self.intent_channel_capacity = capacity.max(1);
        self
    }
}
