//! Connection types: where the client connects and what state it is in.

use std::fmt;

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
///
/// `#[derive(Clone)]` so the runtime can keep a copy while the engine
/// owns another.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// URL scheme of the transport, used to build `scheme://host:port`.
    ///
    /// Default: `"ws"`.
    pub scheme: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scheme: "ws".to_string(),
        }
    }
}

impl SessionConfig {
    /// Sets the URL scheme (e.g. `"wss"` for TLS).
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }
}

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// The connection state machine as the operator sees it.
///
/// ```text
///                 initiate                 open
///   Disconnected ─────────→ Connecting ─────────→ Connected
///        ↑                      │                     │
///        │      close / terminate                     │
///        ├──────────────────────┴─────────────────────┤
///        │                                            │
///        └──────────── Failed ←──────── error ────────┘
/// ```
///
/// `Failed` is only ever observed as a transient event: the engine
/// announces it and collapses to `Disconnected` in the same reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl ConnectionState {
    /// Returns `true` if actions can be submitted.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` while a socket is owned (connecting or connected).
    pub fn has_connection(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }

    /// Returns the status line shown to the operator.
    pub fn display_text(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Failed => "Connection Failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionEndpoint
// ---------------------------------------------------------------------------

/// Where to connect and who to play as.
///
/// Fixed for the duration of one connection attempt. A new attempt may
/// use a different endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEndpoint {
    pub host: String,
    pub port: u16,
    /// Free-text player identifier, sent with every request.
    pub player: String,
}

impl SessionEndpoint {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        player: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            player: player.into(),
        }
    }

    /// Builds `scheme://host:port`, bracketing bare IPv6 hosts.
    pub fn url(&self, scheme: &str) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{scheme}://[{}]:{}", self.host, self.port)
        } else {
            format!("{scheme}://{}:{}", self.host, self.port)
        }
    }

    /// Checks that the endpoint can be connected to.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidEndpoint`] for an empty host, port 0,
    /// or an empty player identifier.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.host.trim().is_empty() {
            return Err(SessionError::InvalidEndpoint("host is empty".into()));
        }
        if self.port == 0 {
            return Err(SessionError::InvalidEndpoint("port must be non-zero".into()));
        }
        if self.player.trim().is_empty() {
            return Err(SessionError::InvalidEndpoint("player is empty".into()));
        }
        Ok(())
    }
}

impl Default for SessionEndpoint {
    fn default() -> Self {
        Self::new("localhost", 8080, "player")
    }
}

impl fmt::Display for SessionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.player, self.host, self.port)
    }
}
