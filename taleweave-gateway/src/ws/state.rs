//! Lifecycle of the live-updates socket.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Where the socket is in its lifecycle.
///
/// `Failed` is terminal for a connect cycle: retries are exhausted and only a
/// fresh `connect` leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Idle.
    Disconnected,
    /// First handshake in progress.
    Connecting,
    /// Open and delivering events.
    Connected,
    /// Dropped; waiting out a retry delay or handshaking again.
    Reconnecting,
    /// Gave up after the last retry.
    Failed,
}

impl ConnectionState {
    /// Lowercase label used in logs and serialized snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        }
    }

    /// Open right now.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Open, or a connect cycle owns the socket. A second `connect` is
    /// ignored in these states.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected | Self::Reconnecting)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable bookkeeping shared between the client handle and its tasks.
#[derive(Debug)]
pub(crate) struct LinkState {
    pub state: ConnectionState,
    /// Retries since the last successful handshake.
    pub reconnect_attempts: u32,
    pub last_message: Option<Instant>,
    /// A keepalive ping went out and nothing has arrived since.
    pub awaiting_pong: bool,
}

impl LinkState {
    pub const fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            reconnect_attempts: 0,
            last_message: None,
            awaiting_pong: false,
        }
    }

    fn enter(&mut self, state: ConnectionState) {
        self.state = state;
        self.awaiting_pong = false;
    }

    /// Takes ownership of the socket for a new connect cycle. False when a
    /// cycle is already running.
    pub fn begin_connect(&mut self) -> bool {
        if self.state.is_active() {
            return false;
        }
        self.enter(ConnectionState::Connecting);
        self.reconnect_attempts = 0;
        true
    }

    pub fn mark_connected(&mut self) {
        self.enter(ConnectionState::Connected);
        self.reconnect_attempts = 0;
    }

    pub fn mark_disconnected(&mut self) {
        self.enter(ConnectionState::Disconnected);
    }

    pub fn mark_reconnecting(&mut self) {
        self.enter(ConnectionState::Reconnecting);
        self.reconnect_attempts += 1;
    }

    /// The open socket dropped. Leaves `Connected` before anyone is told so
    /// that sends are refused while the retry loop takes over.
    pub fn mark_lost(&mut self) {
        self.enter(ConnectionState::Reconnecting);
    }

    pub fn mark_failed(&mut self) {
        self.enter(ConnectionState::Failed);
    }

    /// Any inbound frame proves the peer is alive.
    pub fn record_message(&mut self) {
        self.last_message = Some(Instant::now());
        self.awaiting_pong = false;
    }

    pub fn record_ping(&mut self) {
        self.awaiting_pong = true;
    }
}
