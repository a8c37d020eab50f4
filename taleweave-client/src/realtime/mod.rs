//! Realtime connection manager.
//!
//! [`RealtimeManager`] owns the socket transport for one application
//! context. It authenticates with the store's credential, announces the user
//! with `identify` on every (re)connect, runs inbound events through the
//! [`EventBridge`], then hands them to handlers registered with
//! [`RealtimeManager::on`].

mod handlers;

pub use handlers::{EventHandler, HandlerId};

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Weak};
use taleweave_core::error::{EventError, NetworkError};
use taleweave_core::types::{NewNotification, NotificationSeverity};
use taleweave_gateway::ws::{
    ConnectionState, EventEnvelope, WebSocketCallback, WebSocketClient, WebSocketConfig,
};
use tracing::{debug, info, warn};

use crate::bus::LocalBus;
use crate::events::{DispatchOutcome, EventBridge, Identify};
use crate::store::Store;
use handlers::HandlerRegistry;

/// Title of the notification raised when reconnection gives up.
pub const OFFLINE_TITLE: &str = "Live updates are offline";

struct ManagerInner {
    transport: WebSocketClient,
    store: Store,
    bus: LocalBus,
    bridge: EventBridge,
    handlers: HandlerRegistry,
}

impl ManagerInner {
    fn identify(&self) {
        let Some(user) = self.store.user() else {
            debug!("Connected without a signed-in user, skipping identify");
            return;
        };

        match serde_json::to_value(Identify::from(&user)) {
            Ok(payload) => {
                if let Err(e) = self.transport.emit(Identify::EVENT, payload) {
                    warn!(error = %e, "Failed to send identify");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode identify"),
        }
    }
}

/// Transport callback. Holds a weak reference so the manager can be dropped
/// while the connection task is still winding down.
struct ManagerCallback {
    inner: Weak<ManagerInner>,
}

#[async_trait]
impl WebSocketCallback for ManagerCallback {
    async fn on_event(&self, envelope: EventEnvelope) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };

        // Malformed payloads never reach handlers; unknown kinds still do.
        if let DispatchOutcome::Rejected(EventError::MalformedPayload { .. }) =
            inner.bridge.dispatch(&envelope)
        {
            return;
        }
        inner.handlers.deliver(&envelope);
    }

    async fn on_connected(&self) {
        if let Some(inner) = self.inner.upgrade() {
            info!("Live updates connected");
            inner.identify();
        }
    }

    async fn on_disconnected(&self, reason: Option<String>) {
        info!(reason = reason.as_deref().unwrap_or("unknown"), "Live updates disconnected");
    }

    async fn on_error(&self, error: NetworkError) {
        debug!(%error, "Realtime transport error");
    }

    async fn on_reconnecting(&self, attempt: u32, max_attempts: u32) {
        info!(attempt, max_attempts, "Reconnecting live updates");
    }

    async fn on_failed(&self, attempts: u32) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        warn!(attempts, "Live updates gave up reconnecting");

        let message = format!(
            "Lost connection after {attempts} attempts. Reconnect to resume live updates."
        );
        inner.store.push_notification(NewNotification::new(
            NotificationSeverity::Error,
            OFFLINE_TITLE,
            message.clone(),
        ));
        inner
            .bus
            .toast(NotificationSeverity::Error, OFFLINE_TITLE, message);
    }
}

/// Manages the realtime connection for one application context.
///
/// Clones share the same connection and handler registry.
#[derive(Clone)]
pub struct RealtimeManager {
    inner: Arc<ManagerInner>,
}

impl RealtimeManager {
    /// Creates a disconnected manager.
    #[must_use]
    pub fn new(config: WebSocketConfig, store: Store, bus: LocalBus) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<ManagerInner>| {
            let mut transport = WebSocketClient::new(config);
            transport.set_callback(ManagerCallback {
                inner: weak.clone(),
            });
            ManagerInner {
                transport,
                bridge: EventBridge::new(store.clone(), bus.clone()),
                store,
                bus,
                handlers: HandlerRegistry::default(),
            }
        });
        Self { inner }
    }

    /// Opens the connection with the store's credential.
    ///
    /// Without a credential, or with live updates switched off, nothing is
    /// attempted. A call while connecting, connected, or reconnecting does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns the first attempt's `NetworkError`; the bounded reconnect loop
    /// keeps going in the background.
    pub async fn connect(&self) -> Result<(), NetworkError> {
        if !self.inner.store.live_updates() {
            info!("Live updates disabled, not connecting");
            return Ok(());
        }

        let Some(token) = self.inner.store.token() else {
            warn!("No credential available, not connecting live updates");
            return Ok(());
        };

        if self.state().is_active() {
            debug!(state = %self.state(), "Live updates already active");
            return Ok(());
        }

        self.inner.transport.connect(Some(&token)).await
    }

    /// Closes the connection. Idempotent.
    pub async fn disconnect(&self) {
        self.inner.transport.disconnect().await;
    }

    /// Sends an event. Dropped with a warning when not connected.
    pub fn emit(&self, event: &str, payload: Value) {
        if !self.inner.transport.is_connected() {
            warn!(event, "Live updates not connected, dropping emit");
            return;
        }
        if let Err(e) = self.inner.transport.emit(event, payload) {
            warn!(event, error = %e, "Failed to emit");
        }
    }

    /// Registers a handler for inbound events named `event`.
    pub fn on<F>(&self, event: &str, handler: F) -> HandlerId
    where
        F: Fn(&EventEnvelope) + Send + Sync + 'static,
    {
        self.inner.handlers.add(event, Arc::new(handler))
    }

    /// Removes one handler, or every handler for `event` when `id` is `None`.
    /// Returns how many were removed.
    pub fn off(&self, event: &str, id: Option<HandlerId>) -> usize {
        self.inner.handlers.remove(event, id)
    }

    /// Number of handlers registered for `event`.
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        self.inner.handlers.count(event)
    }

    /// Connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.transport.state()
    }

    /// True when connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.transport.is_connected()
    }

    /// Reconnect attempts since the last successful connection.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.transport.reconnect_attempts()
    }
}

impl std::fmt::Debug for RealtimeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeManager")
            .field("state", &self.state())
            .field("reconnect_attempts", &self.reconnect_attempts())
            .finish_non_exhaustive()
    }
}
