//! Session hooks backed by the client store.

use taleweave_core::error::ApiError;
use taleweave_core::types::{NewNotification, NotificationSeverity};
use taleweave_gateway::rest::SessionHooks;
use tracing::{debug, warn};

use crate::bus::{LocalBus, Route};
use crate::realtime::RealtimeManager;
use crate::store::{StatePersistence, Store};

/// Connects the HTTP gateway to the store and the local bus.
///
/// Reads the credential from the session, records refreshed credentials,
/// signs out on an expired session, turns failures into notifications, and
/// drives the in-flight counter. An expired session also closes the realtime
/// socket when one is attached with [`with_realtime`](Self::with_realtime).
#[derive(Debug, Clone)]
pub struct StoreSessionHooks {
    store: Store,
    bus: LocalBus,
    persistence: Option<StatePersistence>,
    realtime: Option<RealtimeManager>,
}

impl StoreSessionHooks {
    /// Creates hooks over `store` and `bus`, persisting through `persistence` when set.
    #[must_use]
    pub fn new(store: Store, bus: LocalBus, persistence: Option<StatePersistence>) -> Self {
        Self {
            store,
            bus,
            persistence,
            realtime: None,
        }
    }

    /// Attaches the realtime manager closed on session expiry.
    #[must_use]
    pub fn with_realtime(mut self, realtime: RealtimeManager) -> Self {
        self.realtime = Some(realtime);
        self
    }

    fn close_realtime(&self) {
        let Some(realtime) = self.realtime.clone() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { realtime.disconnect().await });
            }
            Err(_) => debug!("No runtime, realtime socket left to its owner"),
        }
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence
            && let Err(error) = self.store.save_to(persistence)
        {
            warn!(%error, "Failed to persist session");
        }
    }
}

impl SessionHooks for StoreSessionHooks {
    fn credential(&self) -> Option<String> {
        self.store.token()
    }

    fn credential_refreshed(&self, token: &str) {
        self.store.set_token(token);
        self.persist();
    }

    fn session_expired(&self) {
        self.store.logout();
        self.persist();
        self.close_realtime();
        self.bus.redirect(Route::Login);
        let expired = ApiError::SessionExpired;
        self.bus.toast(
            NotificationSeverity::Warning,
            expired.title(),
            expired.user_message(),
        );
    }

    fn request_failed(&self, method: &str, path: &str, error: &ApiError) {
        debug!(method, path, %error, "Request failed");
        let severity = error.notification_severity();
        let title = error.title();
        let message = error.user_message();
        if severity.raises_toast() {
            self.bus.toast(severity, title, message.clone());
        }
        self.store
            .push_notification(NewNotification::new(severity, title, message));
    }

    fn request_started(&self) {
        self.store.begin_request();
    }

    fn request_finished(&self) {
        self.store.end_request();
    }
}
