//! In-process signal bus for UI consumers.

use serde::Serialize;
use serde_json::Value;
use taleweave_core::types::NotificationSeverity;
use tokio::sync::broadcast;
use tracing::trace;

/// Capacity of the broadcast channel. Slow receivers lag past this.
pub const BUS_CAPACITY: usize = 256;

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    /// Severity.
    pub severity: NotificationSeverity,
    /// Title line.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl Toast {
    /// Creates a toast.
    #[must_use]
    pub fn new(
        severity: NotificationSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Navigation targets the runtime may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Unauthenticated entry point.
    Login,
}

/// What the bus carries.
#[derive(Debug, Clone, PartialEq)]
pub enum UiSignal {
    /// Show a toast.
    Toast(Toast),
    /// Loosely typed re-broadcast of a realtime payload.
    Broadcast {
        /// Event name.
        name: String,
        /// Raw payload.
        payload: Value,
    },
    /// Navigate somewhere.
    Redirect(Route),
    /// An inbound event kind is not in the registry.
    ProtocolWarning {
        /// Unrecognized event name.
        event: String,
    },
}

/// Fan-out of [`UiSignal`]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct LocalBus {
    tx: broadcast::Sender<UiSignal>,
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBus {
    /// Creates a bus with [`BUS_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// New receiver; sees signals published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<UiSignal> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publishes a signal and returns how many receivers got it.
    pub fn publish(&self, signal: UiSignal) -> usize {
        match self.tx.send(signal) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(signal)) => {
                trace!(?signal, "No bus subscribers");
                0
            }
        }
    }

    /// Publishes a toast.
    pub fn toast(
        &self,
        severity: NotificationSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> usize {
        self.publish(UiSignal::Toast(Toast::new(severity, title, message)))
    }

    /// Publishes a re-broadcast of a realtime payload.
    pub fn broadcast(&self, name: impl Into<String>, payload: Value) -> usize {
        self.publish(UiSignal::Broadcast {
            name: name.into(),
            payload,
        })
    }

    /// Requests navigation.
    pub fn redirect(&self, route: Route) -> usize {
        self.publish(UiSignal::Redirect(route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = LocalBus::new();
        assert_eq!(bus.redirect(Route::Login), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_in_order() {
        let bus = LocalBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        assert_eq!(
            bus.toast(NotificationSeverity::Error, "Risk", "Check in"),
            2
        );
        bus.broadcast("story:progress", json!({"progress": 10}));

        for rx in [&mut a, &mut b] {
            assert!(matches!(rx.recv().await.unwrap(), UiSignal::Toast(t) if t.title == "Risk"));
            assert!(
                matches!(rx.recv().await.unwrap(), UiSignal::Broadcast { name, .. } if name == "story:progress")
            );
        }
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_signals() {
        let bus = LocalBus::new();
        let _early = bus.subscribe();
        bus.redirect(Route::Login);
        let mut late = bus.subscribe();
        bus.toast(NotificationSeverity::Info, "t", "m");
        assert!(matches!(late.recv().await.unwrap(), UiSignal::Toast(_)));
    }
}
