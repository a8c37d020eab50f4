//! Applies decoded realtime events to the store and the local bus.

use serde_json::Value;
use taleweave_core::error::EventError;
use taleweave_core::types::{NewNotification, NotificationSeverity};
use taleweave_gateway::ws::EventEnvelope;
use tracing::{debug, warn};

use super::kinds::{EventKind, RealtimeEvent};
use crate::bus::{LocalBus, UiSignal};
use crate::store::Store;

/// Result of dispatching one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event was decoded and its actions ran.
    Applied(EventKind),
    /// The event was dropped without touching state.
    Rejected(EventError),
}

impl DispatchOutcome {
    /// True for [`DispatchOutcome::Applied`].
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Routes inbound events to store mutations, notifications, toasts, and
/// re-broadcasts.
#[derive(Debug, Clone)]
pub struct EventBridge {
    store: Store,
    bus: LocalBus,
}

impl EventBridge {
    /// Creates a bridge over `store` and `bus`.
    #[must_use]
    pub fn new(store: Store, bus: LocalBus) -> Self {
        Self { store, bus }
    }

    /// Decodes and applies one envelope.
    pub fn dispatch(&self, envelope: &EventEnvelope) -> DispatchOutcome {
        let event = match RealtimeEvent::decode(&envelope.event, &envelope.data) {
            Ok(event) => event,
            Err(error @ EventError::UnknownEvent { .. }) => {
                warn!(event = %envelope.event, "Unknown realtime event");
                self.bus.publish(UiSignal::ProtocolWarning {
                    event: envelope.event.clone(),
                });
                return DispatchOutcome::Rejected(error);
            }
            Err(error) => {
                warn!(%error, "Rejected realtime event");
                return DispatchOutcome::Rejected(error);
            }
        };

        let kind = event.kind();
        debug!(event = %kind, "Applying realtime event");
        self.apply(event, &envelope.data);
        DispatchOutcome::Applied(kind)
    }

    fn apply(&self, event: RealtimeEvent, raw: &Value) {
        let name = event.kind().name();

        match event {
            RealtimeEvent::PresenceUpdate(snapshot) => {
                self.store.replace_presence(snapshot.users);
            }
            RealtimeEvent::UserOnline(change) => {
                self.store.set_user_online(change.user_id, change.online);
            }
            RealtimeEvent::Notification(n) => {
                let title = if n.title.trim().is_empty() {
                    "Notification".to_string()
                } else {
                    n.title
                };
                let mut new = NewNotification::new(n.severity, title, n.message);
                if let Some(action) = n.action {
                    new = new.with_action(action);
                }
                self.notify(new);
            }
            RealtimeEvent::AssessmentComplete(a) => {
                self.notify(NewNotification::new(
                    NotificationSeverity::Success,
                    "Assessment complete",
                    format!("Student {} scored {}", a.student_id, a.score),
                ));
                self.bus.broadcast(name, raw.clone());
            }
            RealtimeEvent::RiskAlert(alert) => {
                self.notify(NewNotification::new(
                    alert.level.severity(),
                    "Risk alert",
                    alert.message,
                ));
                self.bus.broadcast(name, raw.clone());
            }
            RealtimeEvent::HighRiskAlert(alert) => {
                self.notify(NewNotification::new(
                    NotificationSeverity::Error,
                    "High risk alert",
                    alert.message,
                ));
                self.bus.broadcast(name, raw.clone());
            }
            RealtimeEvent::AnalyticsUpdate(_)
            | RealtimeEvent::StoryProgress(_)
            | RealtimeEvent::JournalEntryCreated(_)
            | RealtimeEvent::QuizCompleted(_)
            | RealtimeEvent::LiveActivity(_)
            | RealtimeEvent::DeepInsights(_) => {
                self.bus.broadcast(name, raw.clone());
            }
        }
    }

    /// Stores the notification and raises a toast for warning/error severities.
    fn notify(&self, notification: NewNotification) {
        if notification.severity.raises_toast() {
            self.bus.toast(
                notification.severity,
                notification.title.clone(),
                notification.message.clone(),
            );
        }
        self.store.push_notification(notification);
    }
}
