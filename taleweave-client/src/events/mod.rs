//! Realtime event registry and fan-out.
//!
//! [`RealtimeEvent`] is the closed set of inbound kinds the runtime
//! understands. [`EventBridge`] decodes each envelope against it and applies
//! the resulting store mutations, notifications, toasts, and re-broadcasts.

mod bridge;
mod kinds;

pub use bridge::{DispatchOutcome, EventBridge};
pub use kinds::{
    AnalyticsUpdate, AssessmentComplete, DeepInsights, EventKind, HighRiskAlert, Identify,
    JournalEntryCreated, LiveActivity, PresenceSnapshot, QuizCompleted, RealtimeEvent, RiskAlert,
    RiskLevel, ServerNotification, StoryProgress, UserOnline,
};
