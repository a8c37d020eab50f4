//! Realtime event decoding errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to turn an inbound realtime frame into a typed event.
///
/// # Examples
///
/// ```
/// use taleweave_core::error::EventError;
///
/// let error = EventError::UnknownEvent { event: "teleport".to_string() };
/// assert!(error.to_string().contains("teleport"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventError {
    /// Frame could not be parsed as an `{event, data}` envelope.
    #[error("[Event] Invalid frame: {reason}")]
    InvalidFrame {
        /// Parser message.
        reason: String,
    },

    /// Event name is not in the registry.
    #[error("[Event] Unknown event kind: {event}")]
    UnknownEvent {
        /// Received event name.
        event: String,
    },

    /// Payload did not match the registered shape.
    #[error("[Event] Malformed payload for '{event}': {reason}")]
    MalformedPayload {
        /// Event name.
        event: String,
        /// What was wrong.
        reason: String,
    },
}

impl EventError {
    /// Creates a malformed payload error.
    #[must_use]
    pub fn malformed(event: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            event: event.into(),
            reason: reason.into(),
        }
    }

    /// Returns the event name involved, if known.
    #[must_use]
    pub fn event(&self) -> Option<&str> {
        match self {
            Self::InvalidFrame { .. } => None,
            Self::UnknownEvent { event } | Self::MalformedPayload { event, .. } => Some(event),
        }
    }

    /// Returns true if this error is recoverable.
    ///
    /// A bad frame is dropped and the connection stays up.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::UnknownEvent { .. } => ErrorSeverity::Info,
            Self::InvalidFrame { .. } | Self::MalformedPayload { .. } => ErrorSeverity::Warning,
        }
    }

    /// Returns a suggested retry delay in milliseconds, if applicable.
    #[must_use]
    pub fn suggested_retry_delay_ms(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name() {
        assert_eq!(
            EventError::malformed("alert:risk", "missing level").event(),
            Some("alert:risk")
        );
        assert_eq!(
            EventError::InvalidFrame {
                reason: "eof".into()
            }
            .event(),
            None
        );
    }

    #[test]
    fn test_severity() {
        let unknown = EventError::UnknownEvent {
            event: "x".into(),
        };
        assert!(unknown.severity().is_info());
        assert!(unknown.is_recoverable());
    }
}
