//! Failures of the live-updates socket.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the socket could not be opened or stopped working.
///
/// Everything except a malformed endpoint is worth retrying; the transport's
/// bounded reconnect loop decides how often.
///
/// ```
/// use taleweave_core::error::NetworkError;
///
/// let error = NetworkError::ConnectionFailed {
///     reason: "Connection refused".to_string(),
/// };
/// assert!(error.is_recoverable());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkError {
    /// TCP or TLS handshake failed.
    #[error("[Network] Could not reach live-updates server: {reason}")]
    ConnectionFailed {
        /// Transport error text.
        reason: String,
    },

    /// Handshake or keepalive did not complete in time.
    #[error("[Network] No response within {timeout_ms}ms")]
    Timeout {
        /// The deadline that passed.
        timeout_ms: u64,
    },

    /// Configured endpoint does not parse.
    #[error("[Network] Bad socket URL '{url}': {reason}")]
    InvalidUrl {
        /// Configured value.
        url: String,
        /// Parser error text.
        reason: String,
    },

    /// Protocol-level socket failure.
    #[error("[Network] Socket error: {reason}")]
    WebSocket {
        /// Protocol error text.
        reason: String,
    },

    /// Server or network closed an open socket.
    #[error("[Network] Socket closed: {reason}")]
    ConnectionClosed {
        /// Close frame text, or why the stream ended.
        reason: String,
    },
}

impl NetworkError {
    /// False only for a bad endpoint.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidUrl { .. })
    }

    /// Severity for logging.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        if self.is_recoverable() {
            super::ErrorSeverity::Recoverable
        } else {
            super::ErrorSeverity::Warning
        }
    }

    /// Hint for callers retrying on their own schedule.
    #[must_use]
    pub fn suggested_retry_delay_ms(&self) -> Option<u64> {
        match self {
            Self::Timeout { timeout_ms } => Some(*timeout_ms / 2),
            Self::ConnectionFailed { .. } | Self::ConnectionClosed { .. } => Some(1_000),
            Self::WebSocket { .. } => Some(500),
            Self::InvalidUrl { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refused_connection_is_retried() {
        let error = NetworkError::ConnectionFailed {
            reason: "Connection refused".to_string(),
        };
        assert!(error.to_string().contains("Connection refused"));
        assert_eq!(error.suggested_retry_delay_ms(), Some(1_000));
    }

    #[test]
    fn test_timeout_retry_hint_is_half_the_deadline() {
        let error = NetworkError::Timeout { timeout_ms: 5000 };
        assert!(error.to_string().contains("5000ms"));
        assert_eq!(error.suggested_retry_delay_ms(), Some(2500));
    }

    #[test]
    fn test_bad_url_is_not_retried() {
        let error = NetworkError::InvalidUrl {
            url: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert!(!error.is_recoverable());
        assert!(error.severity().is_warning());
        assert_eq!(error.suggested_retry_delay_ms(), None);
    }
}
