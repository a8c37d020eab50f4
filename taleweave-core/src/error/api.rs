//! REST gateway error types.
//!
//! Every failed backend call is classified into one [`ApiError`] variant. The
//! classification drives the user-facing notification and whether the session
//! survives the failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::NotificationSeverity;

/// Classified failure of a backend request.
///
/// # Examples
///
/// ```
/// use taleweave_core::error::ApiError;
///
/// let error = ApiError::from_status(404, None, None);
/// assert_eq!(error, ApiError::NotFound { message: None });
///
/// let error = ApiError::from_status(429, None, Some(3_000));
/// assert!(error.to_string().contains("3000ms"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiError {
    /// Credential rejected and no further refresh is permitted.
    #[error("[Api] Unauthorized{}", fmt_message(message.as_deref()))]
    Unauthorized {
        /// Server-supplied message.
        message: Option<String>,
    },

    /// Credential refresh failed; the session has been ended.
    #[error("[Api] Session expired")]
    SessionExpired,

    /// Authenticated but not permitted.
    #[error("[Api] Forbidden{}", fmt_message(message.as_deref()))]
    Forbidden {
        /// Server-supplied message.
        message: Option<String>,
    },

    /// Resource does not exist.
    #[error("[Api] Not found{}", fmt_message(message.as_deref()))]
    NotFound {
        /// Server-supplied message.
        message: Option<String>,
    },

    /// Request payload rejected by server-side validation.
    #[error("[Api] Validation failed: {message}")]
    Validation {
        /// Server-supplied message.
        message: String,
    },

    /// Rate limit hit. The client does not retry on its own.
    #[error("[Api] Rate limited, retry after {retry_after_ms}ms")]
    RateLimited {
        /// Server hint converted to milliseconds; 0 when absent.
        retry_after_ms: u64,
    },

    /// 5xx response.
    #[error("[Api] Server error {status}{}", fmt_message(message.as_deref()))]
    Server {
        /// HTTP status.
        status: u16,
        /// Server-supplied message.
        message: Option<String>,
    },

    /// Any other non-success status.
    #[error("[Api] HTTP {status}{}", fmt_message(message.as_deref()))]
    Http {
        /// HTTP status.
        status: u16,
        /// Server-supplied message.
        message: Option<String>,
    },

    /// Backend could not be reached.
    #[error("[Api] Backend unreachable: {reason}")]
    Unreachable {
        /// Transport failure description.
        reason: String,
    },

    /// Request exceeded the configured timeout.
    #[error("[Api] Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// Response body could not be decoded.
    #[error("[Api] Failed to decode response: {reason}")]
    Decode {
        /// Decoder message.
        reason: String,
    },
}

fn fmt_message(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl ApiError {
    /// Classifies a non-success HTTP status.
    ///
    /// `retry_after_ms` is only consulted for 429.
    #[must_use]
    pub fn from_status(status: u16, message: Option<String>, retry_after_ms: Option<u64>) -> Self {
        match status {
            401 => Self::Unauthorized { message },
            403 => Self::Forbidden { message },
            404 => Self::NotFound { message },
            422 => Self::Validation {
                message: message.unwrap_or_else(|| "Invalid request".to_string()),
            },
            429 => Self::RateLimited {
                retry_after_ms: retry_after_ms.unwrap_or(0),
            },
            500..=599 => Self::Server { status, message },
            _ => Self::Http { status, message },
        }
    }

    /// Returns the HTTP status this error was classified from, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Validation { .. } => Some(422),
            Self::RateLimited { .. } => Some(429),
            Self::Server { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::SessionExpired
            | Self::Unreachable { .. }
            | Self::Timeout { .. }
            | Self::Decode { .. } => None,
        }
    }

    /// Returns true when the backend could not be contacted at all.
    ///
    /// Read paths fall back to cached or bundled data on these.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }

    /// Returns true if this error is recoverable (can be retried).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::Server { .. }
                | Self::Unreachable { .. }
                | Self::Timeout { .. }
        )
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::RateLimited { .. }
            | Self::Server { .. }
            | Self::Unreachable { .. }
            | Self::Timeout { .. } => ErrorSeverity::Recoverable,
            Self::Unauthorized { .. }
            | Self::SessionExpired
            | Self::Forbidden { .. }
            | Self::Validation { .. }
            | Self::Http { .. }
            | Self::Decode { .. } => ErrorSeverity::Warning,
            Self::NotFound { .. } => ErrorSeverity::Info,
        }
    }

    /// Returns a suggested retry delay in milliseconds, if applicable.
    #[must_use]
    pub fn suggested_retry_delay_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            Self::Server { .. } | Self::Unreachable { .. } => Some(1000),
            Self::Timeout { timeout_ms } => Some(*timeout_ms / 2),
            _ => None,
        }
    }

    /// Severity of the notification raised for this failure.
    #[must_use]
    pub const fn notification_severity(&self) -> NotificationSeverity {
        match self {
            Self::SessionExpired | Self::RateLimited { .. } | Self::Validation { .. } => {
                NotificationSeverity::Warning
            }
            Self::NotFound { .. } => NotificationSeverity::Info,
            _ => NotificationSeverity::Error,
        }
    }

    /// Short notification title for this failure class.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } | Self::SessionExpired => "Signed out",
            Self::Forbidden { .. } => "Access denied",
            Self::NotFound { .. } => "Not found",
            Self::Validation { .. } => "Check your input",
            Self::RateLimited { .. } => "Slow down",
            Self::Server { .. } => "Server error",
            Self::Http { .. } => "Request failed",
            Self::Unreachable { .. } | Self::Timeout { .. } => "Connection problem",
            Self::Decode { .. } => "Unexpected response",
        }
    }

    /// Text shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { message } => message
                .clone()
                .unwrap_or_else(|| "Please sign in to continue.".to_string()),
            Self::SessionExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::Forbidden { .. } => "You do not have permission to do that.".to_string(),
            Self::NotFound { message } => message
                .clone()
                .unwrap_or_else(|| "The requested item could not be found.".to_string()),
            Self::Validation { message } => message.clone(),
            Self::RateLimited { retry_after_ms } if *retry_after_ms > 0 => format!(
                "Too many requests. Try again in {} seconds.",
                retry_after_ms.div_ceil(1000)
            ),
            Self::RateLimited { .. } => "Too many requests. Try again shortly.".to_string(),
            Self::Server { .. } => "Something went wrong on our side. Please try again.".to_string(),
            Self::Http { message, .. } => message
                .clone()
                .unwrap_or_else(|| "The request could not be completed.".to_string()),
            Self::Unreachable { .. } | Self::Timeout { .. } => {
                "Unable to reach the server. Check your connection.".to_string()
            }
            Self::Decode { .. } => "The server sent a response we could not read.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ApiError::from_status(403, None, None),
            ApiError::Forbidden { .. }
        ));
        assert!(matches!(
            ApiError::from_status(404, None, None),
            ApiError::NotFound { .. }
        ));
        assert_eq!(
            ApiError::from_status(422, Some("title required".into()), None),
            ApiError::Validation {
                message: "title required".into()
            }
        );
        assert_eq!(
            ApiError::from_status(429, None, Some(2000)),
            ApiError::RateLimited {
                retry_after_ms: 2000
            }
        );
        assert!(matches!(
            ApiError::from_status(503, None, None),
            ApiError::Server { status: 503, .. }
        ));
        assert!(matches!(
            ApiError::from_status(409, Some("conflict".into()), None),
            ApiError::Http { status: 409, .. }
        ));
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [401, 403, 404, 422, 429, 500, 502, 400, 409] {
            assert_eq!(
                ApiError::from_status(status, None, None).status(),
                Some(status)
            );
        }
        assert_eq!(ApiError::SessionExpired.status(), None);
    }

    #[test]
    fn test_user_messages() {
        let err = ApiError::RateLimited {
            retry_after_ms: 2500,
        };
        assert!(err.user_message().contains("3 seconds"));

        let err = ApiError::Http {
            status: 400,
            message: Some("Email already in use".into()),
        };
        assert_eq!(err.user_message(), "Email already in use");

        let err = ApiError::Unreachable {
            reason: "connection refused".into(),
        };
        assert!(err.is_connectivity());
        assert!(!err.user_message().contains("refused"));
    }

    #[test]
    fn test_notification_severity() {
        assert_eq!(
            ApiError::Server {
                status: 500,
                message: None
            }
            .notification_severity(),
            NotificationSeverity::Error
        );
        assert_eq!(
            ApiError::SessionExpired.notification_severity(),
            NotificationSeverity::Warning
        );
    }

    #[test]
    fn test_display_includes_message() {
        let err = ApiError::Forbidden {
            message: Some("teachers only".into()),
        };
        assert_eq!(err.to_string(), "[Api] Forbidden: teachers only");
        let err = ApiError::Forbidden { message: None };
        assert_eq!(err.to_string(), "[Api] Forbidden");
    }
}
