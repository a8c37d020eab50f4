//! Errors for every layer of the client.
//!
//! Each layer has its own enum ([`ApiError`] for REST, [`NetworkError`] for
//! the socket, [`EventError`] for inbound events, [`ConfigError`] and
//! [`StorageError`] for local state). [`TaleweaveError`] wraps them all.
//! Messages carry a `[Category]` prefix so log lines are greppable.
//!
//! ```
//! use taleweave_core::error::{NetworkError, TaleweaveError};
//!
//! let error: TaleweaveError = NetworkError::Timeout { timeout_ms: 5000 }.into();
//! assert_eq!(error.category(), "network");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How bad an error is, independent of where it came from.
///
/// ```
/// use taleweave_core::error::ErrorSeverity;
///
/// assert!(ErrorSeverity::Recoverable.is_recoverable());
/// assert!(!ErrorSeverity::Fatal.is_recoverable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// The operation cannot continue.
    Fatal,
    /// Retry or fallback will likely succeed.
    #[default]
    Recoverable,
    /// Surfaced to the user; the client keeps going.
    Warning,
    /// Expected and handled.
    Info,
}

impl ErrorSeverity {
    /// Anything short of fatal.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        !self.is_fatal()
    }

    /// Stops the operation.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Fatal)
    }

    /// Worth showing, not worth stopping for.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::Warning)
    }

    /// Expected condition.
    #[must_use]
    pub const fn is_info(self) -> bool {
        matches!(self, Self::Info)
    }

    /// Uppercase label for log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Recoverable => "RECOVERABLE",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod api;
mod config;
mod event;
mod network;
mod storage;

pub use api::ApiError;
pub use config::ConfigError;
pub use event::EventError;
pub use network::NetworkError;
pub use storage::StorageError;

/// Any error the client runtime can produce.
///
/// Each layer keeps its own enum; this one exists for callers that handle
/// them uniformly, such as the CLI.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaleweaveError {
    /// Live-updates socket.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// REST call.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Inbound event decoding.
    #[error(transparent)]
    Event(#[from] EventError),

    /// Startup configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session persistence.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

macro_rules! each_layer {
    ($self:ident, $e:ident => $body:expr) => {
        match $self {
            Self::Network($e) => $body,
            Self::Api($e) => $body,
            Self::Event($e) => $body,
            Self::Config($e) => $body,
            Self::Storage($e) => $body,
        }
    };
}

impl TaleweaveError {
    /// Severity reported by the wrapped error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        each_layer!(self, e => e.severity())
    }

    /// Short of fatal.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Retry hint reported by the wrapped error.
    #[must_use]
    pub fn suggested_retry_delay_ms(&self) -> Option<u64> {
        each_layer!(self, e => e.suggested_retry_delay_ms())
    }

    /// Which layer failed, for structured log fields.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Api(_) => "api",
            Self::Event(_) => "event",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
        }
    }
}

/// Result alias over [`TaleweaveError`].
pub type Result<T> = std::result::Result<T, TaleweaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_labels() {
        assert_eq!(ErrorSeverity::Fatal.to_string(), "FATAL");
        assert_eq!(ErrorSeverity::Recoverable.to_string(), "RECOVERABLE");
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARNING");
        assert_eq!(ErrorSeverity::Info.to_string(), "INFO");
    }

    #[test]
    fn test_conversions_and_category() {
        let err: TaleweaveError = ApiError::SessionExpired.into();
        assert_eq!(err.category(), "api");
        assert_eq!(err.to_string(), ApiError::SessionExpired.to_string());

        let err: TaleweaveError = EventError::UnknownEvent { event: "x".into() }.into();
        assert_eq!(err.category(), "event");

        let err: TaleweaveError = StorageError::read_error("p", "r").into();
        assert_eq!(err.category(), "storage");

        let err: TaleweaveError = ConfigError::invalid_value("api.base_url", "empty").into();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_delegation() {
        let err = TaleweaveError::Api(ApiError::RateLimited {
            retry_after_ms: 2000,
        });
        assert_eq!(err.suggested_retry_delay_ms(), Some(2000));
        assert!(err.is_recoverable());

        let err = TaleweaveError::Config(ConfigError::invalid_format("a.toml", "bad"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_serde_roundtrip() {
        let err = TaleweaveError::Network(NetworkError::Timeout { timeout_ms: 3000 });
        let json = serde_json::to_string(&err).unwrap();
        let parsed: TaleweaveError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, parsed);
    }
}
