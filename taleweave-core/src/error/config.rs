//! Startup configuration failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems found while loading or checking [`TaleweaveConfig`](crate::config::TaleweaveConfig).
///
/// Raised before any network traffic, so none of them is retried.
///
/// ```
/// use taleweave_core::error::ConfigError;
///
/// let error = ConfigError::invalid_value("realtime.max_reconnect_attempts", "must be at least 1");
/// assert!(error.to_string().starts_with("[Config]"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// A setting without a usable default was left empty.
    #[error("[Config] '{field}' is required{}", section.as_ref().map(|s| format!(" (section '{s}')")).unwrap_or_default())]
    MissingField {
        /// Dotted path of the setting.
        field: String,
        /// Enclosing section, when known.
        section: Option<String>,
    },

    /// A setting is present but unusable.
    #[error("[Config] '{field}' rejected: {reason}")]
    InvalidValue {
        /// Dotted path of the setting.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The config file exists on the command line but cannot be opened.
    #[error("[Config] Cannot open '{path}': {reason}")]
    FileReadError {
        /// File given by the caller.
        path: String,
        /// OS error text.
        reason: String,
    },

    /// The config file does not parse as YAML, TOML, or JSON.
    #[error("[Config] '{path}' is not a valid config file: {reason}")]
    InvalidFormat {
        /// File given by the caller.
        path: String,
        /// Parser error text.
        reason: String,
    },

    /// A `TALEWEAVE_*` override could not be parsed into its field type.
    #[error("[Config] Environment override '{name}' rejected: {reason}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// Parse error text.
        reason: String,
    },
}

impl ConfigError {
    /// Always false: a bad config stays bad until someone edits it.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        false
    }

    /// Unreadable input is fatal; a bad single value is a warning so callers
    /// may fall back to defaults.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::MissingField { .. } | Self::InvalidFormat { .. } => ErrorSeverity::Fatal,
            Self::InvalidValue { .. } | Self::FileReadError { .. } | Self::InvalidEnvVar { .. } => {
                ErrorSeverity::Warning
            }
        }
    }

    /// Never retried.
    #[must_use]
    pub fn suggested_retry_delay_ms(&self) -> Option<u64> {
        None
    }

    /// Builds [`ConfigError::InvalidValue`].
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Builds [`ConfigError::FileReadError`].
    #[must_use]
    pub fn file_read_error(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FileReadError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Builds [`ConfigError::InvalidFormat`].
    #[must_use]
    pub fn invalid_format(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
