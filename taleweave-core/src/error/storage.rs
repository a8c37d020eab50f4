//! Failures persisting the session blob.
//!
//! The client keeps one small JSON document on disk (identity, credential,
//! UI preferences). None of these errors stop the client: it carries on with
//! in-memory state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the session blob could not be loaded or saved.
///
/// ```
/// use taleweave_core::error::StorageError;
///
/// let error = StorageError::write_error("/tmp/taleweave-storage.json", "Disk full");
/// assert_eq!(
///     error.to_string(),
///     "[Storage] Cannot write '/tmp/taleweave-storage.json': Disk full"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageError {
    /// Blob exists but could not be read.
    #[error("[Storage] Cannot read '{path}': {reason}")]
    Read {
        /// File path.
        path: String,
        /// OS error text.
        reason: String,
    },

    /// Blob or its directory could not be written.
    #[error("[Storage] Cannot write '{path}': {reason}")]
    Write {
        /// File or directory path.
        path: String,
        /// OS error text.
        reason: String,
    },

    /// In-memory state did not encode.
    #[error("[Storage] Cannot encode session state: {reason}")]
    SerializationError {
        /// Encoder error text.
        reason: String,
    },

    /// Blob on disk is not valid session JSON.
    #[error("[Storage] '{path}' is corrupt: {reason}")]
    DeserializationError {
        /// File path.
        path: String,
        /// Decoder error text.
        reason: String,
    },
}

impl StorageError {
    /// Always true.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Always a warning.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        super::ErrorSeverity::Warning
    }

    /// Only disk I/O is worth retrying; bad data stays bad.
    #[must_use]
    pub fn suggested_retry_delay_ms(&self) -> Option<u64> {
        matches!(self, Self::Read { .. } | Self::Write { .. }).then_some(100)
    }

    /// Builds [`StorageError::Read`].
    #[must_use]
    pub fn read_error(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Builds [`StorageError::Write`].
    #[must_use]
    pub fn write_error(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_failures_are_retried() {
        let error = StorageError::read_error("/data/blob.json", "Permission denied");
        assert!(matches!(error, StorageError::Read { .. }));
        assert_eq!(error.suggested_retry_delay_ms(), Some(100));

        let error = StorageError::write_error("/data/blob.json", "No space");
        assert!(matches!(error, StorageError::Write { .. }));
        assert_eq!(error.suggested_retry_delay_ms(), Some(100));
    }

    #[test]
    fn test_corrupt_blob_is_a_warning_without_retry() {
        let error = StorageError::DeserializationError {
            path: "blob.json".to_string(),
            reason: "expected value".to_string(),
        };
        assert!(error.is_recoverable());
        assert!(error.severity().is_warning());
        assert_eq!(error.suggested_retry_delay_ms(), None);
    }
}
