//! Notification feed entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Unique identifier for a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    /// Creates a new `NotificationId`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new unique `NotificationId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Severity of a notification or toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSeverity {
    /// Completed action.
    Success,
    /// Needs attention but nothing failed.
    Warning,
    /// Something failed.
    Error,
    /// Plain information.
    #[default]
    Info,
}

impl NotificationSeverity {
    /// Returns true for severities that also raise a transient toast.
    #[must_use]
    pub const fn raises_toast(&self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }

    /// Returns the wire name of the severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for NotificationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationSeverity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "info" => Ok(Self::Info),
            other => Err(ValidationError::UnknownSeverity(other.to_string())),
        }
    }
}

/// A notification held in the client feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification identifier.
    pub id: NotificationId,
    /// Severity.
    pub severity: NotificationSeverity,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Whether the user has acknowledged it.
    #[serde(default)]
    pub read: bool,
    /// Optional navigation target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Fields supplied when inserting a notification; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Severity.
    pub severity: NotificationSeverity,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Optional navigation target.
    pub action: Option<String>,
}

impl NewNotification {
    /// Creates a notification without an action target.
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
            action: None,
        }
    }

    /// Sets the navigation target.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Materialises the notification with a fresh id and the current time.
    #[must_use]
    pub fn into_notification(self) -> Notification {
        Notification {
            id: NotificationId::generate(),
            severity: self.severity,
            title: self.title,
            message: self.message,
            created_at: Utc::now(),
            read: false,
            action: self.action,
        }
    }
}
