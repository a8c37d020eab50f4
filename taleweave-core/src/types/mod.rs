//! Domain records shared across the client runtime.
//!
//! # Types
//!
//! - [`UserId`] / [`User`] / [`Role`] - Platform identities
//! - [`Session`] - Authenticated identity plus bearer credential
//! - [`Notification`] / [`NotificationSeverity`] - In-app notification feed entries
//! - [`Theme`] - Persisted UI theme preference

mod notification;
mod preferences;
mod session;
mod user;

pub use notification::{NewNotification, Notification, NotificationId, NotificationSeverity};
pub use preferences::Theme;
pub use session::Session;
pub use user::{Role, User, UserId};

/// Validation error for domain type construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Identifier is empty
    #[error("{0} cannot be empty")]
    EmptyIdentifier(&'static str),

    /// Role name is not one of the known roles
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Severity name is not one of the known severities
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),

    /// Theme name is not one of the known themes
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
}
