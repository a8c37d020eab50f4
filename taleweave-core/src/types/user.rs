//! User identity types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Platform user identifier.
///
/// # Examples
///
/// ```
/// use taleweave_core::types::UserId;
///
/// let id = UserId::new("stu-42").unwrap();
/// assert_eq!(id.as_str(), "stu-42");
/// assert!(UserId::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new `UserId`, rejecting empty or whitespace-only values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyIdentifier` if the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier("user id"));
        }
        Ok(Self(s))
    }

    /// Creates a new `UserId` without validation.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Role of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Learner reading stories and writing journal entries.
    #[default]
    Student,
    /// Educator following a class.
    Teacher,
    /// Guardian following their children.
    Parent,
    /// Platform administrator.
    Admin,
}

impl Role {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
            Self::Admin => "admin",
        }
    }

    /// Returns true for roles that supervise students and receive risk alerts.
    #[must_use]
    pub const fn is_supervisor(&self) -> bool {
        matches!(self, Self::Teacher | Self::Parent | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "parent" => Ok(Self::Parent),
            "admin" => Ok(Self::Admin),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

/// An authenticated platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email, when the backend shares it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Platform role.
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Creates a new user record.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            role,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validation() {
        assert!(UserId::new("u-1").is_ok());
        assert_eq!(
            UserId::new("   "),
            Err(ValidationError::EmptyIdentifier("user id"))
        );
    }

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("Teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!(Role::Parent.to_string(), "parent");
        assert!("wizard".parse::<Role>().is_err());
        assert!(Role::Teacher.is_supervisor());
        assert!(!Role::Student.is_supervisor());
    }

    #[test]
    fn test_user_wire_format() {
        let json = r#"{"id":"t-7","name":"Ms. Rivera","role":"teacher"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.as_str(), "t-7");
        assert_eq!(user.role, Role::Teacher);
        assert!(user.email.is_none());

        let encoded = serde_json::to_value(&user).unwrap();
        assert!(encoded.get("email").is_none());
    }

    #[test]
    fn test_user_role_defaults_to_student() {
        let user: User = serde_json::from_str(r#"{"id":"s-1","name":"Ada"}"#).unwrap();
        assert_eq!(user.role, Role::Student);
    }
}
