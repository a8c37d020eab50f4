//! Authenticated session state.

use std::fmt;

use super::User;

/// User identity plus bearer credential.
///
/// `is_authenticated()` is true exactly when a user is present. The fields
/// are private so the pair can only change together through [`Session::login`]
/// and [`Session::clear`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
}

impl Session {
    /// Creates an empty, unauthenticated session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an authenticated session.
    #[must_use]
    pub fn authenticated(user: User, token: Option<String>) -> Self {
        Self {
            user: Some(user),
            token,
        }
    }

    /// Stores the user and credential after a successful login.
    pub fn login(&mut self, user: User, token: impl Into<String>) {
        self.user = Some(user);
        self.token = Some(token.into());
    }

    /// Replaces the bearer credential, keeping the current user.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Drops user and credential.
    pub fn clear(&mut self) {
        self.user = None;
        self.token = None;
    }

    /// Returns the authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Returns the bearer credential, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns true when a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
