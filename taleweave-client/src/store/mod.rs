//! Client state store.
//!
//! [`Store`] is a cheaply clonable handle over one [`AppState`]. Every
//! mutation takes the write lock once, so compound transitions such as
//! [`Store::logout`] are observed atomically. No method awaits while holding
//! the lock.

mod persist;
mod state;

pub use persist::{PersistedState, STORAGE_KEY, StatePersistence};
pub use state::{AppState, MAX_NOTIFICATIONS};

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use taleweave_core::error::StorageError;
use taleweave_core::types::{
    NewNotification, Notification, NotificationId, Session, Theme, User, UserId,
};
use tracing::debug;

/// Shared handle to the client state.
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<AppState>>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store restored from a persisted blob.
    #[must_use]
    pub fn hydrated(persisted: PersistedState) -> Self {
        let store = Self::new();
        store.hydrate(persisted);
        store
    }

    /// Copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> AppState {
        self.inner.read().clone()
    }

    /// Current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner.read().session().clone()
    }

    /// Signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.read().session().user().cloned()
    }

    /// Bearer credential, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.read().session().token().map(str::to_string)
    }

    /// True when a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().session().is_authenticated()
    }

    /// Notifications, newest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.read().notifications().cloned().collect()
    }

    /// Unread notification count.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.inner.read().unread_count()
    }

    /// Online user ids.
    #[must_use]
    pub fn online_users(&self) -> HashSet<UserId> {
        self.inner.read().online_users().clone()
    }

    /// True if `id` is in the presence set.
    #[must_use]
    pub fn is_online(&self, id: &UserId) -> bool {
        self.inner.read().online_users().contains(id)
    }

    /// UI theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.inner.read().theme()
    }

    /// Sidebar flag.
    #[must_use]
    pub fn sidebar_open(&self) -> bool {
        self.inner.read().sidebar_open()
    }

    /// Live updates flag.
    #[must_use]
    pub fn live_updates(&self) -> bool {
        self.inner.read().live_updates()
    }

    /// True while any HTTP call is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.read().is_loading()
    }

    /// Number of HTTP calls in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.read().in_flight()
    }

    /// Signs in.
    pub fn login(&self, user: User, token: impl Into<String>) {
        debug!(user_id = %user.id, role = %user.role, "Session started");
        self.inner.write().login(user, token.into());
    }

    /// Replaces the credential, keeping the user.
    pub fn set_token(&self, token: impl Into<String>) {
        self.inner.write().set_token(token.into());
    }

    /// Clears session, credential, notifications, and unread count in one step.
    pub fn logout(&self) {
        self.inner.write().logout();
        debug!("Session cleared");
    }

    /// Adds a notification and returns its id.
    pub fn push_notification(&self, notification: NewNotification) -> NotificationId {
        self.inner.write().push_notification(notification)
    }

    /// Adds a notification that already has an id, e.g. one fetched from the backend.
    pub fn insert_notification(&self, notification: Notification) -> NotificationId {
        self.inner.write().insert_notification(notification)
    }

    /// Acknowledges one notification. Returns false if it was unknown or already read.
    pub fn mark_read(&self, id: &NotificationId) -> bool {
        self.inner.write().mark_read(id)
    }

    /// Acknowledges every notification.
    pub fn mark_all_read(&self) {
        self.inner.write().mark_all_read();
    }

    /// Removes one notification. Returns false if it was unknown.
    pub fn remove_notification(&self, id: &NotificationId) -> bool {
        self.inner.write().remove_notification(id)
    }

    /// Empties the feed.
    pub fn clear_notifications(&self) {
        self.inner.write().clear_notifications();
    }

    /// Replaces the presence set.
    pub fn replace_presence(&self, users: impl IntoIterator<Item = UserId>) {
        let users: Vec<UserId> = users.into_iter().collect();
        self.inner.write().replace_presence(users);
    }

    /// Adds or removes one user from the presence set.
    pub fn set_user_online(&self, id: UserId, online: bool) {
        self.inner.write().set_user_online(id, online);
    }

    /// Sets the theme.
    pub fn set_theme(&self, theme: Theme) {
        self.inner.write().set_theme(theme);
    }

    /// Flips the sidebar flag and returns the new value.
    pub fn toggle_sidebar(&self) -> bool {
        let mut state = self.inner.write();
        let open = !state.sidebar_open();
        state.set_sidebar_open(open);
        open
    }

    /// Sets the sidebar flag.
    pub fn set_sidebar_open(&self, open: bool) {
        self.inner.write().set_sidebar_open(open);
    }

    /// Sets the live updates flag.
    pub fn set_live_updates(&self, enabled: bool) {
        self.inner.write().set_live_updates(enabled);
    }

    /// Counts an HTTP call in.
    pub fn begin_request(&self) {
        self.inner.write().begin_request();
    }

    /// Counts an HTTP call out.
    pub fn end_request(&self) {
        self.inner.write().end_request();
    }

    /// Restores the persisted subset. Notifications and presence stay as they are.
    pub fn hydrate(&self, persisted: PersistedState) {
        let session = match persisted.user {
            Some(user) => Session::authenticated(user, persisted.token),
            None => Session::new(),
        };

        let mut state = self.inner.write();
        state.restore_session(session);
        state.set_theme(persisted.theme);
        state.set_sidebar_open(persisted.sidebar_open);
        state.set_live_updates(persisted.live_updates);
    }

    /// Writes the persisted subset through `persistence`.
    pub fn save_to(&self, persistence: &StatePersistence) -> Result<(), StorageError> {
        persistence.save(&self.persisted())
    }

    /// Extracts the persisted subset.
    #[must_use]
    pub fn persisted(&self) -> PersistedState {
        let state = self.inner.read();
        PersistedState {
            user: state.session().user().cloned(),
            token: state.session().token().map(str::to_string),
            theme: state.theme(),
            sidebar_open: state.sidebar_open(),
            live_updates: state.live_updates(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweave_core::types::{NotificationSeverity, Role};

    fn teacher() -> User {
        User::new(UserId::new_unchecked("t-1"), "Ms. Rivera", Role::Teacher)
    }

    #[test]
    fn test_clones_share_state() {
        let store = Store::new();
        let other = store.clone();
        store.login(teacher(), "tok");
        assert!(other.is_authenticated());
        assert_eq!(other.token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_logout_is_one_transition() {
        let store = Store::new();
        store.login(teacher(), "tok");
        store.push_notification(NewNotification::new(
            NotificationSeverity::Warning,
            "Heads up",
            "x",
        ));
        store.replace_presence([UserId::new_unchecked("s-1")]);

        store.logout();
        let snapshot = store.snapshot();
        assert!(!snapshot.session().is_authenticated());
        assert!(snapshot.session().token().is_none());
        assert_eq!(snapshot.notification_count(), 0);
        assert_eq!(snapshot.unread_count(), 0);
    }

    #[test]
    fn test_persisted_roundtrip_excludes_feed_and_presence() {
        let store = Store::new();
        store.login(teacher(), "tok");
        store.set_theme(Theme::Dark);
        assert!(!store.toggle_sidebar());
        store.set_live_updates(false);
        store.push_notification(NewNotification::new(NotificationSeverity::Info, "a", "b"));
        store.set_user_online(UserId::new_unchecked("s-1"), true);

        let restored = Store::hydrated(store.persisted());
        assert_eq!(restored.user(), Some(teacher()));
        assert_eq!(restored.token().as_deref(), Some("tok"));
        assert_eq!(restored.theme(), Theme::Dark);
        assert!(!restored.sidebar_open());
        assert!(!restored.live_updates());
        assert!(restored.notifications().is_empty());
        assert!(restored.online_users().is_empty());
    }

    #[test]
    fn test_hydrate_token_without_user_is_signed_out() {
        let store = Store::hydrated(PersistedState {
            token: Some("orphan".into()),
            ..PersistedState::default()
        });
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
    }
}
