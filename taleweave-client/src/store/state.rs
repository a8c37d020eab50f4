//! Client state and its transitions.

use std::collections::{HashSet, VecDeque};

use taleweave_core::types::{
    NewNotification, Notification, NotificationId, Session, Theme, User, UserId,
};

/// Maximum notifications retained; the oldest is evicted first.
pub const MAX_NOTIFICATIONS: usize = 50;

/// Everything the client keeps in memory.
///
/// Mutators are total: unknown ids and repeated acknowledgments are no-ops.
/// `unread_count` is maintained incrementally and always equals the number
/// of retained notifications with `read == false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    session: Session,
    // Newest first.
    notifications: VecDeque<Notification>,
    unread_count: usize,
    online_users: HashSet<UserId>,
    theme: Theme,
    sidebar_open: bool,
    live_updates: bool,
    in_flight: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: Session::new(),
            notifications: VecDeque::with_capacity(MAX_NOTIFICATIONS),
            unread_count: 0,
            online_users: HashSet::new(),
            theme: Theme::default(),
            sidebar_open: true,
            live_updates: true,
            in_flight: 0,
        }
    }
}

impl AppState {
    /// Current session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Notifications, newest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Number of retained notifications.
    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    /// Unread notification count.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    /// Online user ids.
    #[must_use]
    pub fn online_users(&self) -> &HashSet<UserId> {
        &self.online_users
    }

    /// UI theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether the sidebar is open.
    #[must_use]
    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Whether live updates are enabled.
    #[must_use]
    pub fn live_updates(&self) -> bool {
        self.live_updates
    }

    /// Number of HTTP calls in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// True while any HTTP call is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub(crate) fn login(&mut self, user: User, token: String) {
        self.session.login(user, token);
    }

    pub(crate) fn restore_session(&mut self, session: Session) {
        self.session = session;
    }

    pub(crate) fn set_token(&mut self, token: String) {
        self.session.set_token(token);
    }

    /// Clears the session, credential, and notification feed together.
    pub(crate) fn logout(&mut self) {
        self.session.clear();
        self.notifications.clear();
        self.unread_count = 0;
    }

    pub(crate) fn push_notification(&mut self, new: NewNotification) -> NotificationId {
        self.insert_notification(new.into_notification())
    }

    pub(crate) fn insert_notification(&mut self, notification: Notification) -> NotificationId {
        let id = notification.id.clone();

        if let Some(existing) = self.notifications.iter().position(|n| n.id == id) {
            self.remove_at(existing);
        }
        if !notification.read {
            self.unread_count += 1;
        }
        self.notifications.push_front(notification);

        while self.notifications.len() > MAX_NOTIFICATIONS {
            let last = self.notifications.len() - 1;
            self.remove_at(last);
        }
        id
    }

    pub(crate) fn mark_read(&mut self, id: &NotificationId) -> bool {
        match self.notifications.iter_mut().find(|n| &n.id == id) {
            Some(notification) if !notification.read => {
                notification.read = true;
                self.unread_count = self.unread_count.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn mark_all_read(&mut self) {
        for notification in &mut self.notifications {
            notification.read = true;
        }
        self.unread_count = 0;
    }

    pub(crate) fn remove_notification(&mut self, id: &NotificationId) -> bool {
        match self.notifications.iter().position(|n| &n.id == id) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear_notifications(&mut self) {
        self.notifications.clear();
        self.unread_count = 0;
    }

    fn remove_at(&mut self, index: usize) {
        if let Some(removed) = self.notifications.remove(index)
            && !removed.read
        {
            self.unread_count = self.unread_count.saturating_sub(1);
        }
    }

    pub(crate) fn replace_presence(&mut self, users: impl IntoIterator<Item = UserId>) {
        self.online_users = users.into_iter().collect();
    }

    pub(crate) fn set_user_online(&mut self, id: UserId, online: bool) {
        if online {
            self.online_users.insert(id);
        } else {
            self.online_users.remove(&id);
        }
    }

    pub(crate) fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub(crate) fn set_sidebar_open(&mut self, open: bool) {
        self.sidebar_open = open;
    }

    pub(crate) fn set_live_updates(&mut self, enabled: bool) {
        self.live_updates = enabled;
    }

    pub(crate) fn begin_request(&mut self) {
        self.in_flight += 1;
    }

    pub(crate) fn end_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}
