//! Session collaborator seam for the REST client.

use parking_lot::RwLock;
use taleweave_core::error::ApiError;

/// Callbacks the [`ApiClient`](super::ApiClient) uses to read and update the
/// session it authenticates with.
///
/// Implementations must be cheap and must not block: they run inline on the
/// request path.
pub trait SessionHooks: Send + Sync {
    /// Current bearer credential, if signed in.
    fn credential(&self) -> Option<String>;

    /// A refresh produced a new credential.
    fn credential_refreshed(&self, _token: &str) {}

    /// Refresh failed; the session is over.
    fn session_expired(&self) {}

    /// A request failed with a classified error.
    fn request_failed(&self, _method: &str, _path: &str, _error: &ApiError) {}

    /// A request is about to be sent.
    fn request_started(&self) {}

    /// A request finished, successfully or not.
    fn request_finished(&self) {}
}

/// In-memory credential holder.
#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    /// Creates a holder with an optional initial credential.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }
}

impl SessionHooks for MemorySession {
    fn credential(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn credential_refreshed(&self, token: &str) {
        *self.token.write() = Some(token.to_string());
    }

    fn session_expired(&self) {
        *self.token.write() = None;
    }
}

/// Calls `request_finished` when dropped.
pub(crate) struct InFlightGuard<'a> {
    hooks: &'a dyn SessionHooks,
}

impl<'a> InFlightGuard<'a> {
    pub(crate) fn start(hooks: &'a dyn SessionHooks) -> Self {
        hooks.request_started();
        Self { hooks }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.hooks.request_finished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[derive(Default)]
    struct Counting {
        in_flight: AtomicI32,
    }

    impl SessionHooks for Counting {
        fn credential(&self) -> Option<String> {
            None
        }

        fn request_started(&self) {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
        }

        fn request_finished(&self) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_guard_balances_counter() {
        let hooks = Counting::default();
        {
            let _a = InFlightGuard::start(&hooks);
            let _b = InFlightGuard::start(&hooks);
            assert_eq!(hooks.in_flight.load(Ordering::SeqCst), 2);
        }
        assert_eq!(hooks.in_flight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_memory_session() {
        let session = MemorySession::new(Some("t1".into()));
        assert_eq!(session.credential().as_deref(), Some("t1"));
        session.credential_refreshed("t2");
        assert_eq!(session.credential().as_deref(), Some("t2"));
        session.session_expired();
        assert!(session.credential().is_none());
    }
}
