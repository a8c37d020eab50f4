//! Per-event handler registry.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use taleweave_gateway::ws::EventEnvelope;

/// Callback invoked with each inbound envelope of the registered name.
pub type EventHandler = Arc<dyn Fn(&EventEnvelope) + Send + Sync>;

/// Identifies one registration for [`off`](super::RealtimeManager::off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

#[derive(Default)]
pub(crate) struct HandlerRegistry {
    next_id: AtomicU64,
    handlers: DashMap<String, Vec<(HandlerId, EventHandler)>>,
}

impl HandlerRegistry {
    pub(crate) fn add(&self, event: &str, handler: EventHandler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    /// Removes one registration, or all of them for `event` when `id` is `None`.
    pub(crate) fn remove(&self, event: &str, id: Option<HandlerId>) -> usize {
        let Some(id) = id else {
            return self.handlers.remove(event).map_or(0, |(_, list)| list.len());
        };

        let mut removed = 0;
        if let Some(mut list) = self.handlers.get_mut(event) {
            let before = list.len();
            list.retain(|(existing, _)| *existing != id);
            removed = before - list.len();
        }
        self.handlers.remove_if(event, |_, list| list.is_empty());
        removed
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, |list| list.len())
    }

    /// Calls every handler for the envelope's name in registration order.
    ///
    /// The list is cloned out first so handlers may register or remove
    /// handlers without deadlocking on the shard.
    pub(crate) fn deliver(&self, envelope: &EventEnvelope) -> usize {
        let handlers: Vec<EventHandler> = match self.handlers.get(&envelope.event) {
            Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return 0,
        };
        for handler in &handlers {
            handler(envelope);
        }
        handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    fn recording(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> EventHandler {
        let log = Arc::clone(log);
        Arc::new(move |_| log.lock().push(tag))
    }

    #[test]
    fn test_registration_order() {
        let registry = HandlerRegistry::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.add("quiz-completed", recording(&log, "first"));
        registry.add("quiz-completed", recording(&log, "second"));
        registry.add("live-activity", recording(&log, "other"));

        let delivered = registry.deliver(&EventEnvelope::new("quiz-completed", json!({})));
        assert_eq!(delivered, 2);
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_remove_one_and_all() {
        let registry = HandlerRegistry::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = registry.add("x", recording(&log, "a"));
        registry.add("x", recording(&log, "b"));
        registry.add("x", recording(&log, "c"));

        assert_eq!(registry.remove("x", Some(a)), 1);
        assert_eq!(registry.remove("x", Some(a)), 0);
        assert_eq!(registry.count("x"), 2);
        assert_eq!(registry.remove("x", None), 2);
        assert_eq!(registry.count("x"), 0);
        assert_eq!(registry.deliver(&EventEnvelope::new("x", json!(null))), 0);
    }

    #[test]
    fn test_handler_may_unregister_itself() {
        let registry = Arc::new(HandlerRegistry::default());
        let inner = Arc::clone(&registry);
        registry.add(
            "once",
            Arc::new(move |_| {
                inner.remove("once", None);
            }),
        );

        assert_eq!(registry.deliver(&EventEnvelope::new("once", json!(null))), 1);
        assert_eq!(registry.count("once"), 0);
    }
}
