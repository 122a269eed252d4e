//! Token-keyed event bus owned by a store

use crate::event::{EventToken, Listener};
use std::collections::HashMap;

/// Subscriptions keyed by event token
///
/// The bus knows nothing about event names; the owning store translates names
/// through its [`EventRegistry`](crate::EventRegistry) first.
#[derive(Debug, Default)]
pub struct EventBus {
    /// Subscriptions: event token -> listeners in subscription order
    subscriptions: HashMap<EventToken, Vec<Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener. The same listener may be subscribed more than once.
    pub fn subscribe(&mut self, token: EventToken, listener: Listener) {
        self.subscriptions.entry(token).or_default().push(listener);
    }

    /// Drop the most recent subscription of `listener` to `token`
    ///
    /// Returns `false` when the listener wasn't subscribed.
    pub fn unsubscribe(&mut self, token: EventToken, listener: &Listener) -> bool {
        let Some(listeners) = self.subscriptions.get_mut(&token) else {
            return false;
        };
        match listeners.iter().rposition(|l| l.same_as(listener)) {
            Some(index) => {
                listeners.remove(index);
                if listeners.is_empty() {
                    self.subscriptions.remove(&token);
                }
                true
            }
            None => false,
        }
    }

    /// Listeners for a token, in subscription order
    ///
    /// Returned by value so callers can run them while the bus is changed.
    pub fn get_subscribers(&self, token: EventToken) -> Vec<Listener> {
        self.subscriptions.get(&token).cloned().unwrap_or_default()
    }

    pub fn subscriber_count(&self, token: EventToken) -> usize {
        self.subscriptions.get(&token).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventRegistry;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribe_unsubscribe() {
        let registry = EventRegistry::declare(["saved"]);
        let token = registry.token("saved").unwrap();
        let mut bus = EventBus::new();

        let listener = Listener::new(|| {});
        bus.subscribe(token, listener.clone());
        assert_eq!(bus.subscriber_count(token), 1);

        assert!(bus.unsubscribe(token, &listener));
        assert_eq!(bus.subscriber_count(token), 0);
        assert!(!bus.unsubscribe(token, &listener));
    }

    #[test]
    fn test_subscribers_keep_order() {
        let registry = EventRegistry::declare(["saved"]);
        let token = registry.token("saved").unwrap();
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = log.clone();
            bus.subscribe(token, Listener::new(move || log.borrow_mut().push(tag)));
        }

        for listener in bus.get_subscribers(token) {
            listener.call();
        }
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_removes_latest_duplicate() {
        let registry = EventRegistry::declare(["a", "b"]);
        let a = registry.token("a").unwrap();
        let b = registry.token("b").unwrap();
        let mut bus = EventBus::new();

        let listener = Listener::new(|| {});
        let other = Listener::new(|| {});
        bus.subscribe(a, listener.clone());
        bus.subscribe(a, other.clone());
        bus.subscribe(a, listener.clone());
        bus.subscribe(b, listener.clone());

        assert!(bus.unsubscribe(a, &listener));
        let remaining = bus.get_subscribers(a);
        assert_eq!(remaining.len(), 2);
        assert!(remaining[0].same_as(&listener));
        assert!(remaining[1].same_as(&other));
        assert_eq!(bus.subscriber_count(b), 1);
    }
}
