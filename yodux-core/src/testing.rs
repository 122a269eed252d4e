//! Test utilities for yodux applications
//!
//! - [`EventRecorder`]: subscribes to store events and records them in order
//! - [`ActionRecorder`]: registers with a dispatcher and records every action
//! - Assertion macros for verifying recorded events
//!
//! # Example
//!
//! ```
//! use yodux_core::testing::EventRecorder;
//! use yodux_core::{assert_event_emitted, submit_action, Dispatcher, HandlerResult, Store, StoreOptions};
//!
//! let dispatcher = Dispatcher::new();
//! let store = Store::new(
//!     &dispatcher,
//!     StoreOptions::new()
//!         .label("docs")
//!         .events(["saved"])
//!         .handler("save", |_| HandlerResult::event("saved")),
//! )
//! .unwrap();
//!
//! let mut recorder = EventRecorder::new();
//! recorder.record_all(&store).unwrap();
//!
//! submit_action(&dispatcher, "save").unwrap();
//!
//! let events = recorder.drain();
//! assert_event_emitted!(events, "saved");
//! ```

use tokio::sync::mpsc;

use crate::action::Action;
use crate::dispatcher::{DispatchToken, Dispatcher};
use crate::error::Result;
use crate::event::Listener;
use crate::store::Store;

/// One observed emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// Label of the emitting store
    pub store: String,
    /// Event name
    pub event: String,
}

/// Records store events through ordinary listeners.
pub struct EventRecorder {
    tx: mpsc::UnboundedSender<RecordedEvent>,
    rx: mpsc::UnboundedReceiver<RecordedEvent>,
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRecorder {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// A listener that records `event` as coming from `store_label`.
    pub fn listener(&self, store_label: &str, event: &str) -> Listener {
        let tx = self.tx.clone();
        let recorded = RecordedEvent {
            store: store_label.to_string(),
            event: event.to_string(),
        };
        Listener::new(move || {
            let _ = tx.send(recorded.clone());
        })
    }

    /// Subscribe to the given events of `store`.
    pub fn record(&self, store: &Store, events: &[&str]) -> Result<()> {
        for event in events {
            store.add_listener((*event, self.listener(store.label(), event)))?;
        }
        Ok(())
    }

    /// Subscribe to every event `store` declares.
    pub fn record_all(&self, store: &Store) -> Result<()> {
        for event in store.event_names() {
            store.add_listener((event.as_str(), self.listener(store.label(), &event)))?;
        }
        Ok(())
    }

    /// Drain all recorded events.
    pub fn drain(&mut self) -> Vec<RecordedEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Drain and return just the event names.
    pub fn drain_names(&mut self) -> Vec<String> {
        self.drain().into_iter().map(|e| e.event).collect()
    }

    /// Check if any events were recorded.
    pub fn has_recorded(&mut self) -> bool {
        !self.drain().is_empty()
    }
}

/// Records every action a dispatcher delivers.
pub struct ActionRecorder {
    token: DispatchToken,
    rx: mpsc::UnboundedReceiver<Action>,
}

impl ActionRecorder {
    /// Register with `dispatcher`; sees every action from now on.
    pub fn attach(dispatcher: &Dispatcher) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = dispatcher.register(move |action| {
            let _ = tx.send(action.clone());
            Ok(())
        });
        Self { token, rx }
    }

    pub fn token(&self) -> DispatchToken {
        self.token
    }

    /// Drain all recorded actions.
    pub fn drain(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Drain and return the action names as text.
    pub fn drain_names(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .map(|a| a.name().to_string())
            .collect()
    }
}

/// Assert that an event with the given name was recorded.
///
/// # Example
///
/// ```ignore
/// let events = recorder.drain();
/// assert_event_emitted!(events, "saved");
/// assert_event_emitted!(events, "todos", "changed");
/// ```
#[macro_export]
macro_rules! assert_event_emitted {
    ($events:expr, $event:expr) => {
        assert!(
            $events.iter().any(|e| e.event == $event),
            "Expected event `{}` to be emitted, but got: {:?}",
            $event,
            $events
        );
    };
    ($events:expr, $store:expr, $event:expr) => {
        assert!(
            $events.iter().any(|e| e.store == $store && e.event == $event),
            "Expected event `{}` from store `{}` to be emitted, but got: {:?}",
            $event,
            $store,
            $events
        );
    };
}

/// Assert that no event with the given name was recorded.
#[macro_export]
macro_rules! assert_event_not_emitted {
    ($events:expr, $event:expr) => {
        assert!(
            !$events.iter().any(|e| e.event == $event),
            "Expected event `{}` NOT to be emitted, but it was: {:?}",
            $event,
            $events
        );
    };
}

/// Count recorded events with the given name.
#[macro_export]
macro_rules! count_events {
    ($events:expr, $event:expr) => {
        $events.iter().filter(|e| e.event == $event).count()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerResult;
    use crate::store::StoreOptions;
    use crate::submit::submit_action;

    fn doc_store(dispatcher: &Dispatcher) -> std::rc::Rc<Store> {
        Store::new(
            dispatcher,
            StoreOptions::new()
                .label("docs")
                .events(["saved", "closed"])
                .handler("save", |_| HandlerResult::events(["saved", "closed"])),
        )
        .unwrap()
    }

    #[test]
    fn test_event_recorder_keeps_order() {
        let dispatcher = Dispatcher::new();
        let store = doc_store(&dispatcher);
        let mut recorder = EventRecorder::new();
        recorder.record_all(&store).unwrap();

        submit_action(&dispatcher, "save").unwrap();

        let events = recorder.drain();
        assert_eq!(
            events,
            vec![
                RecordedEvent {
                    store: "docs".into(),
                    event: "saved".into()
                },
                RecordedEvent {
                    store: "docs".into(),
                    event: "closed".into()
                },
            ]
        );
        assert!(!recorder.has_recorded());
    }

    #[test]
    fn test_record_rejects_undeclared() {
        let dispatcher = Dispatcher::new();
        let store = doc_store(&dispatcher);
        let recorder = EventRecorder::new();
        assert!(recorder.record(&store, &["saved", "nope"]).is_err());
    }

    #[test]
    fn test_action_recorder() {
        let dispatcher = Dispatcher::new();
        let mut recorder = ActionRecorder::attach(&dispatcher);

        submit_action(&dispatcher, vec!["a", "b"]).unwrap();
        assert_eq!(recorder.drain_names(), vec!["a", "b"]);
        assert!(recorder.drain().is_empty());
    }

    #[test]
    fn test_assert_macros() {
        let events = vec![
            RecordedEvent {
                store: "docs".into(),
                event: "saved".into(),
            },
            RecordedEvent {
                store: "docs".into(),
                event: "saved".into(),
            },
        ];

        assert_event_emitted!(events, "saved");
        assert_event_emitted!(events, "docs", "saved");
        assert_event_not_emitted!(events, "closed");
        assert_eq!(count_events!(events, "saved"), 2);
    }
}
