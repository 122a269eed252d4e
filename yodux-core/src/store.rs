//! Stores: private state, a handler table and a declared event vocabulary

use crate::action::{Action, ActionName};
use crate::bus::EventBus;
use crate::config::{kind_of, StoreConfig};
use crate::dispatcher::{DispatchToken, Dispatcher};
use crate::error::{DispatchError, Result};
use crate::event::{EventRegistry, EventToken, Listener, ListenerSpec};
use crate::handler::{Handler, HandlerContext, HandlerResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// A store's state: string keys, arbitrary values, fixed key set
pub type StateMap = Map<String, Value>;

/// Named read-only projection of a store's state
pub type Accessor = Box<dyn Fn(&StateMap) -> Value>;

/// Everything a store is built from
///
/// # Example
/// ```
/// use serde_json::json;
/// use yodux_core::{HandlerResult, StoreOptions};
///
/// let options = StoreOptions::new()
///     .label("counter")
///     .initial("count", 0)
///     .events(["changed"])
///     .handler("increment", |ctx| {
///         let count = ctx.state["count"].as_i64().unwrap_or(0);
///         HandlerResult::updated("count", count + 1).with_event("changed")
///     })
///     .accessor("count", |state| state["count"].clone());
/// ```
#[derive(Default)]
pub struct StoreOptions {
    label: Option<String>,
    state: StateMap,
    handlers: HashMap<ActionName, Handler>,
    events: Vec<String>,
    accessors: HashMap<String, Accessor>,
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("label", &self.label)
            .field("state", &self.state)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("events", &self.events)
            .field("accessors", &self.accessors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a static configuration
    pub fn from_config(config: StoreConfig) -> Self {
        Self {
            label: config.label,
            state: config.state,
            events: config.events,
            ..Self::default()
        }
    }

    /// Start from a JSON value; see [`StoreConfig::from_value`]
    pub fn from_value(value: Value) -> Result<Self> {
        StoreConfig::from_value(value).map(Self::from_config)
    }

    /// Name used in logs and error messages
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Replace the initial state
    pub fn state(mut self, state: StateMap) -> Self {
        self.state = state;
        self
    }

    /// Replace the initial state from a JSON object
    pub fn state_value(self, state: Value) -> Result<Self> {
        match state {
            Value::Object(state) => Ok(self.state(state)),
            other => Err(DispatchError::InvalidOptions(format!(
                "state must be an object, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Declare one initial state key
    pub fn initial(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.insert(key.into(), value.into());
        self
    }

    /// Declare events, appended to any declared before
    pub fn events<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events.extend(names.into_iter().map(Into::into));
        self
    }

    /// Handle the action `name`. A later handler for the same name replaces
    /// the earlier one.
    pub fn handler<N, F>(mut self, name: N, handler: F) -> Self
    where
        N: Into<ActionName>,
        F: Fn(HandlerContext<'_>) -> HandlerResult + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
        self
    }

    /// Expose a read-only view of the state under `name`
    pub fn accessor<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&StateMap) -> Value + 'static,
    {
        self.accessors.insert(name.into(), Box::new(accessor));
        self
    }

    /// Set the label unless one was given
    pub(crate) fn label_or(mut self, label: &str) -> Self {
        if self.label.is_none() {
            self.label = Some(label.to_string());
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.events.iter().any(String::is_empty) {
            return Err(DispatchError::InvalidOptions(
                "event names must not be empty".to_string(),
            ));
        }
        if self.label.as_deref() == Some("") {
            return Err(DispatchError::InvalidOptions(
                "store label must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Encapsulated state container reacting to dispatched actions
///
/// A store registers itself with the dispatcher when built. For every action
/// it looks up a handler by the action's name, merges the handler's partial
/// state into its own (keys it started with only), and emits the handler's
/// events. State is readable only through declared accessors.
///
/// # Example
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use serde_json::json;
/// use yodux_core::{submit_action, Dispatcher, HandlerResult, Listener, Store, StoreOptions};
///
/// let dispatcher = Dispatcher::new();
/// let store = Store::new(
///     &dispatcher,
///     StoreOptions::new()
///         .initial("saved", false)
///         .events(["saved"])
///         .handler("save", |_| HandlerResult::updated("saved", true).with_event("saved"))
///         .accessor("is_saved", |state| state["saved"].clone()),
/// )
/// .unwrap();
///
/// let calls = Rc::new(Cell::new(0));
/// let counter = calls.clone();
/// store
///     .add_listener(("saved", Listener::new(move || counter.set(counter.get() + 1))))
///     .unwrap();
///
/// submit_action(&dispatcher, "save").unwrap();
/// assert_eq!(calls.get(), 1);
/// assert_eq!(store.get("is_saved").unwrap(), json!(true));
/// ```
pub struct Store {
    label: String,
    state: RefCell<StateMap>,
    handlers: HashMap<ActionName, Handler>,
    events: EventRegistry,
    accessors: HashMap<String, Accessor>,
    bus: RefCell<EventBus>,
    token: DispatchToken,
    dispatcher: Dispatcher,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("label", &self.label)
            .field("token", &self.token)
            .field("keys", &self.keys())
            .field("events", &self.events.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Build a store and register it with `dispatcher`
    pub fn new(dispatcher: &Dispatcher, options: StoreOptions) -> Result<Rc<Store>> {
        options.validate()?;

        let StoreOptions {
            label,
            state,
            handlers,
            events,
            accessors,
        } = options;

        let store = Rc::new_cyclic(|weak: &Weak<Store>| {
            let weak = weak.clone();
            let token = dispatcher.register(move |action| match weak.upgrade() {
                Some(store) => store.handle(action),
                None => Ok(()),
            });

            Store {
                label: label.unwrap_or_else(|| format!("store-{token}")),
                state: RefCell::new(state),
                handlers,
                events: EventRegistry::declare(events),
                accessors,
                bus: RefCell::new(EventBus::new()),
                token,
                dispatcher: dispatcher.clone(),
            }
        });

        tracing::debug!(
            store = %store.label,
            token = %store.token,
            handlers = store.handlers.len(),
            events = store.events.len(),
            "Store registered with dispatcher"
        );
        Ok(store)
    }

    /// Label used in logs and errors
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn dispatch_token(&self) -> DispatchToken {
        self.token
    }

    /// Whether this store has a handler for `name`
    pub fn handles(&self, name: impl Into<ActionName>) -> bool {
        self.handlers.contains_key(&name.into())
    }

    /// Declared event names, in declaration order
    pub fn event_names(&self) -> Vec<String> {
        self.events.names().map(str::to_string).collect()
    }

    /// State keys. Fixed at construction.
    pub fn keys(&self) -> Vec<String> {
        self.state.borrow().keys().cloned().collect()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.state.borrow().contains_key(key)
    }

    /// Run the accessor `name` against the current state
    pub fn get(&self, name: &str) -> Result<Value> {
        let accessor = self
            .accessors
            .get(name)
            .ok_or_else(|| DispatchError::UnknownAccessor {
                store: self.label.clone(),
                accessor: name.to_string(),
            })?;
        Ok(accessor(&*self.state.borrow()))
    }

    /// Run the accessor `name` and deserialize its value
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        serde_json::from_value(self.get(name)?).map_err(|e| DispatchError::AccessorType {
            store: self.label.clone(),
            accessor: name.to_string(),
            message: e.to_string(),
        })
    }

    pub fn has_accessor(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    /// Raise a declared event, running its listeners in subscription order
    ///
    /// Emitting an event with no listeners does nothing.
    pub fn emit(&self, name: &str) -> Result<()> {
        let token = self.token_for(name)?;
        // Listeners may subscribe or unsubscribe while running
        let listeners = self.bus.borrow().get_subscribers(token);
        tracing::trace!(store = %self.label, event = name, listeners = listeners.len(), "Emitting event");
        for listener in &listeners {
            listener.call();
        }
        Ok(())
    }

    /// Subscribe to one or more declared events
    ///
    /// Stops at the first undeclared name; pairs before it stay subscribed.
    pub fn add_listener(&self, spec: impl Into<ListenerSpec>) -> Result<()> {
        spec.into().try_for_each(&mut |event: &str, callback: &Listener| -> Result<()> {
            let token = self.token_for(event)?;
            self.bus.borrow_mut().subscribe(token, callback.clone());
            Ok(())
        })
    }

    /// Unsubscribe; mirrors [`Store::add_listener`]
    ///
    /// Removing a listener that isn't subscribed is a no-op.
    pub fn remove_listener(&self, spec: impl Into<ListenerSpec>) -> Result<()> {
        spec.into().try_for_each(&mut |event: &str, callback: &Listener| -> Result<()> {
            let token = self.token_for(event)?;
            self.bus.borrow_mut().unsubscribe(token, callback);
            Ok(())
        })
    }

    /// Number of listeners subscribed to a declared event
    pub fn listener_count(&self, event: &str) -> Result<usize> {
        let token = self.token_for(event)?;
        Ok(self.bus.borrow().subscriber_count(token))
    }

    fn token_for(&self, event: &str) -> Result<EventToken> {
        self.events
            .token(event)
            .ok_or_else(|| DispatchError::UnregisteredEvent {
                store: self.label.clone(),
                event: event.to_string(),
            })
    }

    /// Dispatcher callback
    fn handle(&self, action: &Action) -> Result<()> {
        let Some(handler) = self.handlers.get(action.name()) else {
            return Ok(());
        };

        let snapshot = self.state.borrow().clone();
        let HandlerResult { new_state, events } = handler(HandlerContext {
            state: &snapshot,
            action,
        });

        if let Some(new_state) = new_state {
            self.merge(new_state);
        }

        tracing::trace!(
            store = %self.label,
            action = %action.name(),
            events = events.len(),
            "Handled action"
        );

        for event in &events {
            self.emit(event)?;
        }
        Ok(())
    }

    /// Overwrite existing keys; drop the rest
    fn merge(&self, new_state: StateMap) {
        let mut state = self.state.borrow_mut();
        for (key, value) in new_state {
            match state.get_mut(&key) {
                Some(slot) => *slot = value,
                None => {
                    tracing::trace!(store = %self.label, key = %key, "Dropped undeclared state key")
                }
            }
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if self.dispatcher.unregister(self.token) {
            tracing::trace!(store = %self.label, token = %self.token, "Store dropped; unregistered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Subscription;
    use serde_json::json;
    use std::cell::Cell;

    fn counter_options() -> StoreOptions {
        StoreOptions::new()
            .label("counter")
            .initial("count", 0)
            .events(["changed", "reset"])
            .handler("increment", |ctx| {
                let count = ctx.state["count"].as_i64().unwrap_or(0);
                let by = ctx.action.get("by").and_then(Value::as_i64).unwrap_or(1);
                HandlerResult::updated("count", count + by).with_event("changed")
            })
            .handler("sneak", |_| {
                HandlerResult::updated("count", 10).with_state("extra", true)
            })
            .handler("bogus", |_| HandlerResult::event("undeclared"))
            .accessor("count", |state| state["count"].clone())
    }

    fn counting_listener() -> (Listener, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        (
            Listener::new(move || counter.set(counter.get() + 1)),
            calls,
        )
    }

    #[test]
    fn test_handler_updates_state_and_emits() {
        let dispatcher = Dispatcher::new();
        let store = Store::new(&dispatcher, counter_options()).unwrap();
        let (listener, calls) = counting_listener();
        store.add_listener(("changed", &listener)).unwrap();

        dispatcher
            .dispatch(Action::named("increment").with("by", 5))
            .unwrap();

        assert_eq!(store.get("count").unwrap(), json!(5));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_key_set_is_fixed() {
        let dispatcher = Dispatcher::new();
        let store = Store::new(&dispatcher, counter_options()).unwrap();

        dispatcher.dispatch(Action::named("sneak")).unwrap();

        assert_eq!(store.keys(), vec!["count".to_string()]);
        assert!(!store.has_key("extra"));
        assert_eq!(store.get_as::<i64>("count").unwrap(), 10);
    }

    #[test]
    fn test_unknown_action_is_ignored() {
        let dispatcher = Dispatcher::new();
        let store = Store::new(&dispatcher, counter_options()).unwrap();
        let (listener, calls) = counting_listener();
        store
            .add_listener(vec![("changed", &listener), ("reset", &listener)])
            .unwrap();

        let before = store.get("count").unwrap();
        dispatcher.dispatch(Action::named("nothing")).unwrap();

        assert_eq!(store.get("count").unwrap(), before);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_emit_undeclared_event_fails() {
        let dispatcher = Dispatcher::new();
        let store = Store::new(&dispatcher, counter_options()).unwrap();

        assert_eq!(
            store.emit("nope"),
            Err(DispatchError::UnregisteredEvent {
                store: "counter".into(),
                event: "nope".into(),
            })
        );
        // Declared but nobody listening
        assert!(store.emit("reset").is_ok());
    }

    #[test]
    fn test_handler_returning_undeclared_event_fails_dispatch() {
        let dispatcher = Dispatcher::new();
        let _store = Store::new(&dispatcher, counter_options()).unwrap();

        let err = dispatcher.dispatch(Action::named("bogus")).unwrap_err();
        assert!(matches!(err, DispatchError::UnregisteredEvent { .. }));
        assert!(!dispatcher.is_dispatching());
    }

    #[test]
    fn test_subscribe_to_undeclared_event_fails() {
        let dispatcher = Dispatcher::new();
        let store = Store::new(&dispatcher, counter_options()).unwrap();
        let (listener, _) = counting_listener();

        assert!(store.add_listener(("missing", &listener)).is_err());
        assert!(store.remove_listener(("missing", &listener)).is_err());
    }

    #[test]
    fn test_remove_listener_mirrors_add() {
        let dispatcher = Dispatcher::new();
        let store = Store::new(&dispatcher, counter_options()).unwrap();
        let (listener, calls) = counting_listener();

        let spec = vec![
            ListenerSpec::from(("changed", &listener)),
            ListenerSpec::from(Subscription::new("reset", listener.clone())),
        ];
        store.add_listener(spec.clone()).unwrap();
        assert_eq!(store.listener_count("changed").unwrap(), 1);
        assert_eq!(store.listener_count("reset").unwrap(), 1);

        store.remove_listener(spec).unwrap();
        assert_eq!(store.listener_count("changed").unwrap(), 0);
        assert_eq!(store.listener_count("reset").unwrap(), 0);

        store.emit("changed").unwrap();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_listener_can_read_store_during_emit() {
        let dispatcher = Dispatcher::new();
        let store = Store::new(&dispatcher, counter_options()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let reader = Rc::downgrade(&store);
        let sink = seen.clone();
        store
            .add_listener((
                "changed",
                Listener::new(move || {
                    if let Some(store) = reader.upgrade() {
                        sink.borrow_mut().push(store.get("count").unwrap());
                    }
                }),
            ))
            .unwrap();

        dispatcher.dispatch(Action::named("increment")).unwrap();
        dispatcher.dispatch(Action::named("increment")).unwrap();

        assert_eq!(*seen.borrow(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_handler_gets_snapshot_and_action() {
        let dispatcher = Dispatcher::new();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let _store = Store::new(
            &dispatcher,
            StoreOptions::new()
                .initial("a", 1)
                .handler("look", move |ctx| {
                    *sink.borrow_mut() = Some((ctx.state.clone(), ctx.action.clone()));
                    HandlerResult::unchanged()
                }),
        )
        .unwrap();

        let action = Action::named("look").with("x", 1);
        dispatcher.dispatch(action.clone()).unwrap();

        let (state, received) = seen.borrow_mut().take().unwrap();
        assert_eq!(Value::Object(state), json!({"a": 1}));
        assert_eq!(received, action);
    }

    #[test]
    fn test_unknown_accessor() {
        let dispatcher = Dispatcher::new();
        let store = Store::new(&dispatcher, counter_options()).unwrap();
        assert!(matches!(
            store.get("missing"),
            Err(DispatchError::UnknownAccessor { .. })
        ));
        assert!(matches!(
            store.get_as::<String>("count"),
            Err(DispatchError::AccessorType { .. })
        ));
    }

    #[test]
    fn test_options_from_value() {
        let dispatcher = Dispatcher::new();
        let options = StoreOptions::from_value(json!({
            "state": {"items": []},
            "events": ["changed"]
        }))
        .unwrap()
        .accessor("size", |state| json!(state["items"].as_array().map_or(0, Vec::len)));

        let store = Store::new(&dispatcher, options).unwrap();
        assert_eq!(store.event_names(), vec!["changed".to_string()]);
        assert_eq!(store.get("size").unwrap(), json!(0));
        assert!(store.label().starts_with("store-"));
    }

    #[test]
    fn test_invalid_options() {
        assert!(matches!(
            StoreOptions::from_value(json!(["state"])),
            Err(DispatchError::InvalidOptions(_))
        ));
        assert!(matches!(
            StoreOptions::new().state_value(json!(1)),
            Err(DispatchError::InvalidOptions(_))
        ));

        let dispatcher = Dispatcher::new();
        let err = Store::new(&dispatcher, StoreOptions::new().events([""])).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidOptions(_)));
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_new_registers_one_callback() {
        let dispatcher = Dispatcher::new();
        let store = Store::new(&dispatcher, counter_options()).unwrap();

        assert_eq!(dispatcher.len(), 1);
        assert_eq!(store.label(), "counter");
        assert_eq!(store.event_names(), vec!["changed", "reset"]);
        assert_eq!(store.get("count").unwrap(), json!(0));
        assert!(store.handles("increment"));
        assert!(!store.handles("decrement"));
    }

    #[test]
    fn test_dropped_store_unregisters() {
        let dispatcher = Dispatcher::new();
        let kept = Store::new(&dispatcher, counter_options()).unwrap();
        let dropped = Store::new(&dispatcher, counter_options()).unwrap();
        assert_eq!(dispatcher.len(), 2);

        drop(dropped);
        assert_eq!(dispatcher.len(), 1);

        dispatcher.dispatch(Action::named("increment")).unwrap();
        assert_eq!(kept.get("count").unwrap(), json!(1));
    }

    #[test]
    fn test_store_dropped_by_its_own_listener() {
        let dispatcher = Dispatcher::new();
        let slot = Rc::new(RefCell::new(Some(
            Store::new(&dispatcher, counter_options()).unwrap(),
        )));
        let holder = slot.clone();
        let store = slot.borrow().clone().unwrap();
        store
            .add_listener(("changed", Listener::new(move || drop(holder.borrow_mut().take()))))
            .unwrap();
        drop(store);

        dispatcher.dispatch(Action::named("increment")).unwrap();

        assert!(slot.borrow().is_none());
        assert!(dispatcher.is_empty());
    }
}
