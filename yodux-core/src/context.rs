//! One dispatcher plus one store manager, wired together

use crate::config::ActionLogConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::event::ListenerSpec;
use crate::manager::StoreManager;
use crate::store::{Store, StoreOptions};
use crate::submit::{submit_action, submit_action_with, ActionSpec};
use serde_json::Value;
use std::rc::Rc;

/// Application-wide coordination point
///
/// Owns the dispatcher every store registers with and the registry stores
/// are looked up in. Build one at start-up and pass it (or its parts) to
/// whoever needs them; tests build as many isolated instances as they like.
///
/// # Example
/// ```
/// use serde_json::json;
/// use yodux_core::{HandlerResult, StoreOptions, Yodux};
///
/// let mut app = Yodux::new();
/// app.create_store(
///     "counter",
///     StoreOptions::new()
///         .initial("count", 0)
///         .handler("increment", |ctx| {
///             let n = ctx.state["count"].as_i64().unwrap_or(0);
///             HandlerResult::updated("count", n + 1)
///         })
///         .accessor("count", |state| state["count"].clone()),
/// )
/// .unwrap();
///
/// app.submit(vec!["increment", "increment"]).unwrap();
/// assert_eq!(app.stores()["counter"].get("count").unwrap(), json!(2));
/// ```
#[derive(Debug, Default)]
pub struct Yodux {
    dispatcher: Dispatcher,
    stores: StoreManager,
}

impl Yodux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `log` to filter which actions get logged
    pub fn with_log_config(log: ActionLogConfig) -> Self {
        Self {
            dispatcher: Dispatcher::with_log_config(log),
            stores: StoreManager::new(),
        }
    }

    /// Build a store and register it under `name`
    ///
    /// The label defaults to `name`. If the manager skips the registration
    /// (see [`StoreManager::add`]) the store still receives actions but is
    /// not reachable by name.
    pub fn create_store(&mut self, name: &str, options: StoreOptions) -> Result<Rc<Store>> {
        let store = Store::new(&self.dispatcher, options.label_or(name))?;
        self.stores.add((name, &store));
        Ok(store)
    }

    /// See [`submit_action`]
    pub fn submit(&self, spec: impl Into<ActionSpec>) -> Result<()> {
        submit_action(&self.dispatcher, spec)
    }

    /// See [`submit_action_with`]
    pub fn submit_with(&self, name_or_batch: impl Into<ActionSpec>, data: Value) -> Result<()> {
        submit_action_with(&self.dispatcher, name_or_batch, data)
    }

    pub fn add_listener(&self, store: &str, spec: impl Into<ListenerSpec>) -> Result<()> {
        self.stores.add_listener(store, spec)
    }

    pub fn remove_listener(&self, store: &str, spec: impl Into<ListenerSpec>) -> Result<()> {
        self.stores.remove_listener(store, spec)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn stores(&self) -> &StoreManager {
        &self.stores
    }

    pub fn stores_mut(&mut self) -> &mut StoreManager {
        &mut self.stores
    }
}
