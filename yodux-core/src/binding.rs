//! View-state bindings: listeners that copy store accessors into view state
//!
//! A view keeps its own [`StateMap`]. A binding builds the [`Listener`] that
//! refreshes some of its keys from store accessors; subscribe that listener
//! to whichever store events should trigger the refresh.
//!
//! ```
//! use yodux_core::{
//!     submit_action, Dispatcher, HandlerResult, StateBinding, Store, StoreManager, StoreOptions,
//! };
//!
//! let dispatcher = Dispatcher::new();
//! let counter = Store::new(
//!     &dispatcher,
//!     StoreOptions::new()
//!         .initial("count", 0)
//!         .events(["changed"])
//!         .handler("increment", |ctx| {
//!             let n = ctx.state["count"].as_i64().unwrap_or(0);
//!             HandlerResult::updated("count", n + 1).with_event("changed")
//!         })
//!         .accessor("count", |state| state["count"].clone()),
//! )
//! .unwrap();
//!
//! let mut stores = StoreManager::new();
//! stores.add(("counter", &counter));
//!
//! let view = StateBinding::new();
//! let refresh = view.bind("total", &counter, "count").unwrap();
//! stores.add_listener("counter", ("changed", &refresh)).unwrap();
//!
//! submit_action(&dispatcher, "increment").unwrap();
//! assert_eq!(view.get("total"), Some(serde_json::json!(1)));
//! ```

use crate::error::{DispatchError, Result};
use crate::event::Listener;
use crate::store::{StateMap, Store};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type UpdateHook = Rc<dyn Fn(&StateMap)>;

/// Several view keys read from one store (`view key -> accessor name`)
#[derive(Debug, Clone)]
pub struct StoreFields {
    pub store: Rc<Store>,
    pub fields: Vec<(String, String)>,
}

impl StoreFields {
    pub fn new<I, K, A>(store: &Rc<Store>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, A)>,
        K: Into<String>,
        A: Into<String>,
    {
        Self {
            store: store.clone(),
            fields: fields
                .into_iter()
                .map(|(key, accessor)| (key.into(), accessor.into()))
                .collect(),
        }
    }
}

struct Source {
    store: Weak<Store>,
    label: String,
    fields: Vec<(String, String)>,
}

/// Holds a view's state and builds refresh listeners for it
#[derive(Clone, Default)]
pub struct StateBinding {
    view: Rc<RefCell<StateMap>>,
    on_update: Option<UpdateHook>,
}

impl fmt::Debug for StateBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateBinding")
            .field("view", &self.view.borrow())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

impl StateBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` with the whole view state after every refresh
    pub fn on_update<F: Fn(&StateMap) + 'static>(mut self, hook: F) -> Self {
        self.on_update = Some(Rc::new(hook));
        self
    }

    /// Current value of one view key
    pub fn get(&self, key: &str) -> Option<Value> {
        self.view.borrow().get(key).cloned()
    }

    /// Copy of the whole view state
    pub fn snapshot(&self) -> StateMap {
        self.view.borrow().clone()
    }

    /// Refresh `key` from one accessor
    pub fn bind(&self, key: &str, store: &Rc<Store>, accessor: &str) -> Result<Listener> {
        self.bind_many(store, [(key, accessor)])
    }

    /// Refresh several keys from one store
    pub fn bind_many<I, K, A>(&self, store: &Rc<Store>, fields: I) -> Result<Listener>
    where
        I: IntoIterator<Item = (K, A)>,
        K: Into<String>,
        A: Into<String>,
    {
        self.bind_stores([StoreFields::new(store, fields)])
    }

    /// Refresh keys from several stores in one update
    ///
    /// Accessor names are checked now, so a typo fails here rather than on
    /// the first event.
    pub fn bind_stores(&self, sources: impl IntoIterator<Item = StoreFields>) -> Result<Listener> {
        let mut resolved = Vec::new();
        for StoreFields { store, fields } in sources {
            if let Some((_, accessor)) = fields.iter().find(|(_, a)| !store.has_accessor(a)) {
                return Err(DispatchError::UnknownAccessor {
                    store: store.label().to_string(),
                    accessor: accessor.clone(),
                });
            }
            resolved.push(Source {
                store: Rc::downgrade(&store),
                label: store.label().to_string(),
                fields,
            });
        }

        let view = self.view.clone();
        let on_update = self.on_update.clone();
        Ok(Listener::new(move || {
            let mut update = StateMap::new();
            for source in &resolved {
                let Some(store) = source.store.upgrade() else {
                    tracing::warn!(store = %source.label, "Bound store was dropped; skipping");
                    continue;
                };
                for (key, accessor) in &source.fields {
                    match store.get(accessor) {
                        Ok(value) => {
                            update.insert(key.clone(), value);
                        }
                        Err(err) => tracing::warn!(error = %err, "Binding refresh failed"),
                    }
                }
            }
            apply(&view, on_update.as_ref(), update);
        }))
    }

    /// Refresh `key` from an arbitrary getter
    pub fn bind_fn<F>(&self, key: impl Into<String>, getter: F) -> Listener
    where
        F: Fn() -> Value + 'static,
    {
        let key = key.into();
        let view = self.view.clone();
        let on_update = self.on_update.clone();
        Listener::new(move || {
            let mut update = StateMap::new();
            update.insert(key.clone(), getter());
            apply(&view, on_update.as_ref(), update);
        })
    }
}

fn apply(view: &RefCell<StateMap>, on_update: Option<&UpdateHook>, update: StateMap) {
    let snapshot = {
        let mut view = view.borrow_mut();
        view.extend(update);
        view.clone()
    };
    if let Some(hook) = on_update {
        hook(&snapshot);
    }
}
