//! Store manager: the named registry of stores

use crate::error::{DispatchError, Result};
use crate::event::ListenerSpec;
use crate::store::Store;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Index;
use std::rc::Rc;

/// Names of the `StoreManager` methods; stores with these names get no shortcut
pub const RESERVED_NAMES: &[&str] = &[
    "add",
    "get_store",
    "add_listener",
    "remove_listener",
    "shortcut",
    "names",
    "contains",
    "len",
    "is_empty",
];

/// A value offered for registration
///
/// Anything can be offered; only values that are really a [`Store`] get
/// registered. The rest are logged and skipped.
#[derive(Clone)]
pub struct StoreCandidate(Rc<dyn Any>);

impl StoreCandidate {
    /// Wrap an arbitrary value
    pub fn opaque<T: Any>(value: T) -> Self {
        StoreCandidate(Rc::new(value))
    }

    pub fn from_any(value: Rc<dyn Any>) -> Self {
        StoreCandidate(value)
    }

    fn into_store(self) -> Option<Rc<Store>> {
        self.0.downcast::<Store>().ok()
    }
}

impl fmt::Debug for StoreCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.downcast_ref::<Store>() {
            Some(store) => f.debug_tuple("StoreCandidate").field(&store.label()).finish(),
            None => f.write_str("StoreCandidate(<not a store>)"),
        }
    }
}

impl From<Rc<Store>> for StoreCandidate {
    fn from(store: Rc<Store>) -> Self {
        StoreCandidate(store)
    }
}

impl From<&Rc<Store>> for StoreCandidate {
    fn from(store: &Rc<Store>) -> Self {
        StoreCandidate(store.clone())
    }
}

/// One or more `name -> store` registrations
#[derive(Debug, Clone)]
pub enum Registration {
    Single { name: String, store: StoreCandidate },
    Batch(Vec<Registration>),
}

impl<S: Into<String>, C: Into<StoreCandidate>> From<(S, C)> for Registration {
    fn from((name, store): (S, C)) -> Self {
        Registration::Single {
            name: name.into(),
            store: store.into(),
        }
    }
}

impl<T: Into<Registration>> From<Vec<T>> for Registration {
    fn from(entries: Vec<T>) -> Self {
        Registration::Batch(entries.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, C: Into<StoreCandidate>> From<BTreeMap<S, C>> for Registration {
    fn from(entries: BTreeMap<S, C>) -> Self {
        Registration::Batch(entries.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, C: Into<StoreCandidate>> From<HashMap<S, C>> for Registration {
    fn from(entries: HashMap<S, C>) -> Self {
        Registration::Batch(entries.into_iter().map(Into::into).collect())
    }
}

/// Named registry of stores
///
/// Lookups by name, listener forwarding by name, and `manager["name"]`
/// shortcuts for every registered store whose name doesn't collide with a
/// manager member (see [`RESERVED_NAMES`]).
///
/// # Example
/// ```
/// use yodux_core::{Dispatcher, Store, StoreCandidate, StoreManager, StoreOptions};
///
/// let dispatcher = Dispatcher::new();
/// let todos = Store::new(&dispatcher, StoreOptions::new()).unwrap();
///
/// let mut stores = StoreManager::new();
/// stores.add(("todos", &todos));
/// stores.add(("bad", StoreCandidate::opaque(42)));
///
/// assert!(std::rc::Rc::ptr_eq(&stores["todos"], &todos));
/// assert!(stores.get_store("bad").is_none());
/// ```
#[derive(Default)]
pub struct StoreManager {
    stores: HashMap<String, Rc<Store>>,
    order: Vec<String>,
    shortcuts: HashMap<String, Rc<Store>>,
}

impl fmt::Debug for StoreManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreManager")
            .field("stores", &self.order)
            .finish()
    }
}

impl StoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one store, a list of pairs, or a map
    ///
    /// Invalid entries (empty name, not a store, name taken) are logged with
    /// `warn` and skipped; the rest of a batch still registers. Returns how
    /// many stores were added.
    pub fn add(&mut self, registration: impl Into<Registration>) -> usize {
        match registration.into() {
            Registration::Single { name, store } => usize::from(self.add_one(name, store)),
            Registration::Batch(entries) => entries.into_iter().map(|entry| self.add(entry)).sum(),
        }
    }

    fn add_one(&mut self, name: String, candidate: StoreCandidate) -> bool {
        if name.is_empty() {
            tracing::warn!("You should define a name for the store; skipping registration");
            return false;
        }
        let Some(store) = candidate.into_store() else {
            tracing::warn!(store = %name, "Value is not a Store; skipping registration");
            return false;
        };
        if self.stores.contains_key(&name) {
            tracing::warn!(store = %name, "A store with this name is already registered; skipping");
            return false;
        }

        if !RESERVED_NAMES.contains(&name.as_str()) {
            self.shortcuts.insert(name.clone(), store.clone());
        }
        tracing::debug!(store = %name, token = %store.dispatch_token(), "Store added to manager");
        self.stores.insert(name.clone(), store);
        self.order.push(name);
        true
    }

    pub fn get_store(&self, name: &str) -> Option<Rc<Store>> {
        self.stores.get(name).cloned()
    }

    /// Shortcut lookup; `None` for reserved names even when registered
    pub fn shortcut(&self, name: &str) -> Option<&Rc<Store>> {
        self.shortcuts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// Registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forward to the named store's [`Store::add_listener`]
    pub fn add_listener(&self, name: &str, spec: impl Into<ListenerSpec>) -> Result<()> {
        self.registered(name)?.add_listener(spec)
    }

    /// Forward to the named store's [`Store::remove_listener`]
    pub fn remove_listener(&self, name: &str, spec: impl Into<ListenerSpec>) -> Result<()> {
        self.registered(name)?.remove_listener(spec)
    }

    fn registered(&self, name: &str) -> Result<&Rc<Store>> {
        self.stores
            .get(name)
            .ok_or_else(|| DispatchError::UnregisteredStore {
                name: name.to_string(),
            })
    }
}

impl Index<&str> for StoreManager {
    type Output = Rc<Store>;

    /// # Panics
    ///
    /// Panics if `name` has no shortcut.
    fn index(&self, name: &str) -> &Rc<Store> {
        self.shortcut(name)
            .unwrap_or_else(|| panic!("no store shortcut named {name:?}"))
    }
}
