//! Event identity and listener specifications

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_EVENT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Unforgeable identity of one declared event
///
/// Only [`EventRegistry`] mints tokens, so the bus can't be addressed with an
/// identity a store never declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventToken(u64);

impl EventToken {
    fn mint() -> Self {
        EventToken(NEXT_EVENT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// A store's declared event vocabulary: name -> token
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    tokens: HashMap<String, EventToken>,
    order: Vec<String>,
}

impl EventRegistry {
    /// Mint one token per distinct name. Repeated names share a token.
    pub fn declare<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        for name in names {
            let name = name.into();
            if !registry.tokens.contains_key(&name) {
                registry.tokens.insert(name.clone(), EventToken::mint());
                registry.order.push(name);
            }
        }
        registry
    }

    pub fn token(&self, name: &str) -> Option<EventToken> {
        self.tokens.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.contains_key(name)
    }

    /// Declared names, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// An event listener
///
/// Cloning shares the callback. Removal matches by identity, so keep a clone
/// of the `Listener` you subscribed to be able to unsubscribe it.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn()>);

impl Listener {
    pub fn new<F: Fn() + 'static>(callback: F) -> Self {
        Listener(Rc::new(callback))
    }

    pub fn call(&self) {
        (self.0)()
    }

    pub fn same_as(&self, other: &Listener) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Record form of a listener spec (`{event, callback}`)
#[derive(Debug, Clone)]
pub struct Subscription {
    pub event: String,
    pub callback: Listener,
}

impl Subscription {
    pub fn new(event: impl Into<String>, callback: Listener) -> Self {
        Self {
            event: event.into(),
            callback,
        }
    }
}

/// What to subscribe or unsubscribe
///
/// Accepts a `(name, listener)` pair, a [`Subscription`] record, or a batch
/// mixing both (batches may nest).
#[derive(Debug, Clone)]
pub enum ListenerSpec {
    Single { event: String, callback: Listener },
    Batch(Vec<ListenerSpec>),
}

impl ListenerSpec {
    pub fn single(event: impl Into<String>, callback: Listener) -> Self {
        ListenerSpec::Single {
            event: event.into(),
            callback,
        }
    }

    /// Visit every `(event, callback)` pair in order, stopping at the first error
    pub(crate) fn try_for_each<E>(
        &self,
        f: &mut impl FnMut(&str, &Listener) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            ListenerSpec::Single { event, callback } => f(event, callback),
            ListenerSpec::Batch(specs) => {
                for spec in specs {
                    spec.try_for_each(f)?;
                }
                Ok(())
            }
        }
    }
}

impl From<Subscription> for ListenerSpec {
    fn from(sub: Subscription) -> Self {
        ListenerSpec::Single {
            event: sub.event,
            callback: sub.callback,
        }
    }
}

impl<S: Into<String>> From<(S, Listener)> for ListenerSpec {
    fn from((event, callback): (S, Listener)) -> Self {
        ListenerSpec::Single {
            event: event.into(),
            callback,
        }
    }
}

impl<S: Into<String>> From<(S, &Listener)> for ListenerSpec {
    fn from((event, callback): (S, &Listener)) -> Self {
        ListenerSpec::Single {
            event: event.into(),
            callback: callback.clone(),
        }
    }
}

impl<T: Into<ListenerSpec>> From<Vec<T>> for ListenerSpec {
    fn from(specs: Vec<T>) -> Self {
        ListenerSpec::Batch(specs.into_iter().map(Into::into).collect())
    }
}
