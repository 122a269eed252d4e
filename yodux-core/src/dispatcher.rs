//! The dispatcher: one sequencer that fans every action out to every store

use crate::action::Action;
use crate::config::ActionLogConfig;
use crate::error::{DispatchError, Result};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Callback invoked once per dispatched action
pub type DispatchCallback = Rc<dyn Fn(&Action) -> Result<()>>;

/// Opaque handle identifying one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatchToken(u64);

impl fmt::Display for DispatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID_{}", self.0)
    }
}

struct Inner {
    callbacks: RefCell<Vec<(DispatchToken, DispatchCallback)>>,
    next_token: Cell<u64>,
    active: RefCell<Option<String>>,
    log: ActionLogConfig,
}

/// Synchronous, re-entrancy-guarded action sequencer
///
/// Cloning a `Dispatcher` yields another handle to the same sequencer, so
/// the application creates one and passes it to every store and producer.
///
/// # Re-entrancy
///
/// Dispatching from inside a callback (or from a listener reached through
/// one) fails with [`DispatchError::ReentrantDispatch`]. The nested action is
/// not run; the outer round continues.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use yodux_core::{Action, Dispatcher};
///
/// let dispatcher = Dispatcher::new();
/// let seen = Rc::new(Cell::new(0));
///
/// let counter = seen.clone();
/// dispatcher.register(move |_action: &Action| {
///     counter.set(counter.get() + 1);
///     Ok(())
/// });
///
/// dispatcher.dispatch(Action::named("ping")).unwrap();
/// assert_eq!(seen.get(), 1);
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    inner: Rc<Inner>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("callbacks", &self.len())
            .field("dispatching", &self.is_dispatching())
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_log_config(ActionLogConfig::default())
    }

    /// Create a dispatcher whose action logging is filtered by `log`
    pub fn with_log_config(log: ActionLogConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                callbacks: RefCell::new(Vec::new()),
                next_token: Cell::new(1),
                active: RefCell::new(None),
                log,
            }),
        }
    }

    /// Append a callback; it runs for every later dispatch, after all
    /// earlier registrations
    pub fn register<F>(&self, callback: F) -> DispatchToken
    where
        F: Fn(&Action) -> Result<()> + 'static,
    {
        let token = DispatchToken(self.inner.next_token.get());
        self.inner.next_token.set(token.0 + 1);
        let callback: DispatchCallback = Rc::new(callback);
        self.inner.callbacks.borrow_mut().push((token, callback));
        tracing::trace!(%token, "Registered dispatch callback");
        token
    }

    /// Remove a registration. Returns `false` if the token is unknown.
    pub fn unregister(&self, token: DispatchToken) -> bool {
        let mut callbacks = self.inner.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(t, _)| *t != token);
        before != callbacks.len()
    }

    /// Invoke every registered callback with `action`, in registration order
    ///
    /// The first callback error aborts the round and is returned.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        let name = action.name().to_string();

        if let Some(active) = self.inner.active.borrow().as_ref() {
            tracing::warn!(action = %name, active = %active, "Rejected re-entrant dispatch");
            return Err(DispatchError::ReentrantDispatch {
                active: active.clone(),
                attempted: name,
            });
        }

        let _round = ActiveRound::start(&self.inner, name.clone());

        // Registrations made during the round apply to the next one
        let callbacks: Vec<(DispatchToken, DispatchCallback)> =
            self.inner.callbacks.borrow().iter().cloned().collect();

        if self.inner.log.should_log(&name) {
            tracing::debug!(action = %name, callbacks = callbacks.len(), "Dispatching action");
        }

        for (token, callback) in &callbacks {
            if let Err(err) = callback(&action) {
                tracing::debug!(action = %name, %token, error = %err, "Dispatch aborted");
                return Err(err);
            }
        }

        Ok(())
    }

    /// Whether a dispatch round is in progress
    pub fn is_dispatching(&self) -> bool {
        self.inner.active.borrow().is_some()
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.inner.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn log_config(&self) -> &ActionLogConfig {
        &self.inner.log
    }
}

/// Marks a round active and clears the mark on every exit path
struct ActiveRound<'a> {
    inner: &'a Inner,
}

impl<'a> ActiveRound<'a> {
    fn start(inner: &'a Inner, name: String) -> Self {
        *inner.active.borrow_mut() = Some(name);
        Self { inner }
    }
}

impl Drop for ActiveRound<'_> {
    fn drop(&mut self) {
        self.inner.active.borrow_mut().take();
    }
}
