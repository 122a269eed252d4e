//! Handlers: pure functions from (state snapshot, action) to (partial state, events)
//!
//! A handler never touches the store. It reads a snapshot and describes what
//! should change:
//!
//! ```
//! use serde_json::json;
//! use yodux_core::{HandlerContext, HandlerResult};
//!
//! fn add_todo(ctx: HandlerContext<'_>) -> HandlerResult {
//!     let mut items = ctx.state["items"].as_array().cloned().unwrap_or_default();
//!     items.push(ctx.action.get("text").cloned().unwrap_or(json!("")));
//!     HandlerResult::updated("items", items).with_event("changed")
//! }
//! ```
//!
//! The store merges `new_state` into its own state (declared keys only) and
//! then emits `events` in order.

use crate::action::Action;
use crate::store::StateMap;
use serde_json::Value;

/// Read-only input to a handler
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Shallow copy of the store's state, taken before the call
    pub state: &'a StateMap,
    /// The action being dispatched
    pub action: &'a Action,
}

/// A store handler
pub type Handler = Box<dyn Fn(HandlerContext<'_>) -> HandlerResult>;

/// What a handler wants done.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerResult {
    /// Partial state to merge. Keys the store didn't start with are dropped.
    pub new_state: Option<StateMap>,
    /// Declared event names to emit, in order.
    pub events: Vec<String>,
}

impl HandlerResult {
    /// No state change and no events.
    #[inline]
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// Merge `new_state`, emit nothing.
    #[inline]
    pub fn state(new_state: StateMap) -> Self {
        Self {
            new_state: Some(new_state),
            events: Vec::new(),
        }
    }

    /// Set a single key.
    pub fn updated(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::unchanged().with_state(key, value)
    }

    /// Emit a single event, no state change.
    #[inline]
    pub fn event(name: impl Into<String>) -> Self {
        Self {
            new_state: None,
            events: vec![name.into()],
        }
    }

    /// Emit several events, no state change.
    pub fn events<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            new_state: None,
            events: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a key to the partial state.
    pub fn with_state(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.new_state
            .get_or_insert_with(StateMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add an event to emit after the ones already listed.
    #[inline]
    pub fn with_event(mut self, name: impl Into<String>) -> Self {
        self.events.push(name.into());
        self
    }

    /// Returns true if there are any events to emit.
    #[inline]
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}
