//! Core types for yodux
//!
//! This crate provides a unidirectional data-flow core: one dispatcher
//! sequences actions, stores own private state and react to actions, and a
//! store manager finds stores by name.
//!
//! # Core Concepts
//!
//! - **Action**: A named record describing an intent (`{name, ...payload}`)
//! - **Dispatcher**: Delivers each action to every registered callback, one round at a time
//! - **Store**: Private state plus a handler table; emits declared events after updates
//! - **EventBus**: Per-store pub/sub keyed by unforgeable event tokens
//! - **StoreManager**: Named registry with listener forwarding
//! - **StateBinding**: Copies store accessors into a view's state on events
//!
//! # Basic Example
//!
//! ```
//! use serde_json::json;
//! use yodux_core::prelude::*;
//!
//! let dispatcher = Dispatcher::new();
//! let todos = Store::new(
//!     &dispatcher,
//!     StoreOptions::new()
//!         .label("todos")
//!         .initial("items", json!([]))
//!         .events(["changed"])
//!         .handler("add", |ctx| {
//!             let mut items = ctx.state["items"].as_array().cloned().unwrap_or_default();
//!             items.extend(ctx.action.get("text").cloned());
//!             HandlerResult::updated("items", items).with_event("changed")
//!         })
//!         .accessor("items", |state| state["items"].clone()),
//! )
//! .unwrap();
//!
//! submit_action_with(&dispatcher, "add", json!({"text": "milk"})).unwrap();
//! assert_eq!(todos.get("items").unwrap(), json!(["milk"]));
//! ```
//!
//! # Re-entrancy
//!
//! Dispatch is synchronous. A callback, handler or listener that dispatches
//! while a round is in progress gets [`DispatchError::ReentrantDispatch`];
//! derived actions should be submitted after the current `dispatch` returns.
//!
//! # Logging
//!
//! All diagnostics go through `tracing`. Every dispatched action is logged at
//! `debug`, filtered by [`ActionLogConfig`] (see `YODUX_LOG_INCLUDE` and
//! `YODUX_LOG_EXCLUDE`).

pub mod action;
pub mod binding;
pub mod bus;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;
pub mod manager;
pub mod store;
pub mod submit;
pub mod testing;

// Action exports
pub use action::{Action, ActionId, ActionName, Payload};

// Dispatcher exports
pub use dispatcher::{DispatchCallback, DispatchToken, Dispatcher};
pub use error::{DispatchError, Result};
pub use submit::{submit_action, submit_action_with, ActionSpec};

// Event system exports
pub use bus::EventBus;
pub use event::{EventRegistry, EventToken, Listener, ListenerSpec, Subscription};

// Store exports
pub use handler::{Handler, HandlerContext, HandlerResult};
pub use store::{Accessor, StateMap, Store, StoreOptions};

// Registry and view exports
pub use binding::{StateBinding, StoreFields};
pub use context::Yodux;
pub use manager::{Registration, StoreCandidate, StoreManager, RESERVED_NAMES};

// Config exports
pub use config::{glob_match, ActionLogConfig, StoreConfig, LOG_EXCLUDE_ENV, LOG_INCLUDE_ENV};

// Testing exports
pub use testing::{ActionRecorder, EventRecorder, RecordedEvent};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionId, ActionName};
    pub use crate::binding::{StateBinding, StoreFields};
    pub use crate::config::{ActionLogConfig, StoreConfig};
    pub use crate::context::Yodux;
    pub use crate::dispatcher::{DispatchToken, Dispatcher};
    pub use crate::error::DispatchError;
    pub use crate::event::{Listener, ListenerSpec, Subscription};
    pub use crate::handler::{HandlerContext, HandlerResult};
    pub use crate::manager::{StoreCandidate, StoreManager};
    pub use crate::store::{StateMap, Store, StoreOptions};
    pub use crate::submit::{submit_action, submit_action_with, ActionSpec};
}
