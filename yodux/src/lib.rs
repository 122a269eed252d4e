//! yodux: unidirectional state management for Rust applications
//!
//! One dispatcher, many stores. Producers submit actions, the dispatcher
//! delivers each one to every store in registration order, stores update
//! their private state and emit declared events, and views listen.
//!
//! # Example
//! ```
//! use serde_json::json;
//! use yodux::prelude::*;
//!
//! let mut app = Yodux::new();
//! let counter = app
//!     .create_store(
//!         "counter",
//!         StoreOptions::new()
//!             .initial("count", 0)
//!             .events(["changed"])
//!             .handler("increment", |ctx| {
//!                 let n = ctx.state["count"].as_i64().unwrap_or(0);
//!                 HandlerResult::updated("count", n + 1).with_event("changed")
//!             })
//!             .accessor("count", |state| state["count"].clone()),
//!     )
//!     .unwrap();
//!
//! let view = StateBinding::new();
//! let refresh = view.bind("count", &counter, "count").unwrap();
//! app.add_listener("counter", ("changed", &refresh)).unwrap();
//!
//! app.submit("increment").unwrap();
//! assert_eq!(view.get("count"), Some(json!(1)));
//! ```

// Re-export everything from core
pub use yodux_core::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use yodux_core::prelude::*;

    // Testing helpers
    pub use yodux_core::testing::{ActionRecorder, EventRecorder, RecordedEvent};
}
