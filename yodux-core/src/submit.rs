//! Action submission: one entry point for single actions and batches
//!
//! ```
//! use serde_json::json;
//! use yodux_core::{submit_action, submit_action_with, Dispatcher};
//!
//! let dispatcher = Dispatcher::new();
//!
//! submit_action(&dispatcher, "refresh").unwrap();
//! submit_action_with(&dispatcher, "add", json!({"text": "milk"})).unwrap();
//!
//! // Batches mix bare names, [name, data] pairs and {name, ...} records
//! submit_action(&dispatcher, json!(["a", ["b", {"x": 1}], {"name": "c", "y": 2}])).unwrap();
//! ```

use crate::action::{Action, ActionId, ActionName, Payload};
use crate::config::kind_of;
use crate::dispatcher::Dispatcher;
use crate::error::{DispatchError, Result};
use serde_json::Value;

/// What to dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum ActionSpec {
    /// One action. `data`, when present, must be a JSON object or null.
    Named {
        name: ActionName,
        data: Option<Value>,
    },
    /// Several specs, dispatched in order
    Batch(Vec<ActionSpec>),
    /// JSON-shaped input, normalized when submitted
    ///
    /// A string is a name and an array is a batch whose elements are
    /// `[nameOrBatch, data]` arrays, `{name, ...}` records, or bare names.
    Raw(Value),
}

impl ActionSpec {
    pub fn named(name: impl Into<ActionName>) -> Self {
        ActionSpec::Named {
            name: name.into(),
            data: None,
        }
    }

    pub fn with_data(name: impl Into<ActionName>, data: Value) -> Self {
        ActionSpec::Named {
            name: name.into(),
            data: Some(data),
        }
    }
}

impl From<&str> for ActionSpec {
    fn from(name: &str) -> Self {
        ActionSpec::named(name)
    }
}

impl From<String> for ActionSpec {
    fn from(name: String) -> Self {
        ActionSpec::named(name)
    }
}

impl From<ActionName> for ActionSpec {
    fn from(name: ActionName) -> Self {
        ActionSpec::named(name)
    }
}

impl From<ActionId> for ActionSpec {
    fn from(id: ActionId) -> Self {
        ActionSpec::named(id)
    }
}

impl From<Action> for ActionSpec {
    fn from(action: Action) -> Self {
        let (name, payload) = (action.name().clone(), action.payload().clone());
        ActionSpec::with_data(name, Value::Object(payload))
    }
}

impl From<Value> for ActionSpec {
    fn from(value: Value) -> Self {
        ActionSpec::Raw(value)
    }
}

impl<N: Into<ActionName>> From<(N, Value)> for ActionSpec {
    fn from((name, data): (N, Value)) -> Self {
        ActionSpec::with_data(name, data)
    }
}

impl<N: Into<ActionName>> From<(N, Payload)> for ActionSpec {
    fn from((name, data): (N, Payload)) -> Self {
        ActionSpec::with_data(name, Value::Object(data))
    }
}

impl<T: Into<ActionSpec>> From<Vec<T>> for ActionSpec {
    fn from(specs: Vec<T>) -> Self {
        ActionSpec::Batch(specs.into_iter().map(Into::into).collect())
    }
}

/// Dispatch one action or a batch
///
/// Batches run in order and stop at the first error; actions before it have
/// already been dispatched.
pub fn submit_action(dispatcher: &Dispatcher, spec: impl Into<ActionSpec>) -> Result<()> {
    submit(dispatcher, spec.into())
}

/// Dispatch with explicit data, the `(name, data)` call form
///
/// `data` is merged into a single action's payload; a string `name` field in
/// it replaces the given name. A batch ignores it.
pub fn submit_action_with(
    dispatcher: &Dispatcher,
    name_or_batch: impl Into<ActionSpec>,
    data: Value,
) -> Result<()> {
    match name_or_batch.into() {
        ActionSpec::Named { name, .. } => submit(dispatcher, ActionSpec::with_data(name, data)),
        ActionSpec::Raw(value) => submit_raw(dispatcher, value, Some(data)),
        batch @ ActionSpec::Batch(_) => submit(dispatcher, batch),
    }
}

fn submit(dispatcher: &Dispatcher, spec: ActionSpec) -> Result<()> {
    match spec {
        ActionSpec::Named { name, data } => dispatch_named(dispatcher, name, data),
        ActionSpec::Batch(specs) => {
            tracing::trace!(size = specs.len(), "Submitting action batch");
            for spec in specs {
                match spec {
                    ActionSpec::Raw(element) => submit_element(dispatcher, element)?,
                    spec => submit(dispatcher, spec)?,
                }
            }
            Ok(())
        }
        ActionSpec::Raw(value) => submit_raw(dispatcher, value, None),
    }
}

fn dispatch_named(dispatcher: &Dispatcher, name: ActionName, data: Option<Value>) -> Result<()> {
    let payload = match data {
        None | Some(Value::Null) => Payload::new(),
        Some(Value::Object(payload)) => payload,
        Some(other) => {
            return Err(DispatchError::MalformedAction(format!(
                "data for \"{name}\" must be an object, got {}",
                kind_of(&other)
            )))
        }
    };
    // `{name, ...data}`: a name carried in the data wins
    let name = match payload.get("name") {
        None | Some(Value::Null) => name,
        Some(Value::String(text)) => ActionName::Text(text.clone()),
        Some(other) => {
            return Err(DispatchError::MalformedAction(format!(
                "\"name\" in data for \"{name}\" must be a string, got {}",
                kind_of(other)
            )))
        }
    };
    dispatcher.dispatch(Action::new(name, payload))
}

/// Top-level raw input: a name or a batch
fn submit_raw(dispatcher: &Dispatcher, name_or_batch: Value, data: Option<Value>) -> Result<()> {
    match name_or_batch {
        Value::String(name) => dispatch_named(dispatcher, ActionName::Text(name), data),
        Value::Array(elements) => {
            tracing::trace!(size = elements.len(), "Submitting action batch");
            for element in elements {
                submit_element(dispatcher, element)?;
            }
            Ok(())
        }
        other => Err(DispatchError::MalformedAction(format!(
            "expected a name or a list of actions, got {}",
            kind_of(&other)
        ))),
    }
}

/// One batch element
fn submit_element(dispatcher: &Dispatcher, element: Value) -> Result<()> {
    match element {
        // Positional: [nameOrBatch, data]
        Value::Array(args) => {
            let mut args = args.into_iter();
            let name_or_batch = args.next().unwrap_or(Value::Null);
            submit_raw(dispatcher, name_or_batch, args.next())
        }
        Value::Object(record) => {
            let name = record.get("name").cloned().unwrap_or(Value::Null);
            submit_raw(dispatcher, name, Some(Value::Object(record)))
        }
        bare => submit_raw(dispatcher, bare, None),
    }
}
