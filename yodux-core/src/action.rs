//! Actions: named records that describe an intent to change state

use serde_json::{Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Arbitrary action payload (every field except the name)
pub type Payload = Map<String, Value>;

static NEXT_ACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque action identity
///
/// Two ids minted with the same label are still different actions, so an
/// `ActionId` can't collide with a text name or another module's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId {
    id: u64,
    label: &'static str,
}

impl ActionId {
    /// Mint a fresh identity. The label is for logs only.
    pub fn new(label: &'static str) -> Self {
        Self {
            id: NEXT_ACTION_ID.fetch_add(1, Ordering::Relaxed),
            label,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

/// Name an action is routed by
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionName {
    Text(String),
    Id(ActionId),
}

impl ActionName {
    /// The text form, if this is a text name
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ActionName::Text(name) => Some(name),
            ActionName::Id(_) => None,
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionName::Text(name) => f.write_str(name),
            ActionName::Id(id) => write!(f, "{}#{}", id.label, id.id),
        }
    }
}

impl From<&str> for ActionName {
    fn from(name: &str) -> Self {
        ActionName::Text(name.to_string())
    }
}

impl From<String> for ActionName {
    fn from(name: String) -> Self {
        ActionName::Text(name)
    }
}

impl From<&String> for ActionName {
    fn from(name: &String) -> Self {
        ActionName::Text(name.clone())
    }
}

impl From<ActionId> for ActionName {
    fn from(id: ActionId) -> Self {
        ActionName::Id(id)
    }
}

/// A dispatched action
///
/// Lives for one dispatch call. Stores receive it by reference and route on
/// [`Action::name`]; everything else is payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    name: ActionName,
    payload: Payload,
}

impl Action {
    /// Build an action, dropping any `name` key from the payload
    pub fn new(name: impl Into<ActionName>, mut payload: Payload) -> Self {
        payload.remove("name");
        Self {
            name: name.into(),
            payload,
        }
    }

    /// An action with no payload
    pub fn named(name: impl Into<ActionName>) -> Self {
        Self::new(name, Payload::new())
    }

    pub fn name(&self) -> &ActionName {
        &self.name
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Look up a single payload field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    /// Add a payload field, builder style
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        if field != "name" {
            self.payload.insert(field, value.into());
        }
        self
    }

    /// The action as one flat JSON object, `name` included
    ///
    /// Id names are rendered with their label and serial.
    pub fn to_value(&self) -> Value {
        let mut flat = Map::new();
        flat.insert("name".to_string(), Value::String(self.name.to_string()));
        flat.extend(self.payload.clone());
        Value::Object(flat)
    }
}
