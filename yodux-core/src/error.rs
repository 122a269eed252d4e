//! Error type shared by the dispatcher, stores and the store manager

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Usage-contract violations.
///
/// Every variant describes a programmer error at the call site: a wrong shape,
/// an undeclared name, or a dispatch issued from inside another dispatch.
/// Nothing here is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("invalid store options: {0}")]
    InvalidOptions(String),

    #[error("event \"{event}\" is not registered on store \"{store}\"")]
    UnregisteredEvent { store: String, event: String },

    #[error("store with name \"{name}\" wasn't registered")]
    UnregisteredStore { name: String },

    #[error("invalid action specification: {0}")]
    MalformedAction(String),

    #[error("cannot dispatch \"{attempted}\" while \"{active}\" is being dispatched")]
    ReentrantDispatch { active: String, attempted: String },

    #[error("store \"{store}\" has no accessor \"{accessor}\"")]
    UnknownAccessor { store: String, accessor: String },

    #[error("accessor \"{accessor}\" on store \"{store}\" returned an unexpected shape: {message}")]
    AccessorType {
        store: String,
        accessor: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = DispatchError::UnregisteredEvent {
            store: "todos".into(),
            event: "saved".into(),
        };
        assert_eq!(
            err.to_string(),
            "event \"saved\" is not registered on store \"todos\""
        );

        let err = DispatchError::UnregisteredStore {
            name: "missing".into(),
        };
        assert!(err.to_string().contains("missing"));
    }
}
