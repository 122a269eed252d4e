//! Configuration: dispatch log filtering and static store configuration

use crate::error::{DispatchError, Result};
use crate::store::StateMap;
use serde::Deserialize;
use serde_json::Value;

/// Environment variable holding comma-separated include patterns
pub const LOG_INCLUDE_ENV: &str = "YODUX_LOG_INCLUDE";
/// Environment variable holding comma-separated exclude patterns
pub const LOG_EXCLUDE_ENV: &str = "YODUX_LOG_EXCLUDE";

/// Which dispatched actions get a `debug` log line.
///
/// Patterns support:
/// - `*` matches any sequence of characters
/// - `?` matches any single character
/// - Literal text matches exactly
///
/// # Examples
///
/// - `todo*` matches todoAdd, todoRemove, etc.
/// - `*Error*` matches any action containing "Error"
/// - `tick` matches only tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActionLogConfig {
    /// If non-empty, only log actions matching these patterns
    #[serde(rename = "include")]
    pub include_patterns: Vec<String>,
    /// Exclude actions matching these patterns (applied after include)
    #[serde(rename = "exclude")]
    pub exclude_patterns: Vec<String>,
}

impl ActionLogConfig {
    /// Create a new config from comma-separated pattern strings
    ///
    /// # Example
    /// ```
    /// use yodux_core::ActionLogConfig;
    ///
    /// let config = ActionLogConfig::new(Some("todo*,save"), Some("tick"));
    /// assert!(config.should_log("todoAdd"));
    /// assert!(config.should_log("save"));
    /// assert!(!config.should_log("tick"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    /// Read `YODUX_LOG_INCLUDE` / `YODUX_LOG_EXCLUDE`
    pub fn from_env() -> Self {
        let include = std::env::var(LOG_INCLUDE_ENV).ok();
        let exclude = std::env::var(LOG_EXCLUDE_ENV).ok();
        Self::new(include.as_deref(), exclude.as_deref())
    }

    /// Check if an action name should be logged based on include/exclude patterns
    pub fn should_log(&self, action_name: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, action_name))
        {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|p| glob_match(p, action_name))
    }
}

fn split_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Glob match over whole strings: `*` is any run of characters, `?` exactly one
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let (mut pattern_rest, mut text_rest) = (pattern, text);
    // Where to resume after the most recent `*`: pattern after it, text it absorbed up to
    let mut resume: Option<(&str, &str)> = None;

    loop {
        let mut pattern_chars = pattern_rest.chars();
        let mut text_chars = text_rest.chars();
        match (pattern_chars.next(), text_chars.next()) {
            (None, None) => return true,
            (Some('*'), _) => {
                pattern_rest = pattern_chars.as_str();
                resume = Some((pattern_rest, text_rest));
            }
            (Some(p), Some(t)) if p == '?' || p == t => {
                pattern_rest = pattern_chars.as_str();
                text_rest = text_chars.as_str();
            }
            _ => {
                // Let the last `*` absorb one more character, then retry
                let Some((after_star, absorbed)) = resume else {
                    return false;
                };
                let mut absorbed = absorbed.chars();
                if absorbed.next().is_none() {
                    return false;
                }
                pattern_rest = after_star;
                text_rest = absorbed.as_str();
                resume = Some((after_star, text_rest));
            }
        }
    }
}

/// Static part of a store's configuration
///
/// Handlers and accessors are code and get attached through
/// [`StoreOptions`](crate::StoreOptions); this covers what can live in a
/// config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Label used in logs and error messages
    pub label: Option<String>,
    /// Initial state; its key set is fixed for the store's lifetime
    pub state: StateMap,
    /// Declared event vocabulary
    pub events: Vec<String>,
}

impl StoreConfig {
    /// Parse from a JSON value, which must be a non-array object
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(DispatchError::InvalidOptions(format!(
                "expected an object, got {}",
                kind_of(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| DispatchError::InvalidOptions(e.to_string()))
    }

    /// Parse from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| DispatchError::InvalidOptions(e.to_string()))?;
        Self::from_value(value)
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_glob_match_exact() {
        assert!(glob_match("tick", "tick"));
        assert!(!glob_match("tick", "tock"));
        assert!(!glob_match("tick", "tickTock"));
    }

    #[test]
    fn test_glob_match_wildcards() {
        assert!(glob_match("todo*", "todoAdd"));
        assert!(glob_match("*Error*", "loadErrorShown"));
        assert!(glob_match("sav?", "save"));
        assert!(!glob_match("sav?", "saved"));
    }

    #[test]
    fn test_glob_match_edges() {
        assert!(glob_match("", ""));
        assert!(!glob_match("", "a"));
        assert!(glob_match("*", ""));
        assert!(glob_match("**", "anything"));
        assert!(!glob_match("?", ""));
        assert!(glob_match("a*b*c", "aXXbYYc"));
        assert!(!glob_match("a*b*c", "aXXbYY"));
        assert!(glob_match("*ab", "aab"));
    }

    #[test]
    fn test_glob_match_multibyte() {
        assert!(glob_match("caf?", "café"));
        assert!(glob_match("*é", "résumé"));
        assert!(!glob_match("caf?", "cafés"));
    }

    #[test]
    fn test_should_log_include_then_exclude() {
        let config = ActionLogConfig::new(Some("todo*"), Some("todoTick"));
        assert!(config.should_log("todoAdd"));
        assert!(!config.should_log("todoTick"));
        assert!(!config.should_log("save"));
    }

    #[test]
    fn test_default_logs_everything() {
        let config = ActionLogConfig::default();
        assert!(config.should_log("anything"));
    }

    #[test]
    fn test_log_config_deserializes() {
        let config: ActionLogConfig =
            serde_json::from_value(json!({"exclude": ["tick"]})).unwrap();
        assert!(config.include_patterns.is_empty());
        assert!(!config.should_log("tick"));
    }

    #[test]
    fn test_store_config_from_value() {
        let config = StoreConfig::from_value(json!({
            "label": "todos",
            "state": {"items": [], "filter": "all"},
            "events": ["changed"]
        }))
        .unwrap();

        assert_eq!(config.label.as_deref(), Some("todos"));
        assert_eq!(config.events, vec!["changed".to_string()]);
        assert!(config.state.contains_key("filter"));
    }

    #[test]
    fn test_store_config_rejects_arrays_and_scalars() {
        for bad in [json!([]), json!(3), json!("state"), Value::Null] {
            assert!(matches!(
                StoreConfig::from_value(bad),
                Err(DispatchError::InvalidOptions(_))
            ));
        }
    }

    #[test]
    fn test_store_config_rejects_wrong_field_shapes() {
        let err = StoreConfig::from_json(r#"{"state": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidOptions(_)));

        let err = StoreConfig::from_json(r#"{"handlers": {}}"#).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidOptions(_)));
    }
}
