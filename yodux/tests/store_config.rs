//! Stores built from JSON configuration, read through typed accessors

use serde::Deserialize;
use serde_json::json;
use yodux::prelude::*;

#[derive(Debug, Deserialize, PartialEq)]
struct Todo {
    text: String,
    done: bool,
}

const TODOS: &str = r#"{
    "label": "todos",
    "state": { "items": [], "filter": "all" },
    "events": ["changed", "filtered"]
}"#;

fn todo_store(app: &mut Yodux) -> std::rc::Rc<Store> {
    let config = StoreConfig::from_json(TODOS).unwrap();
    let options = StoreOptions::from_config(config)
        .handler("add", |ctx| {
            let mut items = ctx.state["items"].as_array().cloned().unwrap_or_default();
            items.push(json!({
                "text": ctx.action.get("text").cloned().unwrap_or_default(),
                "done": false,
            }));
            HandlerResult::updated("items", items).with_event("changed")
        })
        .handler("filter", |ctx| {
            HandlerResult::updated("filter", ctx.action.get("mode").cloned().unwrap_or_default())
                .with_event("filtered")
        })
        .accessor("items", |state| state["items"].clone())
        .accessor("filter", |state| state["filter"].clone());
    app.create_store("todos", options).unwrap()
}

#[test]
fn config_declares_state_and_events() {
    let mut app = Yodux::new();
    let store = todo_store(&mut app);

    assert_eq!(store.label(), "todos");
    assert_eq!(store.event_names(), vec!["changed", "filtered"]);
    assert!(store.has_key("items"));
    assert!(store.has_key("filter"));
}

#[test]
fn typed_accessor_reads() {
    let mut app = Yodux::new();
    let store = todo_store(&mut app);

    app.submit(vec![
        ActionSpec::with_data("add", json!({"text": "milk"})),
        ActionSpec::with_data("filter", json!({"mode": "open"})),
    ])
    .unwrap();

    let items: Vec<Todo> = store.get_as("items").unwrap();
    assert_eq!(
        items,
        vec![Todo {
            text: "milk".into(),
            done: false
        }]
    );
    assert_eq!(store.get_as::<String>("filter").unwrap(), "open");
}

#[test]
fn binding_follows_multiple_events() {
    let mut app = Yodux::new();
    let store = todo_store(&mut app);

    let view = StateBinding::new();
    let refresh = view
        .bind_many(&store, [("todos", "items"), ("mode", "filter")])
        .unwrap();
    app.add_listener("todos", vec![("changed", &refresh), ("filtered", &refresh)])
        .unwrap();

    app.submit_with("add", json!({"text": "eggs"})).unwrap();
    assert_eq!(view.get("todos"), Some(json!([{"text": "eggs", "done": false}])));
    assert_eq!(view.get("mode"), Some(json!("all")));

    app.submit(("filter", json!({"mode": "done"}))).unwrap();
    assert_eq!(view.get("mode"), Some(json!("done")));
}

#[test]
fn bad_config_is_rejected() {
    assert!(matches!(
        StoreConfig::from_json("[1, 2]"),
        Err(DispatchError::InvalidOptions(_))
    ));
    assert!(matches!(
        StoreConfig::from_json(r#"{"stat": {}}"#),
        Err(DispatchError::InvalidOptions(_))
    ));
    assert!(matches!(
        StoreConfig::from_json(r#"{"events": "changed"}"#),
        Err(DispatchError::InvalidOptions(_))
    ));
}
