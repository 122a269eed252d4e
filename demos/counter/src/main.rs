//! Counter - Minimal yodux example
//!
//! This example demonstrates the core pattern:
//! - Store: Where state lives, and which events it can emit
//! - Actions: What can happen
//! - Handlers: How state changes
//! - Binding: A view that refreshes when the store says so
//! - Main loop: Input -> Action -> Dispatch -> Render
//!
//! Commands (one per line): + / k = increment, - / j = decrement,
//! add N, reset, q = quit
//!
//! Set `RUST_LOG=yodux_core=debug` to see every dispatched action.

use std::error::Error;
use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use yodux::prelude::*;

// ============================================================================
// Store - State, events, handlers, accessors
// ============================================================================

fn count_of(ctx: &HandlerContext<'_>) -> i64 {
    ctx.state["count"].as_i64().unwrap_or(0)
}

fn counter_options() -> StoreOptions {
    StoreOptions::new()
        .initial("count", 0)
        .initial("history", json!([]))
        .events(["changed"])
        .handler("increment", |ctx| {
            HandlerResult::updated("count", count_of(&ctx) + 1).with_event("changed")
        })
        .handler("decrement", |ctx| {
            HandlerResult::updated("count", count_of(&ctx) - 1).with_event("changed")
        })
        .handler("add", |ctx| {
            let by = ctx.action.get("by").and_then(Value::as_i64).unwrap_or(0);
            HandlerResult::updated("count", count_of(&ctx) + by).with_event("changed")
        })
        .handler("reset", |ctx| {
            let mut history = ctx.state["history"].as_array().cloned().unwrap_or_default();
            history.push(json!(count_of(&ctx)));
            HandlerResult::updated("count", 0)
                .with_state("history", history)
                .with_event("changed")
        })
        .accessor("count", |state| state["count"].clone())
        .accessor("resets", |state| {
            json!(state["history"].as_array().map_or(0, Vec::len))
        })
}

// ============================================================================
// Input - Map a line of text to an action
// ============================================================================

enum Command {
    Submit(ActionSpec),
    Quit,
    Unknown,
}

fn parse(line: &str) -> Command {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some("+" | "k"), None) => Command::Submit("increment".into()),
        (Some("-" | "j"), None) => Command::Submit("decrement".into()),
        (Some("reset"), None) => Command::Submit("reset".into()),
        (Some("add"), Some(n)) => match n.parse::<i64>() {
            Ok(by) => Command::Submit(("add", json!({ "by": by })).into()),
            Err(_) => Command::Unknown,
        },
        (Some("q"), None) => Command::Quit,
        _ => Command::Unknown,
    }
}

// ============================================================================
// Main - Wire stores and views, run the input loop
// ============================================================================

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("counter=info".parse()?))
        .with_writer(io::stderr)
        .init();

    let mut app = Yodux::with_log_config(ActionLogConfig::from_env());
    let counter = app.create_store("counter", counter_options())?;

    let view = StateBinding::new().on_update(|state| {
        println!(
            "count: {}  (resets: {})",
            state.get("count").unwrap_or(&Value::Null),
            state.get("resets").unwrap_or(&Value::Null)
        );
    });
    let render = view.bind_many(&counter, [("count", "count"), ("resets", "resets")])?;
    app.add_listener("counter", ("changed", &render))?;
    render.call();

    let stdin = io::stdin();
    print!("> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        match parse(&line?) {
            Command::Submit(spec) => {
                if let Err(err) = app.submit(spec) {
                    tracing::error!(error = %err, "Dispatch failed");
                }
            }
            Command::Quit => break,
            Command::Unknown => println!("commands: + - add N reset q"),
        }
        print!("> ");
        io::stdout().flush()?;
    }

    let final_count = counter.get("count")?;
    tracing::info!(%final_count, "Bye");
    Ok(())
}
