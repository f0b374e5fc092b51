//! Interpolating message templates.
//!
//! Run with: cargo run -p assert-dsl --example messages

use assert_dsl::{Env, Value};
use serde_json::json;

fn main() -> Result<(), assert_dsl::Error> {
    let mut env = Env::new();
    env.register_function("sum", |_, args| {
        Value::Number(args.iter().filter_map(Value::as_f64).sum())
    })?;
    env.register_statement("today", |_| Value::from("Tuesday"))?;

    let model = json!({"order": {"id": "A-17", "lines": [3, 4]}});
    let state = json!({"retries": 2});

    let templates = [
        "Order $order.id has lines $order.lines.",
        "Retried #retries times on today.",
        "Total quantity: sum($order.lines.0, $order.lines.1)",
        "Unknown fields stay as written: $order.customer",
    ];

    for template in templates {
        println!("{}", env.render_message(template, &model, &state)?);
    }

    Ok(())
}
