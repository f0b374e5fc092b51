//! Complete assertion workflow: register, compile, and check.
//!
//! Run with: RUST_LOG=assert_dsl=debug cargo run -p assert-dsl --example quickstart

use assert_dsl::{Env, Path, Value, Verdict};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), assert_dsl::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. Create an environment and register the functions assertions may use
    let mut env = Env::new();
    env.register_function("max", |_, args| {
        args.iter()
            .filter_map(Value::as_f64)
            .reduce(f64::max)
            .map_or(Value::Missing, Value::Number)
    })?;
    env.register_statement("is_premium", |ctx| {
        ctx.model.lookup(&Path::parse("account.tier"))
            .as_str()
            .map(|tier| Value::Bool(tier == "premium"))
            .unwrap_or_default()
    })?;

    // 2. Compile assertions
    let assertions = [
        "ALWAYS: $account.balance >= 0",
        "is_premium: max($account.limit, 1000) == $account.limit",
        "WHEN(#step == 'checkout'): $cart.items > 0 && $cart.total < max(#budget, 50)",
    ];
    let constraints = assertions
        .iter()
        .map(|a| env.compile_constraint(a))
        .collect::<Result<Vec<_>, _>>()?;

    // 3. Check them against a model and a state
    let model = json!({
        "account": {"tier": "premium", "balance": 12, "limit": 500},
        "cart": {"items": 2, "total": 80}
    });
    let state = json!({"step": "checkout", "budget": 100});

    for constraint in &constraints {
        let verdict = constraint.check(&model, &state);
        let mark = match verdict {
            Verdict::Satisfied => "ok",
            Verdict::Violated => "FAILED",
            Verdict::Inactive => "skipped",
        };
        println!("{:<8} {}", mark, constraint);
    }

    Ok(())
}
