//! Common test utilities for assert-dsl integration tests.

use assert_dsl::{Constraint, Env, Error, Path, Value};

/// An environment with the functions used across the integration tests.
#[allow(dead_code)]
pub fn env() -> Env {
    let mut env = Env::new();
    env.register_function("add", |_, args| {
        Value::Number(args.iter().filter_map(Value::as_f64).sum())
    })
    .expect("add registers");
    env.register_function("mul", |_, args| {
        Value::Number(args.iter().filter_map(Value::as_f64).product())
    })
    .expect("mul registers");
    env.register_function("upper", |_, args| match args.first() {
        Some(Value::String(s)) => Value::from(s.to_uppercase()),
        _ => Value::Missing,
    })
    .expect("upper registers");
    env.register_statement("is_admin", |ctx| {
        Value::Bool(ctx.model.lookup(&Path::parse("role")).as_str() == Some("admin"))
    })
    .expect("is_admin registers");
    env.register_statement("is_ready", |ctx| ctx.state.lookup(&Path::parse("ready")))
        .expect("is_ready registers");
    env
}

/// Compile an assertion and assert it succeeds.
#[allow(dead_code)]
pub fn assert_compiles(assertion: &str) -> Constraint {
    match env().compile_constraint(assertion) {
        Ok(constraint) => constraint,
        Err(e) => panic!("failed to compile '{}': {}", assertion, e),
    }
}

/// Compile an assertion and assert it fails, returning the error.
#[allow(dead_code)]
pub fn assert_compile_error(assertion: &str) -> Error {
    match env().compile_constraint(assertion) {
        Ok(constraint) => panic!(
            "expected compile error for '{}', but got: {:?}",
            assertion, constraint
        ),
        Err(e) => e,
    }
}
