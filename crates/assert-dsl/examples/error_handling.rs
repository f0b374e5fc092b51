//! Handling compile errors.
//!
//! Run with: cargo run -p assert-dsl --example error_handling

use assert_dsl::{Env, Error, ParseError, Value};

fn main() {
    let mut env = Env::new();
    env.register_statement("ready", |_| Value::Bool(true))
        .expect("fresh environment");

    let assertions = [
        // Unterminated string literal
        "ALWAYS: $name == 'bob",
        // Unmatched bracket
        "ALWAYS: (1 + 2 == 3",
        // Identifiers must be registered functions
        "ALWAYS: missing(1) == 1",
        // Activations are ALWAYS, WHEN(...) or a statement
        "1 == 1: 2 == 2",
        // No separator at all
        "ready",
    ];

    for assertion in assertions {
        match env.compile_constraint(assertion) {
            Ok(_) => println!("compiled: {}", assertion),
            Err(Error::Parse(ParseError::Syntax { message, span })) => {
                println!("syntax error in {:?} at {}: {}", assertion, span.start, message)
            }
            Err(Error::Parse(ParseError::UnknownFunction { name, .. })) => {
                println!("unknown function in {:?}: {}", assertion, name)
            }
            Err(err) => println!("error in {:?}: {}", assertion, err),
        }
    }

    // Registering the same name twice is rejected
    let err = env
        .register_statement("ready", |_| Value::Bool(false))
        .unwrap_err();
    println!("{}", err);
}
