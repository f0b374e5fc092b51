//! Common test utilities for assert-dsl-parser integration tests.

use assert_dsl_parser::{compile, NameRegistry, ParseError, SpannedExpr};

/// Names registered in every integration test.
#[allow(dead_code)]
pub fn names() -> NameRegistry {
    let mut names = NameRegistry::new();
    for name in ["add", "mul", "len", "ready", "is_admin"] {
        names.register(name).expect("fixture names are unique");
    }
    names
}

/// Compile input and assert it succeeds, returning the AST.
#[allow(dead_code)]
pub fn assert_parses(input: &str) -> SpannedExpr {
    match compile(input, &names()) {
        Ok(ast) => ast,
        Err(e) => panic!("failed to parse '{}': {}", input, e),
    }
}

/// Compile input and assert it fails, returning the error.
#[allow(dead_code)]
pub fn assert_parse_error(input: &str) -> ParseError {
    match compile(input, &names()) {
        Ok(ast) => panic!("expected parse error for '{}', but got: {:?}", input, ast),
        Err(e) => e,
    }
}
