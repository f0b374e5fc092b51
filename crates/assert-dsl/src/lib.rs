//! Assertion DSL: compile `<activation>:<condition>` assertions into
//! predicates over a model and a state context.
//!
//! # Quick Start
//!
//! ```
//! use assert_dsl::{Env, Path, Verdict};
//! use serde_json::json;
//!
//! let mut env = Env::new();
//! env.register_statement("is_open", |ctx| {
//!     ctx.state.lookup(&Path::parse("open"))
//! })
//! .unwrap();
//!
//! let constraint = env.compile_constraint("is_open: $balance >= 0").unwrap();
//!
//! let model = json!({"balance": -5});
//! assert_eq!(constraint.check(&model, &json!({"open": false})), Verdict::Inactive);
//! assert_eq!(constraint.check(&model, &json!({"open": true})), Verdict::Violated);
//! ```
//!
//! # Architecture
//!
//! The `Env` struct coordinates:
//! - **Parser** (`assert-dsl-parser`): tokenizer and precedence compiler
//! - **Functions**: the registry deciding which identifiers are calls and
//!   statements
//! - **Evaluator**: tree-walking evaluation over model and state contexts
//! - **Messages**: reference interpolation in free text
//!
//! # Modules
//!
//! - `eval`: runtime values, contexts, functions and the evaluator
//! - `constraint`: activation/condition assertions
//! - `message`: message template tokenizer and renderer
//! - `observe`: compile-stage hooks

mod constraint;
mod env;
mod error;
pub mod eval;
pub mod message;
pub mod observe;

pub use constraint::{Activation, Constraint, Verdict};
pub use env::Env;
pub use error::Error;
pub use eval::{
    CallContext, Context, EmptyContext, Function, FunctionRegistry, JsonContext, MapContext,
    Program, Value,
};
pub use message::render_message;
pub use observe::{CompileObserver, NoopObserver, TracingObserver};

// Re-export the compiler surface so callers only depend on this crate.
pub use assert_dsl_parser::{
    compile, grammar, lex, BinaryOp, DuplicateFunctionError, Expr, FunctionNames,
    NameRegistry, ParseError, Path, Span, Spanned, SpannedExpr, SpannedToken, Token,
};
