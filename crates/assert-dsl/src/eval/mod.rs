//! Assertion evaluation engine.
//!
//! - `Value` represents runtime values
//! - `Context` resolves `$` model and `#` state paths
//! - `FunctionRegistry` holds the callable behind every identifier
//! - `Program` wraps a compiled expression with its function registry
//! - `Evaluator` performs tree-walking evaluation
//!
//! # Example
//!
//! ```
//! use assert_dsl::eval::{MapContext, EmptyContext, Value};
//! use assert_dsl::Env;
//!
//! let env = Env::new();
//! let program = env.compile_expression("$x + 1").unwrap();
//!
//! let model = MapContext::new().with("x", 41);
//! assert_eq!(program.eval(&model, &EmptyContext), Value::from(42));
//! ```

mod context;
mod evaluator;
mod functions;
mod program;
mod value;

pub use context::{Context, EmptyContext, JsonContext, MapContext};
pub use evaluator::Evaluator;
pub use functions::{CallContext, Function, FunctionImpl, FunctionRegistry};
pub use program::Program;
pub use value::Value;
