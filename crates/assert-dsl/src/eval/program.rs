//! Compiled expression ready for evaluation.
//!
//! A `Program` combines a compiled expression with the function registry it
//! was compiled against, providing a convenient interface for evaluating it
//! against different model and state contexts.

use std::sync::Arc;

use assert_dsl_parser::SpannedExpr;

use super::{Context, EmptyContext, Evaluator, FunctionRegistry, Value};

/// A compiled expression ready for evaluation.
#[derive(Clone)]
pub struct Program {
    source: Arc<str>,
    expr: Arc<SpannedExpr>,
    functions: Arc<FunctionRegistry>,
}

impl Program {
    /// Create a new program from a compiled expression and function registry.
    pub fn new(
        source: impl Into<Arc<str>>,
        expr: SpannedExpr,
        functions: Arc<FunctionRegistry>,
    ) -> Self {
        Self {
            source: source.into(),
            expr: Arc::new(expr),
            functions,
        }
    }

    /// The source text the program was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &SpannedExpr {
        &self.expr
    }

    /// Get the function registry for this program.
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Evaluate the program against the given model and state.
    pub fn eval(&self, model: &dyn Context, state: &dyn Context) -> Value {
        Evaluator::new(model, state, &self.functions).eval(&self.expr)
    }

    /// Evaluate the program and coerce the result to a boolean.
    pub fn eval_bool(&self, model: &dyn Context, state: &dyn Context) -> bool {
        self.eval(model, state).is_truthy()
    }

    /// Evaluate the program with no model or state.
    pub fn eval_empty(&self) -> Value {
        self.eval(&EmptyContext, &EmptyContext)
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("source", &self.source)
            .field("functions", &format!("{} functions", self.functions.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MapContext;
    use assert_dsl_parser::compile;

    fn create_program(source: &str) -> Program {
        let functions = FunctionRegistry::new();
        let expr = compile(source, &functions).unwrap();
        Program::new(source, expr, Arc::new(functions))
    }

    #[test]
    fn test_eval_literal() {
        let program = create_program("42");
        assert_eq!(program.eval_empty(), Value::from(42));
        assert_eq!(program.source(), "42");
    }

    #[test]
    fn test_reuse_program() {
        let program = create_program("$x * 2");

        let model = MapContext::new().with("x", 5);
        assert_eq!(program.eval(&model, &EmptyContext), Value::from(10));

        let model = MapContext::new().with("x", 21);
        assert_eq!(program.eval(&model, &EmptyContext), Value::from(42));
    }

    #[test]
    fn test_eval_bool() {
        let program = create_program("#count > 1");
        let state = MapContext::new().with("count", 3);
        assert!(program.eval_bool(&EmptyContext, &state));
        assert!(!program.eval_bool(&EmptyContext, &EmptyContext));
    }
}
