//! Unified environment for assertion processing.
//!
//! The `Env` owns the registered functions and the compile observer, and
//! coordinates compiling expressions and constraints and rendering messages.

use std::sync::Arc;

use crate::constraint::{compile_observed, Constraint};
use crate::eval::{CallContext, Context, Function, FunctionRegistry, Program, Value};
use crate::message;
use crate::observe::{CompileObserver, TracingObserver};
use crate::Error;

/// Unified environment for assertion processing.
///
/// Compiled programs and constraints keep a snapshot of the registry taken
/// at compile time. Registering more functions later does not affect them.
///
/// # Example
///
/// ```
/// use assert_dsl::{Env, Value};
/// use serde_json::json;
///
/// let mut env = Env::new();
/// env.register_function("add", |_, args| {
///     Value::Number(args.iter().filter_map(Value::as_f64).sum())
/// })
/// .unwrap();
///
/// let constraint = env.compile_constraint("ALWAYS: add($a, 1) == 3").unwrap();
/// assert!(constraint.evaluate(&json!({"a": 2}), &json!({})));
/// ```
#[derive(Clone)]
pub struct Env {
    functions: Arc<FunctionRegistry>,
    observer: Arc<dyn CompileObserver>,
}

impl Env {
    /// Create a new environment with no functions, logging compile stages
    /// through `tracing`.
    pub fn new() -> Self {
        Self {
            functions: Arc::new(FunctionRegistry::new()),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Register a function (mutable).
    pub fn register(&mut self, function: Function) -> Result<(), Error> {
        Arc::make_mut(&mut self.functions).register(function)
    }

    /// Register a function callable as `name(args...)` or bare as a statement.
    pub fn register_function<F>(&mut self, name: impl Into<String>, f: F) -> Result<(), Error>
    where
        F: Fn(&CallContext<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.register(Function::new(name, f))
    }

    /// Register a zero-argument statement.
    pub fn register_statement<F>(&mut self, name: impl Into<String>, f: F) -> Result<(), Error>
    where
        F: Fn(&CallContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.register(Function::statement(name, f))
    }

    /// Add a function (builder pattern).
    pub fn with_function(mut self, function: Function) -> Result<Self, Error> {
        self.register(function)?;
        Ok(self)
    }

    /// Replace the compile observer (builder pattern).
    pub fn with_observer(mut self, observer: impl CompileObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Get the function registry.
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Compile a bare expression.
    pub fn compile_expression(&self, source: &str) -> Result<Program, Error> {
        let expr = compile_observed(source, 0, &self.functions, self.observer.as_ref())?;
        Ok(Program::new(source, expr, Arc::clone(&self.functions)))
    }

    /// Compile an `<activation>:<condition>` assertion.
    pub fn compile_constraint(&self, assertion: &str) -> Result<Constraint, Error> {
        Constraint::compile_observed(
            assertion,
            Arc::clone(&self.functions),
            self.observer.as_ref(),
        )
    }

    /// Interpolate a message template against the given contexts.
    pub fn render_message(
        &self,
        template: &str,
        model: &dyn Context,
        state: &dyn Context,
    ) -> Result<String, Error> {
        message::render_message(template, model, state, &self.functions)
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("functions", &format!("{} functions", self.functions.len()))
            .finish_non_exhaustive()
    }
}
