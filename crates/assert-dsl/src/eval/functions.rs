//! Function implementations and registry for assertion evaluation.
//!
//! Every identifier the compiler accepts names a function in this registry.
//! Called with brackets it is a function call; referenced bare it is a
//! statement, invoked with no arguments. Either way the implementation can
//! read the model and state contexts through its [`CallContext`].

use std::collections::HashMap;
use std::sync::Arc;

use assert_dsl_parser::grammar::{is_identifier, is_keyword};
use assert_dsl_parser::FunctionNames;

use super::{Context, Value};
use crate::Error;

/// A function implementation that takes arguments and returns a value.
///
/// The implementation receives already-evaluated arguments, left to right.
pub type FunctionImpl = Arc<dyn Fn(&CallContext<'_>, &[Value]) -> Value + Send + Sync>;

/// The contexts of the evaluation a function is called from.
#[derive(Clone, Copy)]
pub struct CallContext<'a> {
    pub model: &'a dyn Context,
    pub state: &'a dyn Context,
}

impl<'a> CallContext<'a> {
    pub fn new(model: &'a dyn Context, state: &'a dyn Context) -> Self {
        Self { model, state }
    }
}

/// A named function with its implementation.
#[derive(Clone)]
pub struct Function {
    /// The function name.
    pub name: String,
    /// The implementation function.
    pub implementation: FunctionImpl,
}

impl Function {
    /// Create a new function.
    pub fn new<F>(name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&CallContext<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            implementation: Arc::new(implementation),
        }
    }

    /// Create a statement: a function that ignores its arguments.
    pub fn statement<F>(name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&CallContext<'_>) -> Value + Send + Sync + 'static,
    {
        Self::new(name, move |ctx, _args| implementation(ctx))
    }

    /// Call this function with the given arguments.
    pub fn call(&self, ctx: &CallContext<'_>, args: &[Value]) -> Value {
        (self.implementation)(ctx, args)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry of all functions available during compilation and evaluation.
///
/// Registration is append-only: a name can be added once and never removed.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Function>,
}

impl FunctionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function.
    ///
    /// Fails without modifying the registry if the name is taken, is not an
    /// identifier, or is `ALWAYS`/`WHEN`.
    pub fn register(&mut self, function: Function) -> Result<(), Error> {
        if !is_identifier(&function.name) || is_keyword(&function.name) {
            return Err(Error::InvalidFunctionName {
                name: function.name,
            });
        }
        if self.functions.contains_key(&function.name) {
            return Err(Error::DuplicateFunction {
                name: function.name,
            });
        }
        self.functions.insert(function.name.clone(), function);
        Ok(())
    }

    /// Get a function by name.
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Check if a function exists.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Get the number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Iterate over all functions.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Function)> {
        self.functions.iter()
    }
}

impl FunctionNames for FunctionRegistry {
    fn is_registered(&self, name: &str) -> bool {
        self.contains(name)
    }
}
