//! Function name lookup used to tell calls and statements apart from plain text.
//!
//! Whether `ready` is a statement reference or garbage depends on what was
//! registered at runtime, so the tokenizer and compiler always receive the
//! name set explicitly.

use std::collections::{BTreeSet, HashSet};

use crate::error::DuplicateFunctionError;

/// Membership test over registered function names.
pub trait FunctionNames {
    /// Returns true if `name` is a registered function.
    fn is_registered(&self, name: &str) -> bool;
}

/// An insertion-ordered set of unique function names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRegistry {
    names: Vec<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name. Fails without modifying the registry if it is already present.
    pub fn register(&mut self, name: impl Into<String>) -> Result<(), DuplicateFunctionError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(DuplicateFunctionError { name });
        }
        self.names.push(name);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self, DuplicateFunctionError> {
        self.register(name)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl FunctionNames for NameRegistry {
    fn is_registered(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl FunctionNames for HashSet<String> {
    fn is_registered(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl FunctionNames for BTreeSet<String> {
    fn is_registered(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl FunctionNames for [&str] {
    fn is_registered(&self, name: &str) -> bool {
        self.contains(&name)
    }
}

impl<const N: usize> FunctionNames for [&str; N] {
    fn is_registered(&self, name: &str) -> bool {
        self.contains(&name)
    }
}

impl<T: FunctionNames + ?Sized> FunctionNames for &T {
    fn is_registered(&self, name: &str) -> bool {
        (**self).is_registered(name)
    }
}
