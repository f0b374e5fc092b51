//! Model and state lookup for assertion evaluation.
//!
//! `$a.b` reads from the model context and `#a.b` from the state context.
//! A context resolves a dotted path to a value; anything it cannot find is
//! `Missing`, never an error.

use std::collections::HashMap;
use std::sync::Arc;

use assert_dsl_parser::Path;

use super::Value;

/// Trait for resolving data paths during evaluation.
pub trait Context: Send + Sync {
    /// Resolve a path. The root path denotes the whole object.
    fn lookup(&self, path: &Path) -> Value;
}

/// Walk `segments` through nested JSON. Objects are indexed by key and
/// arrays by decimal position.
pub(crate) fn walk(json: &serde_json::Value, segments: &[String]) -> Value {
    let mut current = json;
    for segment in segments {
        let next = match current {
            serde_json::Value::Object(map) => map.get(segment),
            serde_json::Value::Array(items) => {
                segment.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Value::Missing,
        }
    }
    Value::from_json(current)
}

/// Every array or object a lookup returns is copied out of the document,
/// including the whole document for the root path. Use [`JsonContext`]
/// when the root is read often.
impl Context for serde_json::Value {
    fn lookup(&self, path: &Path) -> Value {
        walk(self, path.segments())
    }
}

/// A JSON document held behind an `Arc`.
///
/// The root path hands out the shared document without copying it. Nested
/// arrays and objects are copied as with a plain `serde_json::Value`.
#[derive(Debug, Clone)]
pub struct JsonContext(Arc<serde_json::Value>);

impl JsonContext {
    pub fn new(json: impl Into<Arc<serde_json::Value>>) -> Self {
        Self(json.into())
    }

    /// The shared document.
    pub fn document(&self) -> &Arc<serde_json::Value> {
        &self.0
    }
}

impl From<serde_json::Value> for JsonContext {
    fn from(json: serde_json::Value) -> Self {
        Self::new(json)
    }
}

impl Context for JsonContext {
    fn lookup(&self, path: &Path) -> Value {
        match self.0.as_ref() {
            serde_json::Value::Array(_) | serde_json::Value::Object(_) if path.is_root() => {
                Value::Ref(Arc::clone(&self.0))
            }
            json => walk(json, path.segments()),
        }
    }
}

/// A context backed by a HashMap of top-level bindings.
///
/// Paths longer than one segment continue into the bound value when it is
/// an array or object. The root path resolves to an object of every
/// binding that is not `Missing`.
#[derive(Debug, Clone, Default)]
pub struct MapContext {
    bindings: HashMap<String, Value>,
}

impl MapContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), value.into());
    }

    /// Add a binding (builder pattern).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Remove a binding.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MapContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            bindings: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Context for MapContext {
    fn lookup(&self, path: &Path) -> Value {
        let Some((first, rest)) = path.segments().split_first() else {
            let object = self
                .bindings
                .iter()
                .filter(|(_, value)| !value.is_missing())
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect();
            return Value::Ref(Arc::new(serde_json::Value::Object(object)));
        };
        match (self.bindings.get(first), rest.is_empty()) {
            (Some(value), true) => value.clone(),
            (Some(Value::Ref(json)), false) => walk(json, rest),
            _ => Value::Missing,
        }
    }
}

/// A context with no data. Every lookup is `Missing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyContext;

impl Context for EmptyContext {
    fn lookup(&self, _path: &Path) -> Value {
        Value::Missing
    }
}

impl<T: Context + ?Sized> Context for &T {
    fn lookup(&self, path: &Path) -> Value {
        (**self).lookup(path)
    }
}

impl<T: Context + ?Sized> Context for Arc<T> {
    fn lookup(&self, path: &Path) -> Value {
        (**self).lookup(path)
    }
}

impl<T: Context + ?Sized> Context for Box<T> {
    fn lookup(&self, path: &Path) -> Value {
        (**self).lookup(path)
    }
}
