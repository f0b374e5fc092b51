//! Runtime values for assertion evaluation.
//!
//! Expressions work over four kinds of data: strings, numbers, booleans
//! produced by operators, and opaque references to whatever a context
//! returned (arrays and objects). `Missing` stands for a path or function
//! that resolved to nothing.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// An assertion runtime value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Nothing was found. Never equal to anything, including itself.
    #[default]
    Missing,
    Null,
    Bool(bool),
    Number(f64),
    /// Unicode string (Arc for cheap cloning).
    String(Arc<str>),
    /// An array or object from a context, kept as-is.
    Ref(Arc<serde_json::Value>),
}

impl Value {
    /// Convert a JSON value, keeping arrays and objects opaque.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Missing, Value::Number),
            serde_json::Value::String(s) => Value::String(Arc::from(s.as_str())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Value::Ref(Arc::new(json.clone()))
            }
        }
    }

    /// Convert back to JSON. `Missing` and non-finite numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Missing | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                serde_json::Value::from(*n as i64)
            }
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Ref(json) => json.as_ref().clone(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Truthiness used by `&&`, `||`, activations and conditions.
    ///
    /// `Missing`, `null`, `false`, `0`, `NaN` and the empty string are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Missing | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Ref(_) => true,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the type name for error messages and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Missing => "missing",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Ref(json) if json.is_array() => "array",
            Value::Ref(_) => "object",
        }
    }

    /// Equality as the `==` operator sees it.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Missing, _) | (_, Value::Missing) => false,
            _ => self == other,
        }
    }

    /// Ordering as `<`, `<=`, `>` and `>=` see it. Only numbers with numbers
    /// and strings with strings are ordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Structural equality; unlike [`Value::equals`], `Missing == Missing`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => a == b,
            _ => false,
        }
    }
}

/// Renders values the way messages show them: integral numbers without a
/// fractional part, strings raw, arrays and objects as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Ref(json) => write!(f, "{}", json),
        }
    }
}

// Conversion traits

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Value::Ref(Arc::new(json))
            }
            other => Value::from_json(&other),
        }
    }
}
