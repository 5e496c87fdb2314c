//! Parse result values
//!
//! Combinators produce [`Value`]s: terminals yield their token's value,
//! sequences and repetitions yield a [`Value::List`] of positioned element
//! results, and tagged choices wrap the winner in [`Value::Tagged`].
//! Transformers then reshape these raw values into domain values (numbers,
//! arrays, ordered maps).

use super::source_location::Position;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// A dynamically typed parse value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null/nil value
    #[default]
    Nil,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// String value
    String(String),
    /// Raw output of a sequence or repetition: one result per element
    List(Vec<ParseResult>),
    /// Array of values
    Array(Vec<Value>),
    /// Key-value pairs in source order
    Map(Vec<(String, Value)>),
    /// The winning alternative of a tagged choice
    Tagged {
        /// Name of the alternative that matched
        rule: String,
        /// Its value
        value: Box<Value>,
    },
}

/// A successful parse: where the match began and what it produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    /// Position of the first consumed token
    pub position: Position,
    /// Transformed value
    pub value: Value,
}

impl ParseResult {
    /// Create a result
    #[inline]
    pub fn new(position: Position, value: Value) -> Self {
        Self { position, value }
    }
}

impl Value {
    /// Create a nil value
    pub fn nil() -> Self {
        Value::Nil
    }

    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create an array value
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(items)
    }

    /// Create a map value, keeping the given order
    pub fn map(pairs: Vec<(impl Into<String>, Value)>) -> Self {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap a value with the name of the rule that produced it
    pub fn tagged(rule: impl Into<String>, value: Value) -> Self {
        Value::Tagged {
            rule: rule.into(),
            value: Box::new(value),
        }
    }

    /// Check if this is nil
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the element results of a raw list
    pub fn as_list(&self) -> Option<&[ParseResult]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get as ordered map
    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// The rule name of a tagged value
    pub fn tag(&self) -> Option<&str> {
        match self {
            Value::Tagged { rule, .. } => Some(rule),
            _ => None,
        }
    }

    /// Get a map value by key (first occurrence)
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Get an array or list element by index
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(index),
            Value::List(items) => items.get(index).map(|r| &r.value),
            _ => None,
        }
    }

    /// Take the element results out of a raw list
    pub fn into_list(self) -> Option<Vec<ParseResult>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Take the string out of a string value
    pub fn into_string(self) -> Option<String> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Strip any tags, returning the innermost value
    pub fn untag(self) -> Value {
        let mut value = self;
        while let Value::Tagged { value: inner, .. } = value {
            value = *inner;
        }
        value
    }

    /// Drop element positions: a raw list becomes an array of its values
    pub fn into_values(self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.into_iter().map(|r| r.value).collect()),
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Serialize as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item.value)?;
                }
                write!(f, ")")
            }
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Tagged { rule, value } => write!(f, "{}:{}", rule, value),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&item.value)?;
                }
                seq.end()
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Tagged { rule, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(rule, value)?;
                map.end()
            }
        }
    }
}
