//! Request parameter values
//!
//! Enforcement requests carry subject, object, action and context values of
//! arbitrary shape. Only plain strings take part in cache keys; every other
//! variant is passed to the engine untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single enforcement request parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestValue {
    /// Plain string (subject, object, action, domain ...)
    Str(String),

    /// Integer attribute
    Int(i64),

    /// Floating point attribute
    Float(f64),

    /// Boolean attribute
    Bool(bool),

    /// Structured attribute (ABAC subject/object records and the like)
    Json(serde_json::Value),
}

impl RequestValue {
    /// Borrow the string content when this is a `Str`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value can take part in a cache key
    pub fn is_str(&self) -> bool {
        matches!(self, RequestValue::Str(_))
    }
}

impl fmt::Display for RequestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestValue::Str(s) => write!(f, "{}", s),
            RequestValue::Int(i) => write!(f, "{}", i),
            RequestValue::Float(v) => write!(f, "{}", v),
            RequestValue::Bool(b) => write!(f, "{}", b),
            RequestValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for RequestValue {
    fn from(s: &str) -> Self {
        RequestValue::Str(s.to_string())
    }
}

impl From<String> for RequestValue {
    fn from(s: String) -> Self {
        RequestValue::Str(s)
    }
}

impl From<&String> for RequestValue {
    fn from(s: &String) -> Self {
        RequestValue::Str(s.clone())
    }
}

impl From<i64> for RequestValue {
    fn from(i: i64) -> Self {
        RequestValue::Int(i)
    }
}

impl From<i32> for RequestValue {
    fn from(i: i32) -> Self {
        RequestValue::Int(i64::from(i))
    }
}

impl From<f64> for RequestValue {
    fn from(v: f64) -> Self {
        RequestValue::Float(v)
    }
}

impl From<bool> for RequestValue {
    fn from(b: bool) -> Self {
        RequestValue::Bool(b)
    }
}

impl From<serde_json::Value> for RequestValue {
    fn from(v: serde_json::Value) -> Self {
        RequestValue::Json(v)
    }
}
