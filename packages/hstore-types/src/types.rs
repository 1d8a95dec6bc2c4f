//! Type definitions and utilities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hstore::HStore;

/// Value representation for entity attributes and hstore entries.
///
/// This enum can hold any value that corresponds to a [`Type`] variant.
/// Hstore entries hold values verbatim; coercion happens only through a
/// field type's `clean`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent / SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Nested key-value map (the backing column itself)
    HStore(HStore),
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for the values a form would treat as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::HStore(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Converts this value into a `serde_json::Value`.
    ///
    /// Non-finite floats become JSON `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::HStore(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<HStore> for Value {
    fn from(value: HStore) -> Self {
        Value::HStore(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::HStore(map) => write!(f, "{}", hstore_literal(map)),
        }
    }
}

fn hstore_literal(map: &HStore) -> String {
    map.iter()
        .map(|(k, v)| match v {
            Value::Null => format!("\"{k}\"=>NULL"),
            other => format!("\"{k}\"=>\"{other}\""),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Storage types a field can map to.
///
/// Each variant corresponds to a database column type. The hstore column is
/// the only type able to back virtual fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    /// Boolean value
    Boolean,
    /// 32-bit integer column
    Integer,
    /// 64-bit integer column
    BigInteger,
    /// Double precision float
    Float,
    /// Bounded string (requires `max_length`)
    Char,
    /// Unbounded string
    Text,
    /// String-keyed map column
    HStore,
}

impl Type {
    /// Returns the database column type for this type.
    ///
    /// `max_length` is only used by `Type::Char`.
    pub fn db_type(&self, max_length: Option<usize>) -> String {
        match self {
            Type::Boolean => "boolean".to_string(),
            Type::Integer => "integer".to_string(),
            Type::BigInteger => "bigint".to_string(),
            Type::Float => "double precision".to_string(),
            Type::Char => match max_length {
                Some(n) => format!("varchar({n})"),
                None => "varchar".to_string(),
            },
            Type::Text => "text".to_string(),
            Type::HStore => "hstore".to_string(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => write!(f, "boolean"),
            Type::Integer => write!(f, "integer"),
            Type::BigInteger => write!(f, "big_integer"),
            Type::Float => write!(f, "float"),
            Type::Char => write!(f, "char"),
            Type::Text => write!(f, "text"),
            Type::HStore => write!(f, "hstore"),
        }
    }
}
