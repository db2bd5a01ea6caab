//! Cache key derivation.
//!
//! Keys have the shape `<operation>:<arg1>:<arg2>...`. Arguments are
//! positional and rendered verbatim apart from reserved characters, which
//! are percent-escaped so a string argument can never forge a separator or
//! a glob metacharacter.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::core::error::{CacheError, Result};

const SEPARATOR: char = ':';
/// Operation id whose keyspace holds hotness markers (`hot:<key>`)
pub(crate) const HOTNESS_NAMESPACE: &str = "hot";
const RESERVED: &[char] = &[':', '*', '?', '[', ']', '\\', '%'];

/// Positional argument of a cached operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Convert a JSON value, rejecting arrays and objects
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Scalar::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Scalar::Float(f))
                } else {
                    Err(CacheError::InvalidArgument(format!(
                        "number {} does not fit a key argument",
                        n
                    )))
                }
            }
            Value::String(s) => Ok(Scalar::Str(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(CacheError::InvalidArgument(format!(
                "non-scalar key argument: {}",
                value
            ))),
        }
    }

    fn render(&self, out: &mut String) -> Result<()> {
        match self {
            Scalar::Null => out.push_str("null"),
            Scalar::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Scalar::Int(i) => out.push_str(&i.to_string()),
            Scalar::Float(f) => {
                if !f.is_finite() {
                    return Err(CacheError::InvalidArgument(format!(
                        "non-finite float {} cannot be part of a key",
                        f
                    )));
                }
                // Debug keeps the fractional part, so 2.0 renders as "2.0"
                out.push_str(&format!("{:?}", f));
            }
            Scalar::Str(s) => {
                for c in s.chars() {
                    if RESERVED.contains(&c) {
                        out.push_str(&format!("%{:02X}", c as u32));
                    } else {
                        out.push(c);
                    }
                }
            }
        }
        Ok(())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

/// Identity of a cached result
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Deterministic `(operation, args) -> CacheKey` derivation
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyBuilder;

impl KeyBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the key for an operation and its positional arguments
    pub fn build(&self, operation_id: &str, args: &[Scalar]) -> Result<CacheKey> {
        Self::validate_operation(operation_id)?;

        let mut key = String::with_capacity(operation_id.len() + args.len() * 8);
        key.push_str(operation_id);
        for arg in args {
            key.push(SEPARATOR);
            arg.render(&mut key)?;
        }

        Ok(CacheKey(key))
    }

    /// Build a key from raw JSON arguments
    pub fn build_json(&self, operation_id: &str, args: &[Value]) -> Result<CacheKey> {
        let scalars = args
            .iter()
            .map(Scalar::from_json)
            .collect::<Result<Vec<_>>>()?;
        self.build(operation_id, &scalars)
    }

    fn validate_operation(operation_id: &str) -> Result<()> {
        if operation_id.is_empty() {
            return Err(CacheError::InvalidArgument(
                "operation id must not be empty".to_string(),
            ));
        }
        if let Some(c) = operation_id
            .chars()
            .find(|c| RESERVED.contains(c) || c.is_whitespace())
        {
            return Err(CacheError::InvalidArgument(format!(
                "operation id '{}' contains reserved character '{}'",
                operation_id, c
            )));
        }
        if operation_id == HOTNESS_NAMESPACE {
            return Err(CacheError::InvalidArgument(format!(
                "operation id '{}' is reserved for hotness markers",
                operation_id
            )));
        }
        Ok(())
    }
}
