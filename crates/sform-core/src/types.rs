//! # Schema Types
//!
//! The JSON Schema primitive type set and the rule form renderers use to
//! read a node's effective type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SformError;

/// A JSON Schema primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl SchemaType {
    /// All types, in keyword order.
    pub const ALL: [SchemaType; 7] = [
        SchemaType::Object,
        SchemaType::Array,
        SchemaType::String,
        SchemaType::Number,
        SchemaType::Integer,
        SchemaType::Boolean,
        SchemaType::Null,
    ];

    /// The keyword spelling of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }

    /// Effective type of a schema node.
    ///
    /// A missing `type`, an empty type list, or an unrecognized name all
    /// read as `string`. A type list reads as its first entry.
    pub fn of(schema: &Value) -> Self {
        let name = match schema.get("type") {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Array(list)) => list.first().and_then(Value::as_str),
            _ => None,
        };
        name.and_then(|n| n.parse().ok()).unwrap_or(Self::String)
    }

    /// Scalar types: everything except `object` and `array`.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Object | Self::Array)
    }

    /// Whether this is `number` or `integer`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }

    /// The JSON type of a data value. Whole numbers read as `integer`,
    /// including floats with a zero fraction (`3.0`).
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n)
                if n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0) =>
            {
                Self::Integer
            }
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = SformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SformError::InvalidSchema(format!("unknown schema type '{s}'")))
    }
}
