//! Decoding of literal values.

use gqlc_core::Interner;
use gqlc_syntax::ast;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A literal argument or default value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An explicit `null`, distinct from an absent value.
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    /// Enum values keep their raw name.
    Enum(String),
    List(Vec<Value>),
    Object(IndexMap<String, Value>),
    Variable { name: String },
}

impl Value {
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable { .. })
    }
}

/// Converts a syntax value. Duplicate object keys keep the last value.
pub fn decode_value(value: &ast::Value, interner: &Interner) -> Value {
    match value {
        ast::Value::Variable(name) => Value::Variable {
            name: interner.get(name.value),
        },
        ast::Value::Int(n, _) => Value::Int(*n),
        ast::Value::Float(n, _) => Value::Float(*n),
        ast::Value::String(s, _) => Value::String(s.clone()),
        ast::Value::Boolean(b, _) => Value::Boolean(*b),
        ast::Value::Null(_) => Value::Null,
        ast::Value::Enum(name) => Value::Enum(interner.get(name.value)),
        ast::Value::List(items, _) => {
            Value::List(items.iter().map(|item| decode_value(item, interner)).collect())
        }
        ast::Value::Object(fields, _) => {
            let mut map = IndexMap::with_capacity(fields.len());
            for (name, value) in fields {
                map.insert(interner.get(name.value), decode_value(value, interner));
            }
            Value::Object(map)
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::String(s) | Self::Enum(s) => serializer.serialize_str(s),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::List(items) => items.serialize(serializer),
            Self::Object(fields) => fields.serialize(serializer),
            Self::Variable { name } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "Variable")?;
                map.serialize_entry("variableName", name)?;
                map.end()
            }
        }
    }
}
