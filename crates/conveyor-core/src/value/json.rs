//! Bridge between `serde_json` documents and [`Value`] graphs

use super::{Record, Value};
use crate::error::{Error, Result};
use crate::types::{ObjectType, TypeDescriptor};
use serde_json::{Map, Number};

/// Object type given to JSON objects
pub const MAP_TYPE: &str = "Map";

impl Value {
    /// Build a value graph from a JSON document.
    ///
    /// Objects become [`Record`]s of type `Map` with writable fields declared
    /// `unknown`; arrays become lists.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let record = map.into_iter().fold(
                    Record::new(ObjectType::new(MAP_TYPE)),
                    |record, (key, value)| {
                        record.with(key, TypeDescriptor::Unknown, Value::from_json(value))
                    },
                );
                Value::object(record)
            }
        }
    }

    /// Render the value graph as JSON.
    ///
    /// Objects contribute their readable properties. Non-finite floats become
    /// `null`, bytes become arrays of numbers.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let json = match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => serde_json::Value::Array(
                bytes.iter().map(|b| serde_json::Value::Number((*b).into())).collect(),
            ),
            Value::Array(array) => serde_json::Value::Array(
                array.items().iter().map(Value::to_json).collect::<Result<_>>()?,
            ),
            Value::List(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Result<_>>()?,
            ),
            Value::Object(object) => {
                let mut map = Map::new();
                for property in object.properties().into_iter().filter(|p| p.readable) {
                    let value = object.read(&property.name).map_err(Error::from)?;
                    map.insert(property.name, value.to_json()?);
                }
                serde_json::Value::Object(map)
            }
        };
        Ok(json)
    }

    /// Parse JSON text into a value graph
    pub fn parse_json(text: &str) -> Result<Value> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from_json(json))
    }
}
