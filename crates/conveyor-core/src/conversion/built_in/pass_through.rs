//! Type-agnostic units

use crate::conversion::{Conversion, UnitState};
use crate::types::TypeDescriptor;
use crate::value::Value;
use anyhow::Context;

/// Forwards its input unchanged
#[derive(Debug, Default)]
pub struct PassThrough {
    state: UnitState,
}

impl PassThrough {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Conversion for PassThrough {
    fn id(&self) -> &'static str {
        "pass-through"
    }

    fn accepts(&self) -> TypeDescriptor {
        TypeDescriptor::Unknown
    }

    fn generates(&self) -> TypeDescriptor {
        TypeDescriptor::Unknown
    }

    fn state(&self) -> &UnitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    fn transform(&mut self, input: Value) -> anyhow::Result<Value> {
        Ok(input)
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        Box::new(PassThrough::new())
    }
}

/// Renders any value as a string.
///
/// Scalars use their display form; containers and objects are rendered as
/// compact JSON.
#[derive(Debug, Default)]
pub struct AnyToString {
    state: UnitState,
}

impl AnyToString {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Conversion for AnyToString {
    fn id(&self) -> &'static str {
        "any-to-string"
    }

    fn accepts(&self) -> TypeDescriptor {
        TypeDescriptor::Unknown
    }

    fn generates(&self) -> TypeDescriptor {
        TypeDescriptor::Text
    }

    fn state(&self) -> &UnitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    fn transform(&mut self, input: Value) -> anyhow::Result<Value> {
        let text = match input {
            Value::Text(s) => s,
            Value::Array(_) | Value::List(_) | Value::Object(_) | Value::Bytes(_) => {
                let json = input.to_json().context("cannot render value as JSON")?;
                json.to_string()
            }
            scalar => scalar.to_string(),
        };
        Ok(Value::Text(text))
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        Box::new(AnyToString::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectType;
    use crate::value::Record;

    #[test]
    fn test_pass_through_forwards_input() {
        let mut unit = PassThrough::new();
        unit.set_input(Value::from(7));
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_any_to_string_scalars() {
        let mut unit = AnyToString::new();
        for (input, expected) in [
            (Value::from(12), "12"),
            (Value::from(true), "true"),
            (Value::from(0.5), "0.5"),
            (Value::text("as is"), "as is"),
        ] {
            unit.set_input(input);
            unit.convert().unwrap();
            assert_eq!(unit.output(), Some(&Value::text(expected)));
        }
    }

    #[test]
    fn test_any_to_string_objects_as_json() {
        let record = Record::new(ObjectType::new("Point")).with("x", TypeDescriptor::Integer, 1);
        let mut unit = AnyToString::new();
        unit.set_input(record.into());
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::text(r#"{"x":1}"#)));
    }
}
