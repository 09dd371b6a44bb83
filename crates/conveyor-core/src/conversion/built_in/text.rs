//! String conversions

use crate::conversion::{Conversion, UnitState};
use crate::types::TypeDescriptor;
use crate::value::Value;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Numeric type produced by [`StringToNumber`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    #[default]
    Integer,
    Float,
    /// Integer when the text is integral, float otherwise
    Number,
}

impl NumberKind {
    fn descriptor(self) -> TypeDescriptor {
        match self {
            NumberKind::Integer => TypeDescriptor::Integer,
            NumberKind::Float => TypeDescriptor::Float,
            NumberKind::Number => TypeDescriptor::Number,
        }
    }
}

/// Parses text into a number; the generated type follows the configured kind
#[derive(Debug, Default)]
pub struct StringToNumber {
    kind: NumberKind,
    state: UnitState,
}

impl StringToNumber {
    pub fn new(kind: NumberKind) -> Self {
        Self {
            kind,
            state: UnitState::new(),
        }
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: NumberKind) {
        self.kind = kind;
        self.state.invalidate();
    }
}

impl Conversion for StringToNumber {
    fn id(&self) -> &'static str {
        "string-to-number"
    }

    fn accepts(&self) -> TypeDescriptor {
        TypeDescriptor::Text
    }

    fn generates(&self) -> TypeDescriptor {
        self.kind.descriptor()
    }

    fn state(&self) -> &UnitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    fn transform(&mut self, input: Value) -> anyhow::Result<Value> {
        let Some(text) = input.as_str() else {
            bail!("expected a string, got {}", input.type_descriptor());
        };
        let text = text.trim();
        let value = match self.kind {
            NumberKind::Integer => Value::Integer(
                i64::from_str(text).with_context(|| format!("'{}' is not an integer", text))?,
            ),
            NumberKind::Float => Value::Float(
                f64::from_str(text).with_context(|| format!("'{}' is not a number", text))?,
            ),
            NumberKind::Number => match i64::from_str(text) {
                Ok(i) => Value::Integer(i),
                Err(_) => Value::Float(
                    f64::from_str(text).with_context(|| format!("'{}' is not a number", text))?,
                ),
            },
        };
        Ok(value)
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        Box::new(StringToNumber::new(self.kind))
    }
}

/// Target case of [`ChangeCase`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    #[default]
    Upper,
    Lower,
}

/// Upper- or lower-cases text
#[derive(Debug, Default)]
pub struct ChangeCase {
    case: Case,
    state: UnitState,
}

impl ChangeCase {
    pub fn new(case: Case) -> Self {
        Self {
            case,
            state: UnitState::new(),
        }
    }

    pub fn case(&self) -> Case {
        self.case
    }

    pub fn set_case(&mut self, case: Case) {
        self.case = case;
        self.state.invalidate();
    }
}

impl Conversion for ChangeCase {
    fn id(&self) -> &'static str {
        "change-case"
    }

    fn accepts(&self) -> TypeDescriptor {
        TypeDescriptor::Text
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
        let Some(text) = input.as_str() else {
            bail!("expected a string, got {}", input.type_descriptor());
        };
        let changed = match self.case {
            Case::Upper => text.to_uppercase(),
            Case::Lower => text.to_lowercase(),
        };
        Ok(Value::Text(changed))
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        Box::new(ChangeCase::new(self.case))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::DiagnosticKind;

    #[test]
    fn test_string_to_number_kinds() {
        let mut unit = StringToNumber::new(NumberKind::Integer);
        unit.set_input(Value::text(" 42 "));
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::Integer(42)));

        unit.set_kind(NumberKind::Float);
        assert_eq!(unit.generates(), TypeDescriptor::Float);
        unit.set_input(Value::text("2.5"));
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::Float(2.5)));

        unit.set_kind(NumberKind::Number);
        unit.set_input(Value::text("7"));
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_string_to_number_failure_names_types() {
        let mut unit = StringToNumber::default();
        unit.set_input(Value::text("forty-two"));
        let diagnostic = unit.convert().unwrap_err();
        assert_eq!(diagnostic.kind(), DiagnosticKind::Transform);
        let message = diagnostic.to_string();
        assert!(message.contains("string"));
        assert!(message.contains("integer"));
        assert!(message.contains("forty-two"));
        assert!(unit.output().is_none());
    }

    #[test]
    fn test_set_kind_invalidates_output() {
        let mut unit = StringToNumber::default();
        unit.set_input(Value::text("1"));
        unit.convert().unwrap();
        assert!(unit.has_output());

        unit.set_kind(NumberKind::Float);
        assert!(!unit.has_output());
    }

    #[test]
    fn test_change_case() {
        let mut unit = ChangeCase::new(Case::Upper);
        unit.set_input(Value::text("Mixed"));
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::text("MIXED")));

        unit.set_case(Case::Lower);
        unit.set_input(Value::text("Mixed"));
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::text("mixed")));
    }

    #[test]
    fn test_change_case_rejects_numbers() {
        let mut unit = ChangeCase::default();
        unit.set_input(Value::from(3));
        let diagnostic = unit.convert().unwrap_err();
        assert_eq!(diagnostic.kind(), DiagnosticKind::InputValidation);
    }
}
