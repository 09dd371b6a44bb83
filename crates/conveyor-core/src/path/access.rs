//! Reading and writing the value a path points at

use super::{PathStep, PropertyPath};
use crate::value::{AccessError, ObjectRef, Value};

/// Read the value `step` designates on `object`
pub(crate) fn read_step(object: &ObjectRef, step: &PathStep) -> Result<Value, AccessError> {
    let value = object.read(&step.name)?;
    match step.index {
        None => Ok(value),
        Some(index) => element(&step.name, &value, index).cloned(),
    }
}

/// Write `value` to the location `step` designates on `object`.
///
/// Indexed steps read the container, replace the element and write the
/// container back through the property's setter.
pub(crate) fn write_step(object: &ObjectRef, step: &PathStep, value: Value) -> Result<(), AccessError> {
    let Some(index) = step.index else {
        return object.write(&step.name, value);
    };

    let mut container = object.read(&step.name)?;
    match &mut container {
        Value::Array(array) => array.set(index, value).map_err(|e| name_error(e, &step.name))?,
        Value::List(items) => {
            let length = items.len();
            let slot = items.get_mut(index).ok_or_else(|| AccessError::IndexOutOfBounds {
                name: step.name.clone(),
                index,
                length,
            })?;
            *slot = value;
        }
        other => {
            return Err(AccessError::NotIndexable {
                name: step.name.clone(),
                found: other.type_descriptor(),
            })
        }
    }
    object.write(&step.name, container)
}

fn element<'v>(name: &str, value: &'v Value, index: usize) -> Result<&'v Value, AccessError> {
    let items = value.elements().ok_or_else(|| AccessError::NotIndexable {
        name: name.to_string(),
        found: value.type_descriptor(),
    })?;
    items.get(index).ok_or_else(|| AccessError::IndexOutOfBounds {
        name: name.to_string(),
        index,
        length: items.len(),
    })
}

/// Attach the property name to errors raised by a bare container
fn name_error(error: AccessError, name: &str) -> AccessError {
    match error {
        AccessError::IndexOutOfBounds { index, length, .. } => AccessError::IndexOutOfBounds {
            name: name.to_string(),
            index,
            length,
        },
        AccessError::TypeMismatch {
            expected, found, ..
        } => AccessError::TypeMismatch {
            name: name.to_string(),
            expected,
            found,
        },
        other => other,
    }
}

fn as_object(value: &Value) -> Result<&ObjectRef, AccessError> {
    value.as_object().ok_or_else(|| AccessError::NotAnObject {
        found: value.type_descriptor(),
    })
}

impl PropertyPath {
    /// Value at this path below `root`; the root path yields `root` itself
    pub fn resolve(&self, root: &Value) -> Result<Value, AccessError> {
        let mut current = root.clone();
        for step in &self.steps {
            current = read_step(as_object(&current)?, step)?;
        }
        Ok(current)
    }

    /// Replace the value at this path below `root`.
    ///
    /// Every step but the last must resolve to an object. The root itself
    /// cannot be replaced.
    pub fn assign(&self, root: &Value, value: Value) -> Result<(), AccessError> {
        let (last, init) = self
            .steps
            .split_last()
            .ok_or_else(|| AccessError::failed("cannot assign to the root of a graph"))?;
        let parent = PropertyPath::from_steps(init.to_vec()).resolve(root)?;
        write_step(as_object(&parent)?, last, value)
    }
}
