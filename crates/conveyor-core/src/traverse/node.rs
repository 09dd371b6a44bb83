//! Nodes handed to traversal observers

use crate::path::{write_step, PropertyPath};
use crate::value::{AccessError, ObjectRef, PropertyDescriptor, Value};

/// A visited location in an object graph
#[derive(Debug, Clone)]
pub struct Node {
    pub(super) path: PropertyPath,
    pub(super) property: Option<PropertyDescriptor>,
    pub(super) parent: Option<ObjectRef>,
    pub(super) value: Value,
}

impl Node {
    pub(super) fn root(value: Value) -> Self {
        Self {
            path: PropertyPath::root(),
            property: None,
            parent: None,
            value,
        }
    }

    /// Location relative to the traversal root
    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    /// Accessor metadata of the property holding the value; `None` for the root
    pub fn property(&self) -> Option<&PropertyDescriptor> {
        self.property.as_ref()
    }

    /// Object owning the property; `None` for the root
    pub fn parent(&self) -> Option<&ObjectRef> {
        self.parent.as_ref()
    }

    /// Value at the time of the visit
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether the node is an element of an array or list
    pub fn is_element(&self) -> bool {
        self.path.last().map_or(false, |step| step.is_indexed())
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Replace the value through the accessor that produced it
    pub fn write_back(&self, value: Value) -> Result<(), AccessError> {
        write_back(self, value)
    }
}

/// Write `value` to the location of `node`.
///
/// Plain properties go through the parent's setter. Elements are written by
/// reading the array or list, setting the element and writing the container
/// back through the setter, so setter checks always apply.
pub fn write_back(node: &Node, value: Value) -> Result<(), AccessError> {
    match (&node.parent, node.path.last()) {
        (Some(parent), Some(step)) => write_step(parent, step, value),
        _ => Err(AccessError::failed("the root of a traversal cannot be replaced")),
    }
}
