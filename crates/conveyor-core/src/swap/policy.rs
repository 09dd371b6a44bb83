//! Swap policies deciding which values get replaced

use crate::path::PropertyPath;
use crate::traverse::Node;
use crate::types::TypeDescriptor;
use crate::value::{AccessError, Value};
use std::fmt;

/// Decides whether a visited value is replaced, and replaces it
pub trait SwapPolicy: fmt::Debug + Send + Sync {
    fn can_swap(&self, node: &Node) -> bool;

    /// Write the replacement through the node's accessor
    fn perform_swap(&self, node: &Node) -> Result<(), AccessError>;

    fn box_clone(&self) -> Box<dyn SwapPolicy>;
}

impl Clone for Box<dyn SwapPolicy> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Replaces every value whose runtime type is assignable to `target`.
///
/// The root of the traversal is never replaced. Null slots are only
/// replaced when `target` is the null type itself.
#[derive(Debug, Clone)]
pub struct TypeSwap {
    target: TypeDescriptor,
    replacement: Value,
}

impl TypeSwap {
    pub fn new(target: TypeDescriptor, replacement: impl Into<Value>) -> Self {
        Self {
            target,
            replacement: replacement.into(),
        }
    }

    pub fn target(&self) -> &TypeDescriptor {
        &self.target
    }

    pub fn replacement(&self) -> &Value {
        &self.replacement
    }
}

impl SwapPolicy for TypeSwap {
    fn can_swap(&self, node: &Node) -> bool {
        if node.is_root() {
            return false;
        }
        match node.value() {
            Value::Null => self.target == TypeDescriptor::Null,
            value => value.is_instance_of(&self.target),
        }
    }

    fn perform_swap(&self, node: &Node) -> Result<(), AccessError> {
        // each location gets its own copy so replaced objects are not shared
        node.write_back(self.replacement.deep_copy())
    }

    fn box_clone(&self) -> Box<dyn SwapPolicy> {
        Box::new(self.clone())
    }
}

/// Replaces the value at one path
#[derive(Debug, Clone)]
pub struct PathSwap {
    path: PropertyPath,
    replacement: Value,
}

impl PathSwap {
    pub fn new(path: PropertyPath, replacement: impl Into<Value>) -> Self {
        Self {
            path,
            replacement: replacement.into(),
        }
    }

    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    pub fn replacement(&self) -> &Value {
        &self.replacement
    }
}

impl SwapPolicy for PathSwap {
    fn can_swap(&self, node: &Node) -> bool {
        node.path() == &self.path
    }

    fn perform_swap(&self, node: &Node) -> Result<(), AccessError> {
        node.write_back(self.replacement.deep_copy())
    }

    fn box_clone(&self) -> Box<dyn SwapPolicy> {
        Box::new(self.clone())
    }
}
