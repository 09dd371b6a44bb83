//! Introspection contract for traversable objects

use super::Value;
use crate::types::{ObjectType, TypeDescriptor};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// An object whose properties can be enumerated, read and written by name.
///
/// This is the explicit replacement for runtime reflection: a domain type
/// lists its properties and routes reads and writes itself. [`Record`](super::Record)
/// is the generic implementation.
pub trait Bean: fmt::Debug + Send + Sync {
    /// Nominal type of the object
    fn object_type(&self) -> ObjectType;

    /// Accessor metadata, in a stable declaration order
    fn properties(&self) -> Vec<PropertyDescriptor>;

    /// Read a property through its getter
    fn read(&self, name: &str) -> Result<Value, AccessError>;

    /// Write a property through its setter
    fn write(&mut self, name: &str, value: Value) -> Result<(), AccessError>;

    /// Independent copy, deep-copying every property value
    fn deep_copy(&self) -> Box<dyn Bean>;
}

/// Accessor metadata of a single property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    /// Type the setter accepts
    pub declared: TypeDescriptor,
    pub readable: bool,
    pub writable: bool,
}

impl PropertyDescriptor {
    /// Readable and writable property
    pub fn new(name: impl Into<String>, declared: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            declared,
            readable: true,
            writable: true,
        }
    }

    /// Getter only
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Setter only
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }
}

/// Failure reading or writing a single property
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    #[error("no property named '{name}'")]
    UnknownProperty { name: String },

    #[error("property '{name}' is not readable")]
    NotReadable { name: String },

    #[error("property '{name}' is not writable")]
    NotWritable { name: String },

    #[error("property '{name}' expects {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: TypeDescriptor,
        found: TypeDescriptor,
    },

    #[error("property '{name}' holds {found}, which cannot be indexed")]
    NotIndexable { name: String, found: TypeDescriptor },

    #[error("index {index} out of bounds for '{name}' of length {length}")]
    IndexOutOfBounds {
        name: String,
        index: usize,
        length: usize,
    },

    #[error("value of type {found} has no properties")]
    NotAnObject { found: TypeDescriptor },

    /// Getter or setter reported its own failure
    #[error("{message}")]
    Failed { message: String },
}

impl AccessError {
    pub fn failed(message: impl Into<String>) -> Self {
        AccessError::Failed {
            message: message.into(),
        }
    }
}
