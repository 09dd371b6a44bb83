//! Runtime values flowing through conversion units and object graphs
//!
//! Scalars and containers (`Array`, `List`) are plain owned data. Objects are
//! shared handles ([`ObjectRef`]): cloning a [`Value`] that holds an object
//! shares the object, the way references behave in a managed runtime. Use
//! [`Value::deep_copy`] when an independent graph is needed.

mod bean;
mod json;
mod record;

pub use bean::{AccessError, Bean, PropertyDescriptor};
pub use json::MAP_TYPE;
pub use record::Record;

use crate::types::{is_assignable, ObjectType, TypeDescriptor};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A value in an object graph or on a conversion unit's input/output
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Array(Array),
    List(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    /// Text value
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Object value wrapping a bean
    pub fn object(bean: impl Bean + 'static) -> Self {
        Value::Object(ObjectRef::new(bean))
    }

    /// Runtime type of this value; never [`TypeDescriptor::Unknown`]
    pub fn type_descriptor(&self) -> TypeDescriptor {
        match self {
            Value::Null => TypeDescriptor::Null,
            Value::Boolean(_) => TypeDescriptor::Boolean,
            Value::Integer(_) => TypeDescriptor::Integer,
            Value::Float(_) => TypeDescriptor::Float,
            Value::Text(_) => TypeDescriptor::Text,
            Value::Bytes(_) => TypeDescriptor::Bytes,
            Value::Array(array) => TypeDescriptor::array_of(array.element().clone()),
            Value::List(_) => TypeDescriptor::List,
            Value::Object(object) => TypeDescriptor::Object(object.object_type()),
        }
    }

    /// Whether this value may be used where `ty` is expected
    pub fn is_instance_of(&self, ty: &TypeDescriptor) -> bool {
        is_assignable(&self.type_descriptor(), ty)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Elements of an array or list
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array(array) => Some(array.items()),
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether the value is an indexable container (array or list)
    pub fn is_indexable(&self) -> bool {
        matches!(self, Value::Array(_) | Value::List(_))
    }

    /// Fully independent copy: every reachable object is duplicated.
    ///
    /// Cyclic graphs do not terminate.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::Array(array) => Value::Array(Array {
                element: array.element.clone(),
                items: array.items.iter().map(Value::deep_copy).collect(),
            }),
            Value::List(items) => Value::List(items.iter().map(Value::deep_copy).collect()),
            Value::Object(object) => Value::Object(object.deep_copy()),
            scalar => scalar.clone(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::object(record)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Value::Array(array) => write!(f, "{}[{}]", array.element, array.items.len()),
            Value::List(items) => write!(f, "list[{}]", items.len()),
            Value::Object(object) => write!(f, "{}@{:x}", object.object_type(), object.id()),
        }
    }
}

/// Array with a fixed element type; every item is assignable to it
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    element: TypeDescriptor,
    items: Vec<Value>,
}

impl Array {
    /// Build an array, rejecting items of the wrong type
    pub fn new(element: TypeDescriptor, items: Vec<Value>) -> Result<Self, AccessError> {
        if let Some(bad) = items.iter().find(|item| !item.is_instance_of(&element)) {
            return Err(AccessError::TypeMismatch {
                name: "[]".to_string(),
                expected: element,
                found: bad.type_descriptor(),
            });
        }
        Ok(Self { element, items })
    }

    /// Empty array of the given element type
    pub fn empty(element: TypeDescriptor) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    pub fn element(&self) -> &TypeDescriptor {
        &self.element
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the item at `index`
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), AccessError> {
        if !value.is_instance_of(&self.element) {
            return Err(AccessError::TypeMismatch {
                name: format!("[{}]", index),
                expected: self.element.clone(),
                found: value.type_descriptor(),
            });
        }
        let length = self.items.len();
        let slot = self.items.get_mut(index).ok_or(AccessError::IndexOutOfBounds {
            name: String::new(),
            index,
            length,
        })?;
        *slot = value;
        Ok(())
    }
}

/// Shared handle to an introspectable object
///
/// The bean's type is captured when the handle is built, so type checks on a
/// value never need the lock.
#[derive(Clone)]
pub struct ObjectRef {
    ty: ObjectType,
    inner: Arc<RwLock<Box<dyn Bean>>>,
}

impl ObjectRef {
    pub fn new(bean: impl Bean + 'static) -> Self {
        Self::from_box(Box::new(bean))
    }

    pub fn from_box(bean: Box<dyn Bean>) -> Self {
        Self {
            ty: bean.object_type(),
            inner: Arc::new(RwLock::new(bean)),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.ty.clone()
    }

    /// Accessor metadata for every property, in declaration order
    pub fn properties(&self) -> Vec<PropertyDescriptor> {
        self.inner.read().properties()
    }

    /// Accessor metadata for a single property
    pub fn property(&self, name: &str) -> Option<PropertyDescriptor> {
        self.properties().into_iter().find(|p| p.name == name)
    }

    pub fn read(&self, name: &str) -> Result<Value, AccessError> {
        self.inner.read().read(name)
    }

    /// Write through the object's setter. `value` may refer to this object,
    /// which is how cycles are built.
    pub fn write(&self, name: &str, value: Value) -> Result<(), AccessError> {
        self.inner.write().write(name, value)
    }

    /// Run `f` with shared access to the bean
    pub fn with<R>(&self, f: impl FnOnce(&dyn Bean) -> R) -> R {
        let guard = self.inner.read();
        f(guard.as_ref())
    }

    /// Whether both handles point at the same object
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Identity of the shared object, stable for its lifetime
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn deep_copy(&self) -> ObjectRef {
        let copy = self.inner.read().deep_copy();
        ObjectRef::from_box(copy)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.object_type() != other.object_type() {
            return false;
        }
        let ours = self.properties();
        if ours != other.properties() {
            return false;
        }
        ours.iter().filter(|p| p.readable).all(|p| {
            match (self.read(&p.name), other.read(&p.name)) {
                (Ok(a), Ok(b)) => a == b,
                (Err(a), Err(b)) => a == b,
                _ => false,
            }
        })
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.read().fmt(f)
    }
}
