//! Generic, dynamically shaped bean

use super::{AccessError, Bean, PropertyDescriptor, Value};
use crate::types::{ObjectType, TypeDescriptor};
use indexmap::IndexMap;

/// Object with an ordered set of typed fields
///
/// Fields keep insertion order, which is the order traversal visits them in.
/// Writes are refused for read-only fields and for values whose runtime type
/// is not assignable to the field's declared type.
#[derive(Debug, Clone)]
pub struct Record {
    ty: ObjectType,
    fields: IndexMap<String, Field>,
}

#[derive(Debug, Clone)]
struct Field {
    descriptor: PropertyDescriptor,
    value: Value,
}

impl Record {
    pub fn new(ty: ObjectType) -> Self {
        Self {
            ty,
            fields: IndexMap::new(),
        }
    }

    /// Add a readable and writable field
    pub fn with(
        mut self,
        name: impl Into<String>,
        declared: TypeDescriptor,
        value: impl Into<Value>,
    ) -> Self {
        self.insert(PropertyDescriptor::new(name, declared), value.into());
        self
    }

    /// Add a read-only field
    pub fn with_read_only(
        mut self,
        name: impl Into<String>,
        declared: TypeDescriptor,
        value: impl Into<Value>,
    ) -> Self {
        self.insert(PropertyDescriptor::new(name, declared).read_only(), value.into());
        self
    }

    /// Add a field with explicit accessor metadata
    pub fn with_field(mut self, descriptor: PropertyDescriptor, value: impl Into<Value>) -> Self {
        self.insert(descriptor, value.into());
        self
    }

    /// Insert or replace a field, bypassing the setter checks
    pub fn insert(&mut self, descriptor: PropertyDescriptor, value: Value) {
        self.fields
            .insert(descriptor.name.clone(), Field { descriptor, value });
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).map(|field| &field.value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Bean for Record {
    fn object_type(&self) -> ObjectType {
        self.ty.clone()
    }

    fn properties(&self) -> Vec<PropertyDescriptor> {
        self.fields.values().map(|f| f.descriptor.clone()).collect()
    }

    fn read(&self, name: &str) -> Result<Value, AccessError> {
        let field = self.fields.get(name).ok_or_else(|| AccessError::UnknownProperty {
            name: name.to_string(),
        })?;
        if !field.descriptor.readable {
            return Err(AccessError::NotReadable {
                name: name.to_string(),
            });
        }
        Ok(field.value.clone())
    }

    fn write(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        let field = self.fields.get_mut(name).ok_or_else(|| AccessError::UnknownProperty {
            name: name.to_string(),
        })?;
        if !field.descriptor.writable {
            return Err(AccessError::NotWritable {
                name: name.to_string(),
            });
        }
        if !value.is_instance_of(&field.descriptor.declared) {
            return Err(AccessError::TypeMismatch {
                name: name.to_string(),
                expected: field.descriptor.declared.clone(),
                found: value.type_descriptor(),
            });
        }
        field.value = value;
        Ok(())
    }

    fn deep_copy(&self) -> Box<dyn Bean> {
        let fields = self
            .fields
            .iter()
            .map(|(name, field)| {
                (
                    name.clone(),
                    Field {
                        descriptor: field.descriptor.clone(),
                        value: field.value.deep_copy(),
                    },
                )
            })
            .collect();
        Box::new(Record {
            ty: self.ty.clone(),
            fields,
        })
    }
}
