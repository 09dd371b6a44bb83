//! Type descriptors for conversion contracts
//!
//! A [`TypeDescriptor`] is the value-level handle a conversion unit uses to
//! declare what it accepts and what it produces. Runtime values report their
//! own descriptor through [`Value::type_descriptor`](crate::Value::type_descriptor),
//! and the [`compat`] module decides whether one type may feed another.
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

pub mod compat;

pub use compat::{check_chain, is_assignable, is_compatible, Incompatibility};

use crate::error::Error;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Name of the implicit root of every object type
pub const OBJECT_ROOT: &str = "Object";

/// Runtime-inspectable type handle
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// Wildcard, matches anything. Never the runtime type of a value.
    Unknown,
    /// The type of [`Value::Null`](crate::Value::Null)
    Null,
    Boolean,
    Integer,
    Float,
    /// Abstract numeric supertype of `Integer` and `Float`
    Number,
    Text,
    Bytes,
    /// Heterogeneous ordered collection
    List,
    /// Nominal object type
    Object(ObjectType),
    /// Array with a fixed element type
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Array of the given element type
    pub fn array_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array(Box::new(element))
    }

    /// Object type accepting every object
    pub fn any_object() -> Self {
        TypeDescriptor::Object(ObjectType::any())
    }

    /// Object type of the given nominal type
    pub fn object(ty: &ObjectType) -> Self {
        TypeDescriptor::Object(ty.clone())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeDescriptor::Unknown)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeDescriptor::Array(_))
    }

    /// Element type for arrays
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Array(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Unknown => write!(f, "unknown"),
            TypeDescriptor::Null => write!(f, "null"),
            TypeDescriptor::Boolean => write!(f, "boolean"),
            TypeDescriptor::Integer => write!(f, "integer"),
            TypeDescriptor::Float => write!(f, "float"),
            TypeDescriptor::Number => write!(f, "number"),
            TypeDescriptor::Text => write!(f, "string"),
            TypeDescriptor::Bytes => write!(f, "bytes"),
            TypeDescriptor::List => write!(f, "list"),
            TypeDescriptor::Object(ty) => write!(f, "{}", ty.name()),
            TypeDescriptor::Array(element) => write!(f, "{}[]", element),
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(element) = s.strip_suffix("[]") {
            return Ok(TypeDescriptor::array_of(element.parse()?));
        }

        let ty = match s {
            "unknown" | "*" => TypeDescriptor::Unknown,
            "null" => TypeDescriptor::Null,
            "boolean" | "bool" => TypeDescriptor::Boolean,
            "integer" | "int" => TypeDescriptor::Integer,
            "float" | "double" => TypeDescriptor::Float,
            "number" => TypeDescriptor::Number,
            "string" | "text" => TypeDescriptor::Text,
            "bytes" => TypeDescriptor::Bytes,
            "list" => TypeDescriptor::List,
            "" => {
                return Err(Error::TypeParse {
                    input: s.to_string(),
                    message: "empty type name".to_string(),
                })
            }
            OBJECT_ROOT => TypeDescriptor::any_object(),
            name if is_identifier(name) => TypeDescriptor::Object(ObjectType::new(name)),
            other => {
                return Err(Error::TypeParse {
                    input: other.to_string(),
                    message: "not a type name".to_string(),
                })
            }
        };

        Ok(ty)
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == ':')
}

/// Nominal object type with single inheritance
///
/// Types are cheap to clone. Equality is by name; two independently built
/// types with the same name are the same type.
#[derive(Clone)]
pub struct ObjectType {
    inner: Arc<ObjectTypeInner>,
}

struct ObjectTypeInner {
    name: String,
    parent: Option<ObjectType>,
}

impl ObjectType {
    /// Type directly below the implicit `Object` root
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ObjectTypeInner {
                name: name.into(),
                parent: None,
            }),
        }
    }

    /// Type deriving from `parent`
    pub fn extending(name: impl Into<String>, parent: &ObjectType) -> Self {
        Self {
            inner: Arc::new(ObjectTypeInner {
                name: name.into(),
                parent: Some(parent.clone()),
            }),
        }
    }

    /// The implicit root type every object type extends
    pub fn any() -> Self {
        Self::new(OBJECT_ROOT)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parent(&self) -> Option<&ObjectType> {
        self.inner.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.inner.name == OBJECT_ROOT
    }

    /// Iterate this type followed by its ancestors, nearest first
    pub fn ancestry(&self) -> impl Iterator<Item = &ObjectType> {
        std::iter::successors(Some(self), |ty| ty.parent())
    }

    /// Whether `self` is `other` or derives from it
    pub fn is_subtype_of(&self, other: &ObjectType) -> bool {
        if other.is_root() {
            return true;
        }
        self.ancestry().any(|ty| ty.name() == other.name())
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.name == other.inner.name
    }
}

impl Eq for ObjectType {}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain: Vec<&str> = self.ancestry().map(|ty| ty.name()).collect();
        write!(f, "ObjectType({})", chain.join(" < "))
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
