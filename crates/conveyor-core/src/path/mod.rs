//! Property paths locating values inside object graphs
//!
//! A path is a sequence of steps, each naming a property and optionally an
//! element index into the array or list held by that property. The textual
//! form uses dots between steps and brackets for indices:
//!
//! ```
//! use conveyor_core::PropertyPath;
//!
//! let path: PropertyPath = "classifiers[1].ridge".parse().unwrap();
//! assert_eq!(path.len(), 2);
//! assert_eq!(path.last().unwrap().index, Some(1));
//! assert_eq!(path.to_string(), "classifiers[1].ridge");
//! ```
//!
//! The empty path denotes the root of a graph and renders as the empty string.
//! Names that are empty, start with `"` or contain `.`, `[` or `]` are written
//! in double quotes, with `"` and `\` escaped by a backslash, e.g.
//! `"a.b"[0].c`.
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

mod access;
mod parser;


pub(crate) use access::{read_step, write_step};

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One step of a [`PropertyPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathStep {
    /// Property name
    pub name: String,
    /// Element index into the property's array or list
    pub index: Option<usize>,
}

impl PathStep {
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    pub fn element(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }
}

impl PathStep {
    /// Whether the name can be written without quotes
    fn is_bare(&self) -> bool {
        !self.name.is_empty()
            && !self.name.starts_with('"')
            && !self.name.contains(['.', '[', ']'])
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bare() {
            f.write_str(&self.name)?;
        } else {
            f.write_str("\"")?;
            for ch in self.name.chars() {
                if matches!(ch, '"' | '\\') {
                    f.write_str("\\")?;
                }
                write!(f, "{}", ch)?;
            }
            f.write_str("\"")?;
        }
        if let Some(index) = self.index {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

/// Immutable location of a value relative to a root object
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    steps: Vec<PathStep>,
}

impl PropertyPath {
    /// The empty path, denoting the root
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    /// Parse the dotted form, e.g. `a.b[2].c`
    pub fn parse(input: &str) -> Result<Self> {
        parser::parse(input)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first(&self) -> Option<&PathStep> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    /// Path without its last step; `None` for the root
    pub fn parent(&self) -> Option<PropertyPath> {
        if self.steps.is_empty() {
            return None;
        }
        Some(Self {
            steps: self.steps[..self.steps.len() - 1].to_vec(),
        })
    }

    /// Steps `start..end`, clamped to the path length
    pub fn subpath(&self, start: usize, end: usize) -> PropertyPath {
        let end = end.min(self.steps.len());
        let start = start.min(end);
        Self {
            steps: self.steps[start..end].to_vec(),
        }
    }

    /// New path with `step` appended
    pub fn append(&self, step: PathStep) -> PropertyPath {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        Self { steps }
    }

    /// New path descending into property `name`
    pub fn child(&self, name: impl Into<String>) -> PropertyPath {
        self.append(PathStep::property(name))
    }

    /// New path descending into element `index` of property `name`
    pub fn element(&self, name: impl Into<String>, index: usize) -> PropertyPath {
        self.append(PathStep::element(name, index))
    }

    /// Whether `self` equals `other` or lies below it
    pub fn starts_with(&self, other: &PropertyPath) -> bool {
        self.steps.starts_with(&other.steps)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parser::parse(s)
    }
}

impl From<Vec<PathStep>> for PropertyPath {
    fn from(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }
}

impl Serialize for PropertyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
