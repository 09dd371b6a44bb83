//! Depth-first traversal of object graphs
//!
//! A [`Traverser`] walks every readable property reachable from a root value
//! and hands each location to an [`Observer`] as a [`Node`]: its path, the
//! accessor metadata, the owning object and the current value. Properties
//! holding arrays or lists contribute one node per element.
//!
//! Order guarantees: depth-first, parents before children, properties in
//! declaration order and elements in index order.
//!
//! ```
//! use conveyor_core::traverse::{Traverser, Visit};
//! use conveyor_core::types::{ObjectType, TypeDescriptor};
//! use conveyor_core::value::Record;
//! use conveyor_core::Value;
//!
//! let root: Value = Record::new(ObjectType::new("Point"))
//!     .with("x", TypeDescriptor::Integer, 1)
//!     .with("y", TypeDescriptor::Integer, 2)
//!     .into();
//!
//! let mut paths = Vec::new();
//! Traverser::new()
//!     .traverse(&root, &mut |node: &conveyor_core::traverse::Node| {
//!         paths.push(node.path().to_string());
//!         Visit::Continue
//!     })
//!     .unwrap();
//! assert_eq!(paths, vec!["", "x", "y"]);
//! ```
//!
//! Graphs with cycles do not terminate unless cycle detection is enabled
//! with [`Traverser::with_cycle_detection`].
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

mod node;

#[cfg(test)]
mod tests;

pub use node::{write_back, Node};

use crate::path::PropertyPath;
use crate::types::TypeDescriptor;
use crate::value::{AccessError, ObjectRef, Value};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Observer decision after visiting a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the node's properties
    Continue,
    /// Do not descend below this node
    SkipChildren,
}

/// Callback invoked at each visited node
pub trait Observer {
    fn observe(&mut self, node: &Node) -> Visit;
}

impl<F> Observer for F
where
    F: FnMut(&Node) -> Visit,
{
    fn observe(&mut self, node: &Node) -> Visit {
        self(node)
    }
}

/// Lifecycle of a [`Traverser`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalState {
    #[default]
    Idle,
    Traversing,
    Done,
}

/// Misuse of a [`Traverser`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraversalError {
    #[error("traverser has already been used; call reset() first")]
    AlreadyUsed,
}

/// Property that could not be read during a traversal
#[derive(Debug, Clone, PartialEq)]
pub struct AccessFailure {
    pub path: PropertyPath,
    pub error: AccessError,
}

impl Serialize for AccessFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("AccessFailure", 2)?;
        s.serialize_field("path", &self.path)?;
        s.serialize_field("error", &self.error.to_string())?;
        s.end()
    }
}

/// Outcome of one traversal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraversalReport {
    /// Number of nodes handed to the observer, root included
    pub visited: usize,
    /// References back to an enclosing object, not followed because cycle
    /// detection was on
    pub skipped_cycles: usize,
    /// Properties whose getter failed; their subtrees were not visited
    pub failures: Vec<AccessFailure>,
}

impl TraversalReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Single-use depth-first walker
#[derive(Debug, Default)]
pub struct Traverser {
    state: TraversalState,
    detect_cycles: bool,
}

impl Traverser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip references back to an object that encloses the current node, by
    /// identity. Objects shared between unrelated locations are still visited
    /// at each of them.
    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// Make the traverser usable again
    pub fn reset(&mut self) {
        self.state = TraversalState::Idle;
    }

    /// Visit every node reachable from `root`.
    ///
    /// A traverser runs once; a second call without [`reset`](Self::reset)
    /// fails with [`TraversalError::AlreadyUsed`]. Getter failures are logged,
    /// collected in the report and do not stop the traversal.
    pub fn traverse<O>(&mut self, root: &Value, observer: &mut O) -> Result<TraversalReport, TraversalError>
    where
        O: Observer + ?Sized,
    {
        if self.state != TraversalState::Idle {
            return Err(TraversalError::AlreadyUsed);
        }
        self.state = TraversalState::Traversing;

        let mut report = TraversalReport::default();
        // objects on the path from the root to the current node
        let mut ancestors = HashSet::new();
        let mut stack = vec![Frame::Enter(Node::root(root.clone()))];

        while let Some(frame) = stack.pop() {
            let node = match frame {
                Frame::Enter(node) => node,
                Frame::Leave(id) => {
                    ancestors.remove(&id);
                    continue;
                }
            };

            if self.detect_cycles {
                if let Value::Object(object) = &node.value {
                    if ancestors.contains(&object.id()) {
                        debug!(path = %node.path, "skipping reference back to an enclosing object");
                        report.skipped_cycles += 1;
                        continue;
                    }
                }
            }

            report.visited += 1;
            if observer.observe(&node) == Visit::SkipChildren {
                continue;
            }
            if let Value::Object(object) = &node.value {
                if self.detect_cycles {
                    ancestors.insert(object.id());
                    stack.push(Frame::Leave(object.id()));
                }
                push_children(object, &node.path, &mut stack, &mut report);
            }
        }

        self.state = TraversalState::Done;
        debug!(
            visited = report.visited,
            failures = report.failures.len(),
            "traversal finished"
        );
        Ok(report)
    }

    /// Path and runtime type of every node reachable from `root`
    pub fn collect_paths(&mut self, root: &Value) -> Result<Vec<(PropertyPath, TypeDescriptor)>, TraversalError> {
        let mut paths = Vec::new();
        self.traverse(root, &mut |node: &Node| {
            paths.push((node.path.clone(), node.value.type_descriptor()));
            Visit::Continue
        })?;
        Ok(paths)
    }
}

enum Frame {
    Enter(Node),
    /// Subtree of the object with this id is done
    Leave(usize),
}

/// Push the children of `object` so that they pop in declaration order
fn push_children(
    object: &ObjectRef,
    path: &PropertyPath,
    stack: &mut Vec<Frame>,
    report: &mut TraversalReport,
) {
    let mut children = Vec::new();
    for property in object.properties().into_iter().filter(|p| p.readable) {
        let value = match object.read(&property.name) {
            Ok(value) => value,
            Err(error) => {
                let path = path.child(&property.name);
                warn!(path = %path, error = %error, "cannot read property");
                report.failures.push(AccessFailure { path, error });
                continue;
            }
        };

        match value {
            Value::Null => {}
            Value::Array(_) | Value::List(_) => {
                let items = value.elements().unwrap_or_default();
                for (index, item) in items.iter().enumerate() {
                    children.push(Node {
                        path: path.element(&property.name, index),
                        property: Some(property.clone()),
                        parent: Some(object.clone()),
                        value: item.clone(),
                    });
                }
            }
            value => children.push(Node {
                path: path.child(&property.name),
                property: Some(property),
                parent: Some(object.clone()),
                value,
            }),
        }
    }
    stack.extend(children.into_iter().rev().map(Frame::Enter));
}
