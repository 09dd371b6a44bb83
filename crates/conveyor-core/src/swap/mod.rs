//! In-place replacement of values inside object graphs
//!
//! The [`Swap`] conversion unit walks its input with a [`Traverser`] and asks
//! each configured [`SwapPolicy`] whether the visited value should be
//! replaced. Replacements are written through the same accessor the value was
//! read from, so element replacements rewrite the whole array or list.
//!
//! Failed replacements are logged and collected in the [`SwapReport`]; they
//! never fail the conversion.
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

mod policy;


pub use policy::{PathSwap, SwapPolicy, TypeSwap};

use crate::conversion::{Conversion, UnitState};
use crate::path::PropertyPath;
use crate::traverse::{AccessFailure, Node, Observer, TraversalReport, Traverser, Visit};
use crate::types::TypeDescriptor;
use crate::value::Value;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Outcome of one swap run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SwapReport {
    /// Paths whose value was replaced
    pub swapped: Vec<PropertyPath>,
    /// Replacements that were refused by the setter
    pub failures: Vec<AccessFailure>,
    /// Underlying traversal outcome
    pub traversal: TraversalReport,
}

/// Observer applying swap policies to every visited node.
///
/// The first policy that accepts a node performs the swap. Nodes whose value
/// was replaced are not descended into.
pub struct SwapObserver<'p> {
    policies: &'p [Box<dyn SwapPolicy>],
    swapped: Vec<PropertyPath>,
    failures: Vec<AccessFailure>,
}

impl<'p> SwapObserver<'p> {
    pub fn new(policies: &'p [Box<dyn SwapPolicy>]) -> Self {
        Self {
            policies,
            swapped: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Finish into a report
    pub fn into_report(self, traversal: TraversalReport) -> SwapReport {
        SwapReport {
            swapped: self.swapped,
            failures: self.failures,
            traversal,
        }
    }
}

impl Observer for SwapObserver<'_> {
    fn observe(&mut self, node: &Node) -> Visit {
        let Some(policy) = self.policies.iter().find(|policy| policy.can_swap(node)) else {
            return Visit::Continue;
        };
        match policy.perform_swap(node) {
            Ok(()) => {
                debug!(path = %node.path(), "swapped value");
                self.swapped.push(node.path().clone());
                Visit::SkipChildren
            }
            Err(error) => {
                warn!(path = %node.path(), error = %error, "failed to swap value");
                self.failures.push(AccessFailure {
                    path: node.path().clone(),
                    error,
                });
                Visit::Continue
            }
        }
    }
}

/// Conversion unit replacing values in an object graph.
///
/// By default the input graph is deep-copied first and the copy is modified.
/// With `no_copy` the input itself is modified in place and returned.
#[derive(Default)]
pub struct Swap {
    policies: Vec<Box<dyn SwapPolicy>>,
    no_copy: bool,
    detect_cycles: bool,
    last_report: Option<SwapReport>,
    state: UnitState,
}

impl Swap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a policy (builder style)
    pub fn with_policy(mut self, policy: impl SwapPolicy + 'static) -> Self {
        self.add_policy(Box::new(policy));
        self
    }

    pub fn add_policy(&mut self, policy: Box<dyn SwapPolicy>) {
        self.policies.push(policy);
        self.state.invalidate();
    }

    pub fn set_policies(&mut self, policies: Vec<Box<dyn SwapPolicy>>) {
        self.policies = policies;
        self.state.invalidate();
    }

    pub fn policies(&self) -> &[Box<dyn SwapPolicy>] {
        &self.policies
    }

    /// Modify the input in place instead of a deep copy (builder style)
    pub fn with_no_copy(mut self, no_copy: bool) -> Self {
        self.set_no_copy(no_copy);
        self
    }

    pub fn set_no_copy(&mut self, no_copy: bool) {
        self.no_copy = no_copy;
        self.state.invalidate();
    }

    pub fn no_copy(&self) -> bool {
        self.no_copy
    }

    /// Do not follow references back to an enclosing object, making cyclic
    /// inputs terminate (builder style). A cyclic input cannot be deep-copied,
    /// so without `no_copy` it fails the conversion instead.
    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.set_cycle_detection(enabled);
        self
    }

    pub fn set_cycle_detection(&mut self, enabled: bool) {
        self.detect_cycles = enabled;
        self.state.invalidate();
    }

    /// Report of the most recent conversion
    pub fn last_report(&self) -> Option<&SwapReport> {
        self.last_report.as_ref()
    }
}

impl fmt::Debug for Swap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Swap")
            .field("policies", &self.policies)
            .field("no_copy", &self.no_copy)
            .field("detect_cycles", &self.detect_cycles)
            .finish()
    }
}

impl Conversion for Swap {
    fn id(&self) -> &'static str {
        "swap"
    }

    fn accepts(&self) -> TypeDescriptor {
        TypeDescriptor::Unknown
    }

    fn generates(&self) -> TypeDescriptor {
        TypeDescriptor::Unknown
    }

    fn state(&self) -> &UnitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    fn reset(&mut self) {
        self.last_report = None;
    }

    fn transform(&mut self, input: Value) -> anyhow::Result<Value> {
        let root = if self.no_copy {
            input
        } else {
            if self.detect_cycles && has_cycle(&input) {
                anyhow::bail!("input graph contains a cycle and cannot be copied; enable no_copy to swap in place");
            }
            input.deep_copy()
        };

        let mut observer = SwapObserver::new(&self.policies);
        let traversal = Traverser::new()
            .with_cycle_detection(self.detect_cycles)
            .traverse(&root, &mut observer)?;
        let report = observer.into_report(traversal);

        debug!(
            swapped = report.swapped.len(),
            failures = report.failures.len(),
            owner = %self.state.owner_name(),
            "swap finished"
        );
        self.last_report = Some(report);
        Ok(root)
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        Box::new(Swap {
            policies: self.policies.iter().map(|policy| policy.box_clone()).collect(),
            no_copy: self.no_copy,
            detect_cycles: self.detect_cycles,
            last_report: None,
            state: UnitState::new(),
        })
    }
}

/// Whether some object in `root` refers back to an object enclosing it
fn has_cycle(root: &Value) -> bool {
    Traverser::new()
        .with_cycle_detection(true)
        .traverse(root, &mut |_: &Node| Visit::Continue)
        .map(|report| report.skipped_cycles > 0)
        .unwrap_or(false)
}
