//! Per-unit mutable state: input, output, stop flag and owner
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

use crate::value::Value;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Hosting context of a conversion unit (a flow, an application, a test)
pub trait Owner: Send + Sync {
    /// Name used in log output
    fn name(&self) -> String;
}

/// Cooperative cancellation flag shared between a unit and its supervisors.
///
/// A handle may be attached to a parent handle; it then also reports stopped
/// while the parent is stopped. Chains attach their stages this way, so a stop
/// requested on the chain reaches the stage currently running.
#[derive(Clone, Default)]
pub struct StopHandle {
    node: Arc<StopNode>,
}

#[derive(Default)]
struct StopNode {
    flag: AtomicBool,
    parent: RwLock<Option<StopHandle>>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop
    pub fn stop(&self) {
        self.node.flag.store(true, Ordering::SeqCst);
    }

    /// Clear this handle's own flag; a stopped parent still wins
    pub fn resume(&self) {
        self.node.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        if self.node.flag.load(Ordering::SeqCst) {
            return true;
        }
        match self.node.parent.read().as_ref() {
            Some(parent) => parent.is_stopped(),
            None => false,
        }
    }

    /// Also report stopped whenever `parent` is stopped
    pub fn attach_to(&self, parent: &StopHandle) {
        if Arc::ptr_eq(&self.node, &parent.node) {
            return;
        }
        *self.node.parent.write() = Some(parent.clone());
    }

    pub fn detach(&self) {
        *self.node.parent.write() = None;
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// State every conversion unit embeds
///
/// Not synchronized: a unit must not be converted from two threads at once.
/// Only the [`StopHandle`] is meant to cross threads.
#[derive(Debug, Default)]
pub struct UnitState {
    input: Option<Value>,
    output: Option<Value>,
    stop: StopHandle,
    owner: Option<Weak<dyn Owner>>,
    set_up_done: bool,
}

impl UnitState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> Option<&Value> {
        self.input.as_ref()
    }

    pub fn set_input(&mut self, value: Value) {
        self.input = Some(value);
    }

    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    pub fn set_output(&mut self, value: Value) {
        self.output = Some(value);
    }

    pub fn take_output(&mut self) -> Option<Value> {
        self.output.take()
    }

    pub fn clear_output(&mut self) {
        self.output = None;
    }

    /// Call after every configuration change so stale output is never served
    pub fn invalidate(&mut self) {
        self.output = None;
    }

    /// Configuration change that also requires set-up to run again
    pub fn invalidate_set_up(&mut self) {
        self.output = None;
        self.set_up_done = false;
    }

    pub fn is_set_up(&self) -> bool {
        self.set_up_done
    }

    pub fn mark_set_up(&mut self) {
        self.set_up_done = true;
    }

    /// Drop input and output references
    pub fn clean_up(&mut self) {
        self.input = None;
        self.output = None;
    }

    pub fn stop_handle(&self) -> &StopHandle {
        &self.stop
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn set_owner(&mut self, owner: &Arc<dyn Owner>) {
        self.owner = Some(Arc::downgrade(owner));
    }

    /// Owner, if it is still alive
    pub fn owner(&self) -> Option<Arc<dyn Owner>> {
        self.owner.as_ref().and_then(Weak::upgrade)
    }

    /// Owner name for log output
    pub fn owner_name(&self) -> String {
        self.owner()
            .map(|owner| owner.name())
            .unwrap_or_else(|| "-".to_string())
    }
}
