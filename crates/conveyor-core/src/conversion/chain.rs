//! Ordered composition of conversion units
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

use super::{Conversion, Diagnostic, Owner, UnitState};
use crate::types::{check_chain, Incompatibility, TypeDescriptor};
use crate::value::Value;
use std::sync::Arc;
use tracing::debug;

/// A conversion unit running its stages one after the other.
///
/// The output of stage `i` becomes the input of stage `i + 1`. Adjacent
/// stages are checked for type compatibility on the first conversion after
/// each reconfiguration; the verdict is memoized until the stages change.
#[derive(Debug, Default)]
pub struct Chain {
    stages: Vec<Box<dyn Conversion>>,
    state: UnitState,
    verdict: Option<Result<(), Incompatibility>>,
    checks: usize,
}

impl Chain {
    /// Create an empty chain, which passes its input through
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage (builder style)
    pub fn with_stage(mut self, stage: impl Conversion + 'static) -> Self {
        self.push(Box::new(stage));
        self
    }

    /// Append a stage
    pub fn push(&mut self, mut stage: Box<dyn Conversion>) {
        self.adopt(stage.as_mut());
        self.stages.push(stage);
        self.invalidate();
    }

    /// Replace all stages
    pub fn set_stages(&mut self, stages: Vec<Box<dyn Conversion>>) {
        self.stages = stages;
        for stage in &mut self.stages {
            adopt(&self.state, stage.as_mut());
        }
        self.invalidate();
    }

    pub fn stages(&self) -> &[Box<dyn Conversion>] {
        &self.stages
    }

    /// Mutable access to a stage for reconfiguration.
    ///
    /// Counts as a reconfiguration of the chain.
    pub fn stage_mut(&mut self, index: usize) -> Option<&mut Box<dyn Conversion>> {
        self.invalidate();
        self.stages.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Number of compatibility checks performed so far
    pub fn compatibility_checks(&self) -> usize {
        self.checks
    }

    /// Check adjacent stages for type compatibility, reusing the last verdict
    /// while the configuration is unchanged
    pub fn verify(&mut self) -> Result<(), Diagnostic> {
        let verdict = match &self.verdict {
            Some(verdict) => verdict.clone(),
            None => {
                let signatures: Vec<(TypeDescriptor, TypeDescriptor)> = self
                    .stages
                    .iter()
                    .map(|stage| (stage.accepts(), stage.generates()))
                    .collect();
                let verdict = check_chain(&signatures);
                self.checks += 1;
                debug!(
                    stages = self.stages.len(),
                    compatible = verdict.is_ok(),
                    "checked chain compatibility"
                );
                self.verdict = Some(verdict.clone());
                verdict
            }
        };
        verdict.map_err(|incompatibility| Diagnostic::configuration(incompatibility.to_string()))
    }

    fn adopt(&self, stage: &mut dyn Conversion) {
        adopt(&self.state, stage);
    }

    fn invalidate(&mut self) {
        self.verdict = None;
        self.state.invalidate();
    }
}

/// Link a stage to the chain's stop flag and owner
fn adopt(chain: &UnitState, stage: &mut dyn Conversion) {
    stage.state().stop_handle().attach_to(chain.stop_handle());
    if let Some(owner) = chain.owner() {
        stage.set_owner(&owner);
    }
}

impl Conversion for Chain {
    fn id(&self) -> &'static str {
        "chain"
    }

    fn accepts(&self) -> TypeDescriptor {
        self.stages
            .first()
            .map(|stage| stage.accepts())
            .unwrap_or(TypeDescriptor::Unknown)
    }

    fn generates(&self) -> TypeDescriptor {
        self.stages
            .last()
            .map(|stage| stage.generates())
            .unwrap_or(TypeDescriptor::Unknown)
    }

    fn state(&self) -> &UnitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    fn check_configuration(&mut self) -> Result<(), Diagnostic> {
        self.verify()
    }

    fn transform(&mut self, input: Value) -> anyhow::Result<Value> {
        let mut current = input;
        for (i, stage) in self.stages.iter_mut().enumerate() {
            let index = i + 1;
            if self.state.is_stopped() {
                debug!(stage = index, "chain stopped before stage");
                return Err(Diagnostic::Stopped.into());
            }

            debug!(stage = index, unit = stage.id(), "running chain stage");
            stage.set_input(current);
            stage.convert().map_err(|d| d.at_stage(index))?;
            current = stage.take_output().ok_or_else(|| {
                Diagnostic::Transform {
                    message: "stage produced no output".to_string(),
                    accepts: stage.accepts(),
                    generates: stage.generates(),
                }
                .at_stage(index)
            })?;
        }
        Ok(current)
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        let mut copy = Chain::new();
        copy.set_stages(self.stages.iter().map(|stage| stage.shallow_copy()).collect());
        Box::new(copy)
    }

    fn stop_execution(&mut self) {
        self.state.stop_handle().stop();
        for stage in &mut self.stages {
            stage.stop_execution();
        }
    }

    fn clean_up(&mut self) {
        self.state.clean_up();
        for stage in &mut self.stages {
            stage.clean_up();
        }
    }

    fn set_owner(&mut self, owner: &Arc<dyn Owner>) {
        self.state.set_owner(owner);
        for stage in &mut self.stages {
            stage.set_owner(owner);
        }
    }
}
