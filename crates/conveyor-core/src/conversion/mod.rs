//! Typed conversion units and their composition
//!
//! A conversion unit declares the type it accepts and the type it generates,
//! takes one input value and produces one output value. Units compose into a
//! [`Chain`], whose stage compatibility is verified before anything runs.
//!
//! # Module Organization
//!
//! - [`state`] - Input/output slots, stop flag and owner embedded in every unit
//! - [`diagnostic`] - Failure reports of [`Conversion::convert`]
//! - [`chain`] - Ordered composition of units
//! - [`registry`] - Lookup of units by identifier
//! - [`built_in`] - Small general-purpose units
//!
//! # Example
//!
//! ```
//! use conveyor_core::conversion::{Chain, Conversion};
//! use conveyor_core::conversion::built_in::{ChangeCase, Case, StringToNumber};
//! use conveyor_core::Value;
//!
//! let mut chain = Chain::new()
//!     .with_stage(ChangeCase::new(Case::Lower))
//!     .with_stage(StringToNumber::default());
//!
//! chain.set_input(Value::text("42"));
//! chain.convert().unwrap();
//! assert_eq!(chain.output(), Some(&Value::Integer(42)));
//! ```
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod chain;
pub mod diagnostic;
pub mod registry;
pub mod state;

#[cfg(test)]
mod tests;

pub use chain::Chain;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use registry::{UnitEntry, UnitInfo, UnitRegistry};
pub use state::{Owner, StopHandle, UnitState};

use crate::types::TypeDescriptor;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A typed transformation of one input value into one output value.
///
/// Implementors supply the identity, the declared types, access to their
/// [`UnitState`] and the actual [`transform`](Conversion::transform). The
/// provided methods implement the execution contract around it: input
/// validation, one-time set-up, error mapping and output bookkeeping.
///
/// A `transform` body may fail with any error. Returning a [`Diagnostic`]
/// (converted into `anyhow::Error`) passes it through unchanged, which is how
/// chains report the failing stage and how units report a stop.
pub trait Conversion: fmt::Debug + Send {
    /// Stable identifier, used as registry key
    fn id(&self) -> &'static str;

    /// Declared input type
    fn accepts(&self) -> TypeDescriptor;

    /// Declared output type
    fn generates(&self) -> TypeDescriptor;

    fn state(&self) -> &UnitState;

    fn state_mut(&mut self) -> &mut UnitState;

    /// Unit-specific work on a validated input
    fn transform(&mut self, input: Value) -> anyhow::Result<Value>;

    /// Copy with the same configuration and fresh state
    fn shallow_copy(&self) -> Box<dyn Conversion>;

    /// Streaming units keep internal state across inputs
    fn is_streaming(&self) -> bool {
        false
    }

    fn requires_set_up(&self) -> bool {
        false
    }

    /// One-time initialization, run before the first transform
    fn set_up(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Clear unit-internal state; called when a non-streaming unit gets new input
    fn reset(&mut self) {}

    /// Validate the configuration before input validation
    fn check_configuration(&mut self) -> Result<(), Diagnostic> {
        Ok(())
    }

    fn set_input(&mut self, value: Value) {
        self.state_mut().clear_output();
        if !self.is_streaming() {
            self.reset();
        }
        self.state_mut().set_input(value);
    }

    fn input(&self) -> Option<&Value> {
        self.state().input()
    }

    fn output(&self) -> Option<&Value> {
        self.state().output()
    }

    fn has_output(&self) -> bool {
        self.state().output().is_some()
    }

    /// Move the output out of the unit
    fn take_output(&mut self) -> Option<Value> {
        self.state_mut().take_output()
    }

    /// Validate the input, run set-up if needed, then transform it
    fn convert(&mut self) -> Result<(), Diagnostic> {
        self.state().stop_handle().resume();

        self.check_configuration()?;
        let input = validate_input(self.state().input(), &self.accepts())?;

        if self.requires_set_up() && !self.state().is_set_up() {
            self.set_up().map_err(|message| Diagnostic::SetUp {
                unit: self.id().to_string(),
                message,
            })?;
            self.state_mut().mark_set_up();
        }

        self.state_mut().clear_output();
        match self.transform(input) {
            Ok(output) => {
                self.state_mut().set_output(output);
                Ok(())
            }
            Err(e) => {
                let diagnostic = match e.downcast::<Diagnostic>() {
                    Ok(diagnostic) => diagnostic,
                    Err(e) => Diagnostic::Transform {
                        message: format!("{:#}", e),
                        accepts: self.accepts(),
                        generates: self.generates(),
                    },
                };
                debug!(
                    unit = self.id(),
                    owner = %self.state().owner_name(),
                    "conversion failed: {}",
                    diagnostic
                );
                Err(diagnostic)
            }
        }
    }

    /// Request a cooperative stop
    fn stop_execution(&mut self) {
        self.state().stop_handle().stop();
    }

    fn is_stopped(&self) -> bool {
        self.state().is_stopped()
    }

    /// Handle another thread can use to stop this unit
    fn stop_handle(&self) -> StopHandle {
        self.state().stop_handle().clone()
    }

    /// Drop input and output
    fn clean_up(&mut self) {
        self.state_mut().clean_up();
    }

    fn set_owner(&mut self, owner: &Arc<dyn Owner>) {
        self.state_mut().set_owner(owner);
    }

    fn owner(&self) -> Option<Arc<dyn Owner>> {
        self.state().owner()
    }
}

impl Clone for Box<dyn Conversion> {
    fn clone(&self) -> Self {
        self.shallow_copy()
    }
}

/// Presence and type check of a unit's input
fn validate_input(input: Option<&Value>, accepts: &TypeDescriptor) -> Result<Value, Diagnostic> {
    let input = match input {
        None | Some(Value::Null) => return Err(Diagnostic::input("No input provided")),
        Some(value) => value,
    };
    if !accepts.is_unknown() && !input.is_instance_of(accepts) {
        return Err(Diagnostic::input(format!(
            "Input of type {} is not assignable to {}",
            input.type_descriptor(),
            accepts
        )));
    }
    Ok(input.clone())
}
