//! Streaming average over the most recent inputs

use crate::conversion::{Conversion, Diagnostic, UnitState};
use crate::types::TypeDescriptor;
use crate::value::Value;
use anyhow::bail;
use std::collections::VecDeque;

const DEFAULT_WINDOW: usize = 5;

/// Average of the last `window` numbers seen.
///
/// Streaming unit: the history survives `set_input`, so consecutive inputs
/// contribute to the same average. Use [`MovingAverage::clear_history`] to
/// start over.
#[derive(Debug)]
pub struct MovingAverage {
    window: usize,
    history: VecDeque<f64>,
    state: UnitState,
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            history: VecDeque::with_capacity(window),
            state: UnitState::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Change the window size, dropping the oldest values if it shrinks
    pub fn set_window(&mut self, window: usize) {
        self.window = window;
        while self.history.len() > window {
            self.history.pop_front();
        }
        self.state.invalidate();
    }

    /// Values currently in the window, oldest first
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Conversion for MovingAverage {
    fn id(&self) -> &'static str {
        "moving-average"
    }

    fn accepts(&self) -> TypeDescriptor {
        TypeDescriptor::Number
    }

    fn generates(&self) -> TypeDescriptor {
        TypeDescriptor::Float
    }

    fn state(&self) -> &UnitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    fn is_streaming(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.clear_history();
    }

    fn check_configuration(&mut self) -> Result<(), Diagnostic> {
        if self.window == 0 {
            return Err(Diagnostic::configuration("window must be at least 1"));
        }
        Ok(())
    }

    fn transform(&mut self, input: Value) -> anyhow::Result<Value> {
        let Some(x) = input.as_f64() else {
            bail!("expected a number, got {}", input.type_descriptor());
        };
        self.history.push_back(x);
        while self.history.len() > self.window {
            self.history.pop_front();
        }

        let mut sum = 0.0;
        for value in &self.history {
            if self.state.is_stopped() {
                return Err(Diagnostic::Stopped.into());
            }
            sum += value;
        }
        Ok(Value::Float(sum / self.history.len() as f64))
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        Box::new(MovingAverage::new(self.window))
    }
}
