//! Diagnostics returned by a failed conversion

use crate::types::TypeDescriptor;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a call to [`Conversion::convert`](super::Conversion::convert) failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Input validation failed: {message}")]
    InputValidation { message: String },

    #[error("Set-up of '{unit}' failed: {message}")]
    SetUp { unit: String, message: String },

    #[error("Failed to convert {accepts} to {generates}: {message}")]
    Transform {
        message: String,
        accepts: TypeDescriptor,
        generates: TypeDescriptor,
    },

    #[error("Execution stopped")]
    Stopped,

    /// Failure of a chain stage, with the 1-based stage index
    #[error("Stage {index}: {source}")]
    Stage {
        index: usize,
        source: Box<Diagnostic>,
    },
}

/// Classification of a [`Diagnostic`], ignoring stage wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Configuration,
    InputValidation,
    SetUp,
    Transform,
    Stopped,
}

impl Diagnostic {
    pub fn configuration(message: impl Into<String>) -> Self {
        Diagnostic::Configuration {
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Diagnostic::InputValidation {
            message: message.into(),
        }
    }

    /// Wrap `self` as the failure of chain stage `index` (1-based)
    pub fn at_stage(self, index: usize) -> Self {
        Diagnostic::Stage {
            index,
            source: Box::new(self),
        }
    }

    /// Kind of the innermost cause
    pub fn kind(&self) -> DiagnosticKind {
        match self.innermost() {
            Diagnostic::Configuration { .. } => DiagnosticKind::Configuration,
            Diagnostic::InputValidation { .. } => DiagnosticKind::InputValidation,
            Diagnostic::SetUp { .. } => DiagnosticKind::SetUp,
            Diagnostic::Transform { .. } => DiagnosticKind::Transform,
            Diagnostic::Stopped => DiagnosticKind::Stopped,
            // innermost() never returns a stage wrapper
            Diagnostic::Stage { source, .. } => source.kind(),
        }
    }

    /// The diagnostic with every stage wrapper removed
    pub fn innermost(&self) -> &Diagnostic {
        let mut current = self;
        while let Diagnostic::Stage { source, .. } = current {
            current = source;
        }
        current
    }

    /// Stage indices from the outermost chain inwards
    pub fn stage_trail(&self) -> Vec<usize> {
        let mut trail = Vec::new();
        let mut current = self;
        while let Diagnostic::Stage { index, source } = current {
            trail.push(*index);
            current = source;
        }
        trail
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::Configuration => "configuration",
            DiagnosticKind::InputValidation => "input validation",
            DiagnosticKind::SetUp => "set-up",
            DiagnosticKind::Transform => "transform",
            DiagnosticKind::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
