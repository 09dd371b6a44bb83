//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use conveyor_core::{Diagnostic, DiagnosticKind};
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from conveyor-core library
    #[error("Core error: {0}")]
    Core(#[from] conveyor_core::Error),

    /// A chain or unit reported a failure
    #[error("Conversion failed: {0}")]
    Conversion(#[from] Diagnostic),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} format", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Timeout error
    #[error("Operation timed out after {} seconds", seconds)]
    Timeout { seconds: u64 },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Background task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Generic error with context
    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::Conversion(diagnostic) => match diagnostic.kind() {
                DiagnosticKind::Configuration => 20,
                DiagnosticKind::InputValidation => 21,
                DiagnosticKind::SetUp => 22,
                DiagnosticKind::Transform => 23,
                DiagnosticKind::Stopped => 24,
            },
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::Timeout { .. } => 11,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Task(_) => 14,
            Self::Other(_) => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    };

    if let Error::Core(conveyor_core::Error::UnknownUnit { available, .. }) = error {
        message.push_str(&format!("\nAvailable units: {}", available.join(", ")));
    }

    message
}
