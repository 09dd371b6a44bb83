//! Error types for the Conveyor core library
//!
//! Conversion failures are not errors in this sense: `convert` reports them
//! as a [`Diagnostic`](crate::Diagnostic) value. The [`Error`] type here covers
//! the surrounding API (path and type parsing, registry lookups, JSON bridging,
//! direct property access).

use crate::value::AccessError;
use thiserror::Error;

/// Main error type for Conveyor operations
#[derive(Error, Debug)]
pub enum Error {
    /// Property path could not be parsed
    #[error("Invalid property path '{input}' at position {position}: {message}")]
    PathParse {
        input: String,
        position: usize,
        message: String,
    },

    /// Type descriptor could not be parsed
    #[error("Invalid type '{input}': {message}")]
    TypeParse { input: String, message: String },

    /// No unit registered under the identifier
    #[error("Unknown conversion unit: {id}")]
    UnknownUnit {
        id: String,
        available: Vec<String>,
    },

    /// Chain could not be assembled
    #[error("Invalid chain: {message}")]
    Chain { message: String },

    /// Property access failed
    #[error("Property access failed: {0}")]
    Access(#[from] AccessError),

    /// Traversal engine misuse
    #[error("Traversal error: {0}")]
    Traversal(#[from] crate::traverse::TraversalError),

    /// JSON conversion errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json {
            message: source.to_string(),
            source: Some(source),
        }
    }
}
