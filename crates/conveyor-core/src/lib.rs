//! Conveyor Core - Typed conversion pipelines and object-graph traversal
//!
//! This crate provides two tightly coupled engines:
//!
//! - a **conversion pipeline engine**: conversion units declare the type they
//!   accept and the type they generate, and compose into chains whose type
//!   compatibility is verified before any stage runs;
//! - an **object-graph traversal engine**: visits every readable property
//!   reachable from a root object and lets a policy replace values in place.
//!
//! # Main Components
//!
//! - **Types**: [`TypeDescriptor`] and the assignability rules in [`types::compat`]
//! - **Values**: [`Value`], shared [`ObjectRef`] handles and the [`Bean`] introspection trait
//! - **Conversion**: the [`Conversion`] trait, [`Chain`] and the [`UnitRegistry`]
//! - **Paths**: [`PropertyPath`] parsing, resolution and assignment
//! - **Traversal**: [`Traverser`] and the [`Observer`] callback
//! - **Swap**: the [`Swap`] unit and its [`SwapPolicy`] implementations
//!
//! # Example
//!
//! ```
//! use conveyor_core::{Conversion, UnitRegistry, Value};
//!
//! let registry = UnitRegistry::with_defaults();
//! let mut chain = registry.chain_from_ids(&["change-case", "string-to-number"])?;
//!
//! chain.set_input(Value::text("17"));
//! chain.convert()?;
//! assert_eq!(chain.output(), Some(&Value::Integer(17)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod conversion;
pub mod error;
pub mod path;
pub mod swap;
pub mod traverse;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use conversion::{
    Chain, Conversion, Diagnostic, DiagnosticKind, Owner, StopHandle, UnitInfo, UnitRegistry,
    UnitState,
};
pub use error::{Error, Result};
pub use path::{PathStep, PropertyPath};
pub use swap::{PathSwap, Swap, SwapObserver, SwapPolicy, SwapReport, TypeSwap};
pub use traverse::{
    AccessFailure, Node, Observer, TraversalError, TraversalReport, TraversalState, Traverser,
    Visit,
};
pub use types::{is_assignable, is_compatible, ObjectType, TypeDescriptor};
pub use value::{AccessError, Array, Bean, ObjectRef, PropertyDescriptor, Record, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_value_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Value>();
        assert_send_sync::<StopHandle>();
        assert_send_sync::<Box<dyn SwapPolicy>>();
    }

    #[test]
    fn test_units_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Box<dyn Conversion>>();
        assert_send::<Chain>();
        assert_send::<Swap>();
    }
}
