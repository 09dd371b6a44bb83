//! Built-in conversion units
//!
//! A small set of general-purpose units. They back the CLI and double as
//! reference implementations of the [`Conversion`](super::Conversion) contract:
//! stateless units, a streaming unit with an internal window, and a unit that
//! needs one-time set-up.
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

mod lookup;
mod moving_average;
mod pass_through;
mod text;

pub use lookup::{Lookup, MissingKey};
pub use moving_average::MovingAverage;
pub use pass_through::{AnyToString, PassThrough};
pub use text::{Case, ChangeCase, NumberKind, StringToNumber};
