//! Compatibility checks between produced and accepted types
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

use super::TypeDescriptor;
use std::fmt;

/// Whether a value of type `from` may be used where `to` is expected.
///
/// Arrays are invariant: `integer[]` is not assignable to `number[]`.
pub fn is_assignable(from: &TypeDescriptor, to: &TypeDescriptor) -> bool {
    use TypeDescriptor::*;

    match (from, to) {
        (_, Unknown) => true,
        (Unknown, _) => false,
        (Null, Null | Text | Bytes | List | Object(_) | Array(_)) => true,
        (Integer | Float, Number) => true,
        (Object(sub), Object(sup)) => sub.is_subtype_of(sup),
        (Array(a), Array(b)) => a == b,
        (a, b) => a == b,
    }
}

/// Whether the output of one unit may feed the input of the next.
///
/// A wildcard on either side is always compatible; the runtime type gate of
/// the downstream unit catches whatever slips through.
pub fn is_compatible(produced: &TypeDescriptor, accepted: &TypeDescriptor) -> bool {
    produced.is_unknown() || accepted.is_unknown() || is_assignable(produced, accepted)
}

/// First incompatible adjacent pair found by [`check_chain`]
#[derive(Debug, Clone, PartialEq)]
pub struct Incompatibility {
    /// Zero-based index of the upstream stage
    pub upstream: usize,
    pub produced: TypeDescriptor,
    pub accepted: TypeDescriptor,
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stage {} generates {} but stage {} accepts {}",
            self.upstream + 1,
            self.produced,
            self.upstream + 2,
            self.accepted
        )
    }
}

/// Check every adjacent `(accepts, generates)` pair of a sequence of stages
pub fn check_chain(
    stages: &[(TypeDescriptor, TypeDescriptor)],
) -> Result<(), Incompatibility> {
    for (i, pair) in stages.windows(2).enumerate() {
        let produced = &pair[0].1;
        let accepted = &pair[1].0;
        if !is_compatible(produced, accepted) {
            return Err(Incompatibility {
                upstream: i,
                produced: produced.clone(),
                accepted: accepted.clone(),
            });
        }
    }
    Ok(())
}
