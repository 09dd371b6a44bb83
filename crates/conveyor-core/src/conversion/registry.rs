//! Registry of conversion units, keyed by identifier
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

use super::built_in::{AnyToString, ChangeCase, MovingAverage, PassThrough, StringToNumber};
use super::{Chain, Conversion};
use crate::error::{Error, Result};
use crate::swap::Swap;
use crate::types::TypeDescriptor;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Creates a unit with its default configuration
pub type Factory = fn() -> Box<dyn Conversion>;

/// A registered unit
#[derive(Clone)]
pub struct UnitEntry {
    pub id: String,
    pub description: String,
    factory: Factory,
}

impl UnitEntry {
    /// Instantiate the unit
    pub fn create(&self) -> Box<dyn Conversion> {
        (self.factory)()
    }

    /// Listing of the unit with its default configuration
    pub fn info(&self) -> UnitInfo {
        let unit = self.create();
        UnitInfo {
            id: self.id.clone(),
            description: self.description.clone(),
            accepts: unit.accepts(),
            generates: unit.generates(),
            streaming: unit.is_streaming(),
            requires_set_up: unit.requires_set_up(),
        }
    }
}

impl fmt::Debug for UnitEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitEntry")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}

/// Serializable description of a registered unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitInfo {
    pub id: String,
    pub description: String,
    pub accepts: TypeDescriptor,
    pub generates: TypeDescriptor,
    pub streaming: bool,
    pub requires_set_up: bool,
}

/// Units available by identifier
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    entries: BTreeMap<String, UnitEntry>,
}

impl UnitRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in unit that works without configuration
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("pass-through", "Forward the input unchanged", || {
            Box::new(PassThrough::new())
        });
        registry.register("any-to-string", "Render any value as a string", || {
            Box::new(AnyToString::new())
        });
        registry.register("string-to-number", "Parse a string as an integer", || {
            Box::new(StringToNumber::default())
        });
        registry.register("change-case", "Upper-case a string", || {
            Box::new(ChangeCase::default())
        });
        registry.register(
            "moving-average",
            "Average of the last five numbers seen (streaming)",
            || Box::new(MovingAverage::default()),
        );
        registry.register(
            "swap",
            "Deep-copy an object graph and replace values in it",
            || Box::new(Swap::new()),
        );
        registry
    }

    /// Register a unit, replacing any previous entry with the same identifier
    pub fn register(
        &mut self,
        id: impl Into<String>,
        description: impl Into<String>,
        factory: Factory,
    ) {
        let id = id.into();
        self.entries.insert(
            id.clone(),
            UnitEntry {
                id,
                description: description.into(),
                factory,
            },
        );
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&UnitEntry> {
        self.entries.get(id)
    }

    /// Instantiate the unit registered under `id`
    pub fn create(&self, id: &str) -> Result<Box<dyn Conversion>> {
        self.entries
            .get(id)
            .map(UnitEntry::create)
            .ok_or_else(|| Error::UnknownUnit {
                id: id.to_string(),
                available: self.ids().map(str::to_string).collect(),
            })
    }

    /// Entries sorted by identifier
    pub fn entries(&self) -> impl Iterator<Item = &UnitEntry> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Listing of every entry, sorted by identifier
    pub fn describe(&self) -> Vec<UnitInfo> {
        self.entries().map(UnitEntry::info).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a chain from unit identifiers, in order
    pub fn chain_from_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<Chain> {
        let stages = ids
            .iter()
            .map(|id| self.create(id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let mut chain = Chain::new();
        chain.set_stages(stages);
        Ok(chain)
    }
}
