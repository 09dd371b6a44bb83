//! Units command handler

use crate::cli::UnitsArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use conveyor_core::UnitRegistry;

/// Handle the units command
pub fn handle_units(args: UnitsArgs, output: &mut OutputWriter) -> Result<()> {
    let registry = UnitRegistry::with_defaults();

    let units = match args.id {
        Some(id) => {
            let entry = registry
                .get(&id)
                .ok_or_else(|| conveyor_core::Error::UnknownUnit {
                    id: id.clone(),
                    available: registry.ids().map(String::from).collect(),
                })?;
            vec![entry.info()]
        }
        None => registry.describe(),
    };

    output.units(&units)
}
