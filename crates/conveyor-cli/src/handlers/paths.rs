//! Paths command handler

use super::utils::load_document;
use crate::cli::PathsArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::{OutputWriter, PathEntry, PathListing};
use conveyor_core::{Node, Traverser, Value, Visit};
use tracing::info;

/// Handle the paths command
pub fn handle_paths(args: PathsArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let root = load_document(args.file.as_deref())?;
    let listing = list_paths(&root, config.engine.detect_cycles)?;

    info!(
        paths = listing.paths.len(),
        failures = listing.failures.len(),
        "listed document paths"
    );
    if !listing.failures.is_empty() {
        output.warning(&format!(
            "{} propert(ies) could not be read",
            listing.failures.len()
        ))?;
    }
    output.paths(&listing, args.types)
}

/// Visit every location reachable from `root`
pub fn list_paths(root: &Value, detect_cycles: bool) -> Result<PathListing> {
    let mut paths = Vec::new();
    let report = Traverser::new()
        .with_cycle_detection(detect_cycles)
        .traverse(root, &mut |node: &Node| {
            paths.push(PathEntry {
                path: node.path().to_string(),
                value_type: node.value().type_descriptor(),
            });
            Visit::Continue
        })
        .map_err(conveyor_core::Error::from)?;

    Ok(PathListing {
        paths,
        failures: report.failures,
    })
}
