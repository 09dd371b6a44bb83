//! Swap command handler

use super::utils::{load_document, parse_inline, save_document};
use crate::cli::SwapArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use conveyor_core::{
    Conversion, PathSwap, PropertyPath, Swap, SwapPolicy, TypeDescriptor, TypeSwap,
};
use tracing::{info, instrument};

/// Handle the swap command
#[instrument(skip_all, fields(at = ?args.at, types = ?args.types))]
pub fn handle_swap(args: SwapArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let policies = policies(&args.at, &args.types, &args.with)?;
    let root = load_document(args.file.as_deref())?;

    let mut unit = Swap::new()
        .with_no_copy(args.no_copy || config.engine.no_copy)
        .with_cycle_detection(config.engine.detect_cycles);
    for policy in policies {
        unit.add_policy(policy);
    }

    unit.set_input(root);
    unit.convert()?;
    let document = unit
        .take_output()
        .ok_or_else(|| anyhow::anyhow!("swap produced no output"))?
        .to_json()?;
    let report = unit.last_report().cloned().unwrap_or_default();

    info!(
        swapped = report.swapped.len(),
        failures = report.failures.len(),
        "swap finished"
    );
    if !report.failures.is_empty() {
        output.warning(&format!("{} replacement(s) were refused", report.failures.len()))?;
    }

    match args.save_to {
        Some(path) => {
            save_document(&path, &document)?;
            output.success(&format!("✓ Document saved to {}", path.display()))?;
            output.swap_report(&report)
        }
        None if output.is_human() => {
            output.section("Document")?;
            output.data(&document)?;
            output.section("Swaps")?;
            output.swap_report(&report)
        }
        None => output.data(&serde_json::json!({
            "document": document,
            "report": report,
        })),
    }
}

/// Pair every `--at` and then every `--type` with the `--with` at the same position
fn policies(at: &[String], types: &[String], with: &[String]) -> Result<Vec<Box<dyn SwapPolicy>>> {
    if at.is_empty() && types.is_empty() {
        return Err(Error::invalid_args("give at least one --at PATH or --type TYPE"));
    }
    if at.len() + types.len() != with.len() {
        return Err(Error::invalid_args(format!(
            "each --at and --type needs one --with ({} target(s), {} replacement(s))",
            at.len() + types.len(),
            with.len()
        )));
    }

    let (path_values, type_values) = with.split_at(at.len());
    let mut policies: Vec<Box<dyn SwapPolicy>> = Vec::with_capacity(with.len());

    for (path, replacement) in at.iter().zip(path_values) {
        let path: PropertyPath = path.parse()?;
        policies.push(Box::new(PathSwap::new(path, parse_inline("--with", replacement)?)));
    }
    for (ty, replacement) in types.iter().zip(type_values) {
        let target: TypeDescriptor = ty.parse()?;
        policies.push(Box::new(TypeSwap::new(target, parse_inline("--with", replacement)?)));
    }

    Ok(policies)
}
