//! Check command handler

use crate::cli::CheckArgs;
use crate::error::Result;
use crate::output::{CheckReport, OutputWriter, StageRow};
use conveyor_core::{Chain, Conversion, UnitRegistry};
use tracing::info;

/// Handle the check command.
///
/// The report is written in every case; an incompatible chain then fails
/// with its configuration diagnostic.
pub fn handle_check(args: CheckArgs, output: &mut OutputWriter) -> Result<()> {
    let registry = UnitRegistry::with_defaults();
    let mut chain = registry.chain_from_ids(&args.units[..])?;

    let verdict = chain.verify();
    info!(stages = chain.len(), compatible = verdict.is_ok(), "checked chain");

    output.check_report(&report(&chain, verdict.as_ref().err().map(|d| d.to_string())))?;
    verdict?;
    Ok(())
}

fn report(chain: &Chain, problem: Option<String>) -> CheckReport {
    let stages = chain
        .stages()
        .iter()
        .enumerate()
        .map(|(i, stage)| StageRow {
            index: i + 1,
            unit: stage.id().to_string(),
            accepts: stage.accepts(),
            generates: stage.generates(),
        })
        .collect();

    CheckReport {
        stages,
        compatible: problem.is_none(),
        problem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_core::{DiagnosticKind, TypeDescriptor};

    #[test]
    fn test_report_rows_follow_chain_order() {
        let registry = UnitRegistry::with_defaults();
        let mut chain = registry
            .chain_from_ids(&["any-to-string", "string-to-number", "moving-average"])
            .unwrap();
        assert!(chain.verify().is_ok());

        let report = report(&chain, None);
        assert!(report.compatible);
        assert_eq!(report.stages.len(), 3);
        assert_eq!(report.stages[1].unit, "string-to-number");
        assert_eq!(report.stages[2].index, 3);
        assert_eq!(report.stages[2].generates, TypeDescriptor::Float);
    }

    #[test]
    fn test_incompatible_chain_is_a_configuration_failure() {
        let registry = UnitRegistry::with_defaults();
        let mut chain = registry
            .chain_from_ids(&["moving-average", "change-case"])
            .unwrap();

        let diagnostic = chain.verify().unwrap_err();
        assert_eq!(diagnostic.kind(), DiagnosticKind::Configuration);

        let report = report(&chain, Some(diagnostic.to_string()));
        assert!(!report.compatible);
        assert!(report
            .problem
            .unwrap()
            .contains("stage 1 generates float but stage 2 accepts string"));
    }
}
