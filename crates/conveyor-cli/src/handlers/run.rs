//! Run command handler

use super::utils::{load_document, parse_inline, save_document};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use conveyor_core::{Chain, Conversion, Diagnostic, DiagnosticKind, UnitRegistry, Value};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// How long a stopped chain gets to wind down before it is abandoned
const STOP_GRACE: Duration = Duration::from_secs(2);

/// Handle the run command
#[instrument(skip_all, fields(units = ?args.units))]
pub async fn handle_run(args: RunArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("run_command", &args.units.join(" -> "));

    let input = match (&args.value, &args.input) {
        (Some(text), _) => parse_inline("--value", text)?,
        (None, Some(path)) => load_document(Some(path))?,
        (None, None) => load_document(None)?,
    };

    let registry = UnitRegistry::with_defaults();
    let mut chain = registry.chain_from_ids(&args.units[..])?;
    // reject incompatible chains before spawning anything
    chain.verify()?;
    let stages = chain.len();

    let timeout = args.timeout.or(config.engine.timeout_secs);
    let spinner = output.spinner(&format!("Running {} stage(s)...", stages));

    info!(stages, timeout_secs = ?timeout, "starting chain");
    let result = execute(chain, input, timeout, STOP_GRACE).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let value = result?;
    let elapsed = timer.elapsed();
    debug!(elapsed_ms = elapsed.as_millis() as u64, "chain finished");

    let json = value.to_json()?;

    if args.metrics {
        output.section("Execution Metrics")?;
        output.info(&format!("  • Stages: {}", stages))?;
        output.info(&format!("  • Execution Time: {:.3}s", elapsed.as_secs_f64()))?;
        output.info(&format!("  • Output Type: {}", value.type_descriptor()))?;
    }

    match args.save_to {
        Some(path) => {
            save_document(&path, &json)?;
            output.success(&format!("✓ Output saved to {}", path.display()))?;
        }
        None => {
            output.section("Output")?;
            output.data(&json)?;
        }
    }

    Ok(())
}

/// Run the chain on a blocking thread, stopping it once the deadline passes.
///
/// Stops are honoured between stages and inside units that poll for them; a
/// chain that completes within `grace` of the deadline still returns its
/// output. One that does not is abandoned and reported as a timeout.
async fn execute(
    mut chain: Chain,
    input: Value,
    timeout: Option<u64>,
    grace: Duration,
) -> Result<Value> {
    let stop = chain.stop_handle();
    let mut task = tokio::task::spawn_blocking(move || {
        chain.set_input(input);
        chain.convert()?;
        chain.take_output().ok_or_else(|| Diagnostic::Transform {
            message: "chain produced no output".to_string(),
            accepts: chain.accepts(),
            generates: chain.generates(),
        })
    });

    let joined = match timeout {
        None => task.await?,
        Some(seconds) => match tokio::time::timeout(Duration::from_secs(seconds), &mut task).await {
            Ok(joined) => joined?,
            Err(_) => {
                warn!(seconds, "deadline passed, stopping chain");
                stop.stop();
                match tokio::time::timeout(grace, &mut task).await {
                    Ok(joined) => match joined? {
                        Err(diagnostic) if diagnostic.kind() == DiagnosticKind::Stopped => {
                            return Err(Error::Timeout { seconds })
                        }
                        other => other,
                    },
                    Err(_) => {
                        warn!(seconds, "chain ignored the stop request, abandoning it");
                        return Err(Error::Timeout { seconds });
                    }
                }
            }
        },
    };

    Ok(joined?)
}
