//! Conveyor CLI - Command-line interface for typed conversion chains
//!
//! This is the main entry point for the Conveyor CLI application, providing
//! commands for listing units, checking and running chains, and walking or
//! rewriting documents as object graphs.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    // Configuration problems are reported after logging is up
    let config = Config::load_with_file(cli.config.as_deref());

    let guard = match init_logging(&cli, config.as_ref().ok()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e),
    };

    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            e.exit_code()
        }
    };

    // flush file logging before exiting
    drop(guard);
    process::exit(code);
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = cli.output.unwrap_or(config.output.format);
    let use_color = cli.use_color() && config.output.color;
    let mut output = OutputWriter::new(format, use_color, cli.quiet, config.output.progress);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        format = ?format,
        "Executing command"
    );

    match cli.command {
        Commands::Units(args) => handlers::handle_units(args, &mut output),
        Commands::Check(args) => handlers::handle_check(args, &mut output),
        Commands::Run(args) => handlers::handle_run(args, &config, &mut output).await,
        Commands::Paths(args) => handlers::handle_paths(args, &config, &mut output),
        Commands::Swap(args) => handlers::handle_swap(args, &config, &mut output),
        Commands::Config(args) => {
            handlers::handle_config(args, &config, cli.config.as_deref(), &mut output)
        }
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: Option<&Config>) -> Result<Option<WorkerGuard>> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);

    if let Some(config) = config {
        logging_config.merge_with_file(&config.logging, verbosity);
    }
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
