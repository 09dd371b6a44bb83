//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod check;
mod completions;
mod config;
mod paths;
mod run;
mod swap;
mod units;
mod utils;

pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config;
pub use paths::handle_paths;
pub use run::handle_run;
pub use swap::handle_swap;
pub use units::handle_units;
