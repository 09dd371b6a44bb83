//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Conveyor CLI - Typed conversion chains and object-graph swapping
///
/// Lists the registered conversion units, checks and runs chains of them,
/// and walks or rewrites JSON and YAML documents as object graphs.
#[derive(Parser, Debug)]
#[command(
    name = "conveyor",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CONVEYOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results (defaults to the configured format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the registered conversion units
    Units(UnitsArgs),

    /// Check that a chain of units is type compatible
    Check(CheckArgs),

    /// Run a chain of units over an input value
    Run(RunArgs),

    /// List every property path reachable in a document
    Paths(PathsArgs),

    /// Replace values inside a document
    Swap(SwapArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the units command
#[derive(Parser, Debug)]
pub struct UnitsArgs {
    /// Only describe this unit
    #[arg(value_name = "UNIT")]
    pub id: Option<String>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Unit identifiers, in chain order
    #[arg(value_name = "UNIT", required = true, num_args = 1..)]
    pub units: Vec<String>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Unit identifiers, in chain order (repeat the flag for each stage)
    #[arg(short, long = "unit", value_name = "UNIT", required = true)]
    pub units: Vec<String>,

    /// Read the input value from a JSON or YAML file
    #[arg(short, long, value_name = "FILE", conflicts_with = "value")]
    pub input: Option<PathBuf>,

    /// Inline JSON input value (stdin is read when neither this nor --input is given)
    #[arg(long, value_name = "JSON")]
    pub value: Option<String>,

    /// Stop the chain after this many seconds
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Save the output value to a file
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,

    /// Show execution metrics
    #[arg(long)]
    pub metrics: bool,
}

/// Arguments for the paths command
#[derive(Parser, Debug)]
pub struct PathsArgs {
    /// JSON or YAML document (stdin if not specified)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Show the runtime type of each value
    #[arg(long)]
    pub types: bool,
}

/// Arguments for the swap command
#[derive(Parser, Debug)]
pub struct SwapArgs {
    /// JSON or YAML document (stdin if not specified)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Path of a value to replace, paired with the --with at the same position
    #[arg(long = "at", value_name = "PATH")]
    pub at: Vec<String>,

    /// Replace every value of a type, paired with the --with after the --at values
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<String>,

    /// JSON replacement value
    #[arg(long = "with", value_name = "JSON", required = true)]
    pub with: Vec<String>,

    /// Rewrite the parsed input in place instead of a copy
    #[arg(long)]
    pub no_copy: bool,

    /// Save the swapped document to a file
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// Write a configuration file with default values
    Init(ConfigInitArgs),

    /// Print the configuration file locations that are searched
    Path,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (defaults to the user config location)
    #[arg(value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Force overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    #[default]
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
