//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable) with specialised human
//! renderings for unit listings, chain checks, path listings and swap reports.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use conveyor_core::{AccessFailure, SwapReport, TypeDescriptor, UnitInfo};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use tracing::trace;

/// One stage of a checked chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRow {
    /// 1-based position in the chain
    pub index: usize,
    pub unit: String,
    pub accepts: TypeDescriptor,
    pub generates: TypeDescriptor,
}

/// Outcome of a chain compatibility check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub stages: Vec<StageRow>,
    pub compatible: bool,
    /// Description of the first incompatible pair
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

/// One visited location of a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub value_type: TypeDescriptor,
}

/// Every location of a document, plus unreadable properties
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathListing {
    pub paths: Vec<PathEntry>,
    pub failures: Vec<AccessFailure>,
}

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format the registry listing
    fn format_units(&self, units: &[UnitInfo]) -> Result<String>;

    /// Format a chain compatibility report
    fn format_check(&self, report: &CheckReport) -> Result<String>;

    /// Format a path listing, optionally with types
    fn format_paths(&self, listing: &PathListing, with_types: bool) -> Result<String>;

    /// Format the outcome of a swap
    fn format_swap_report(&self, report: &SwapReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => {
                Ok(serde_json::to_string_pretty(value)?)
            }
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_units(&self, units: &[UnitInfo]) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_units_human(units)),
            _ => self.format(&units),
        }
    }

    fn format_check(&self, report: &CheckReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_check_human(report)),
            _ => self.format(report),
        }
    }

    fn format_paths(&self, listing: &PathListing, with_types: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_paths_human(listing, with_types)),
            _ => self.format(listing),
        }
    }

    fn format_swap_report(&self, report: &SwapReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_swap_report_human(report)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, show_progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: show_progress && !quiet && use_color,
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    #[cfg(test)]
    pub fn with_writer(format: OutputFormat, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color: false,
            show_progress: false,
            quiet: false,
            writer,
        }
    }

    /// Whether messages are for a human reader
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "writing data");
        self.finish_block(&formatted)
    }

    /// Write the registry listing
    pub fn units(&mut self, units: &[UnitInfo]) -> Result<()> {
        let formatted = self.format.format_units(units)?;
        self.finish_block(&formatted)
    }

    /// Write a chain compatibility report
    pub fn check_report(&mut self, report: &CheckReport) -> Result<()> {
        let formatted = self.format.format_check(report)?;
        self.finish_block(&formatted)
    }

    /// Write a path listing
    pub fn paths(&mut self, listing: &PathListing, with_types: bool) -> Result<()> {
        let formatted = self.format.format_paths(listing, with_types)?;
        self.finish_block(&formatted)
    }

    /// Write a swap report
    pub fn swap_report(&mut self, report: &SwapReport) -> Result<()> {
        let formatted = self.format.format_swap_report(report)?;
        self.finish_block(&formatted)
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    fn finish_block(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Render rows as aligned columns separated by two spaces
fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        format!("{}\n", line.trim_end())
    };

    let mut output = render(headers.to_vec());
    for row in rows {
        output.push_str(&render(row.iter().map(String::as_str).collect()));
    }
    output
}

fn format_units_human(units: &[UnitInfo]) -> String {
    if units.is_empty() {
        return "No units registered\n".to_string();
    }

    let rows: Vec<Vec<String>> = units
        .iter()
        .map(|unit| {
            let mut flags = Vec::new();
            if unit.streaming {
                flags.push("streaming");
            }
            if unit.requires_set_up {
                flags.push("set-up");
            }
            vec![
                unit.id.clone(),
                unit.accepts.to_string(),
                unit.generates.to_string(),
                flags.join(","),
                unit.description.clone(),
            ]
        })
        .collect();

    format_table(&["UNIT", "ACCEPTS", "GENERATES", "FLAGS", "DESCRIPTION"], &rows)
}

fn format_check_human(report: &CheckReport) -> String {
    let rows: Vec<Vec<String>> = report
        .stages
        .iter()
        .map(|stage| {
            vec![
                stage.index.to_string(),
                stage.unit.clone(),
                stage.accepts.to_string(),
                stage.generates.to_string(),
            ]
        })
        .collect();

    let mut output = format_table(&["#", "UNIT", "ACCEPTS", "GENERATES"], &rows);
    output.push('\n');
    match (&report.problem, report.compatible) {
        (Some(problem), _) => output.push_str(&format!("✗ Incompatible: {}\n", problem)),
        (None, true) => output.push_str(&format!(
            "✓ Chain of {} stage(s) is compatible\n",
            report.stages.len()
        )),
        (None, false) => output.push_str("✗ Incompatible\n"),
    }
    output
}

fn format_paths_human(listing: &PathListing, with_types: bool) -> String {
    let mut output = String::new();
    for entry in &listing.paths {
        let path = if entry.path.is_empty() { "<root>" } else { entry.path.as_str() };
        if with_types {
            output.push_str(&format!("{}  {}\n", path, entry.value_type));
        } else {
            output.push_str(path);
            output.push('\n');
        }
    }

    if !listing.failures.is_empty() {
        output.push_str(&format!("\n{} unreadable propert(ies):\n", listing.failures.len()));
        output.push_str(&format_failures(&listing.failures));
    }
    output
}

fn format_swap_report_human(report: &SwapReport) -> String {
    let mut output = format!(
        "Visited {} node(s), swapped {}\n",
        report.traversal.visited,
        report.swapped.len()
    );
    for path in &report.swapped {
        output.push_str(&format!("  • {}\n", path));
    }

    let failures: Vec<AccessFailure> = report
        .failures
        .iter()
        .chain(&report.traversal.failures)
        .cloned()
        .collect();
    if !failures.is_empty() {
        output.push_str(&format!("{} failure(s):\n", failures.len()));
        output.push_str(&format_failures(&failures));
    }
    if report.traversal.skipped_cycles > 0 {
        output.push_str(&format!(
            "Skipped {} repeated object(s)\n",
            report.traversal.skipped_cycles
        ));
    }
    output
}

fn format_failures(failures: &[AccessFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("  • {}: {}\n", failure.path, failure.error))
        .collect()
}
