//! Logging setup for the Conveyor CLI
//!
//! This module provides:
//! - Session ID generation and tracking
//! - Performance timing spans
//! - Structured logging setup
//! - Multiple output formats (compact, full, JSON) to stderr or a file

use crate::config;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Identifier of the current CLI session
static SESSION_ID: OnceLock<String> = OnceLock::new();

/// Effective logging settings
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Write to stderr
    pub console: bool,
    /// Optional file output path
    pub file: Option<PathBuf>,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
    /// Include span close events
    pub span_events: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact format for everyday use
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl LogFormat {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "full" => Some(Self::Full),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            file: None,
            thread_ids: false,
            source_location: false,
            span_events: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {}
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
                config.span_events = true;
            }
        }

        config
    }

    /// Apply the `[logging]` section of the configuration file.
    ///
    /// The file level only applies when no `-v` flag raised the level.
    pub fn merge_with_file(&mut self, file: &config::LoggingConfig, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &file.level {
                self.level = level.to_lowercase();
            }
        }
        if let Some(format) = LogFormat::parse(&file.format) {
            if self.format == LogFormat::Compact {
                self.format = format;
            }
        }
        if file.file.is_some() {
            self.file = file.file.clone();
        }
        self.thread_ids |= file.thread_ids;
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("CONVEYOR_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => eprintln!("Ignoring invalid CONVEYOR_LOG_FORMAT: {}", format),
            }
        }

        if let Ok(file) = std::env::var("CONVEYOR_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }

        if let Ok(console) = std::env::var("CONVEYOR_LOG_CONSOLE") {
            self.console = console.to_lowercase() == "true" || console == "1";
        }
    }
}

/// Initialize the global logging system.
///
/// The returned guard flushes file output when dropped and must outlive the
/// command.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let (writer, guard, ansi) = match &config.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| Error::config(format!("Invalid log file: {}", path.display())))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        None if config.console => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            std::io::stderr().is_terminal(),
        ),
        None => (BoxMakeWriter::new(std::io::sink), None, false),
    };

    let span_events = if config.span_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_span_events(span_events);

    let installed = match config.format {
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(builder.with_ansi(ansi).compact().finish())
        }
        LogFormat::Full => tracing::subscriber::set_global_default(builder.with_ansi(ansi).finish()),
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish())
        }
    };
    installed.map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;

    let session_id = SESSION_ID.get_or_init(generate_session_id);
    tracing::debug!(
        session_id = %session_id,
        config = ?config,
        "Logging system initialized"
    );

    Ok(guard)
}

/// Generate a unique identifier for this session
pub fn generate_session_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

/// Get the current session ID
pub fn current_session_id() -> Option<&'static str> {
    SESSION_ID.get().map(|s| s.as_str())
}

/// Create a span with session ID and timing
pub fn create_operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        session_id = current_session_id().unwrap_or("unknown"),
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

/// Performance timing utilities
pub mod timing {
    use std::time::{Duration, Instant};
    use tracing::Span;

    /// A timer that logs its duration when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, None),
                operation: operation.to_string(),
            }
        }

        pub fn with_details(operation: &str, details: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, Some(details)),
                operation: operation.to_string(),
            }
        }

        /// Get elapsed time without finishing the timer
        pub fn elapsed(&self) -> Duration {
            self.start.elapsed()
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "Operation completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_from_verbosity() {
        let config = LoggingConfig::from_verbosity(0);
        assert_eq!(config.level, "warn");
        assert!(!config.source_location);

        let config = LoggingConfig::from_verbosity(2);
        assert_eq!(config.level, "debug");
        assert!(config.source_location);

        let config = LoggingConfig::from_verbosity(3);
        assert_eq!(config.level, "trace");
        assert!(config.thread_ids);
        assert!(config.span_events);
    }

    #[test]
    fn test_file_level_only_without_flags() {
        let file = config::LoggingConfig {
            level: Some("INFO".to_string()),
            format: "json".to_string(),
            file: Some(PathBuf::from("conveyor.log")),
            thread_ids: true,
        };

        let mut quiet = LoggingConfig::from_verbosity(0);
        quiet.merge_with_file(&file, 0);
        assert_eq!(quiet.level, "info");
        assert_eq!(quiet.format, LogFormat::Json);
        assert_eq!(quiet.file, Some(PathBuf::from("conveyor.log")));
        assert!(quiet.thread_ids);

        let mut verbose = LoggingConfig::from_verbosity(2);
        verbose.merge_with_file(&file, 2);
        assert_eq!(verbose.level, "debug");
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert!(a.starts_with("run_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_timer_measures() {
        let timer = timing::Timer::with_details("test", "unit");
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(timer.elapsed() >= std::time::Duration::from_millis(2));
    }
}
