//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (TOML/YAML/JSON)
//! - Environment variables (through clap and the logging setup)
//! - Command-line arguments

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Chain and traversal settings
    pub engine: EngineConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no -v flag is given (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: String,

    /// Log file path
    pub file: Option<PathBuf>,

    /// Include thread IDs
    pub thread_ids: bool,
}

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Swap in place instead of on a copy
    pub no_copy: bool,

    /// Skip objects already visited during traversal
    pub detect_cycles: bool,

    /// Default deadline for `run`, in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
            progress: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: "compact".to_string(),
            file: None,
            thread_ids: false,
        }
    }
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["compact", "full", "json"];

impl Config {
    /// Load configuration from a file, picking the parser by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match extension(path) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => toml::from_str(&content).map_err(|e| Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: format!("TOML ({})", e.message()),
            })?,
        };

        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration file locations, in search order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("conveyor.toml"),
            PathBuf::from(".conveyor.toml"),
            PathBuf::from(".conveyor.yaml"),
            PathBuf::from(".conveyor.json"),
        ];

        if let Some(user) = Self::user_config_path() {
            paths.push(user);
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".conveyor.toml"));
        }

        paths
    }

    /// Per-user configuration file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("conveyor").join("config.toml"))
    }

    /// Reject values the CLI cannot act on
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = &self.logging.level {
            if !LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(Error::config(format!(
                    "logging.level must be one of {}, got '{}'",
                    LEVELS.join(", "),
                    level
                )));
            }
        }
        if !LOG_FORMATS.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "logging.format must be one of {}, got '{}'",
                LOG_FORMATS.join(", "),
                self.logging.format
            )));
        }
        if self.engine.timeout_secs == Some(0) {
            return Err(Error::config("engine.timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    /// Save configuration to a file, picking the format by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match extension(path) {
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            Some("json") => serde_json::to_string_pretty(self)?,
            _ => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}
