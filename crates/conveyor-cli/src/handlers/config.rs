//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::path::Path;

/// Handle the config command
pub fn handle_config(
    args: ConfigArgs,
    config: &Config,
    explicit: Option<&Path>,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Path => handle_config_path(explicit, output),
    }
}

/// Handle config show subcommand
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = render(config, args.format)?;
    output.write(&content)?;
    if !content.ends_with('\n') {
        output.writeln("")?;
    }
    Ok(())
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => Config::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?,
    };

    if path.exists() && !args.force {
        return Err(Error::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save(&path)?;
    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Edit it to customize settings for your environment.")?;
    Ok(())
}

/// Handle config path subcommand
fn handle_config_path(explicit: Option<&Path>, output: &mut OutputWriter) -> Result<()> {
    if let Some(path) = explicit {
        output.writeln(&format!("{} (from --config / CONVEYOR_CONFIG)", path.display()))?;
        return Ok(());
    }

    let mut active_found = false;
    for path in Config::default_config_paths() {
        let marker = if path.exists() && !active_found {
            active_found = true;
            "active"
        } else if path.exists() {
            "shadowed"
        } else {
            "missing"
        };
        output.writeln(&format!("{:8} {}", marker, path.display()))?;
    }

    if !active_found {
        output.info("No configuration file found; using defaults")?;
    }
    Ok(())
}

fn render(config: &Config, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e))),
        ConfigFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        ConfigFormat::Yaml => Ok(serde_yaml::to_string(config)?),
    }
}
