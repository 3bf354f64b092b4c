//! Configuration commands.

use super::get_paths;
use anyhow::{Context, Result};
use clinica_config::Config;
use clinica_core::OutputFormat;
use colored::Colorize;
use std::process::Command;

pub fn show() -> Result<()> {
    let paths = get_paths()?;

    if !paths.config_file.exists() {
        anyhow::bail!("Config file not found. Run 'clinica init' first.");
    }

    let contents = std::fs::read_to_string(&paths.config_file)
        .context("Failed to read config file")?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("{}", contents);

    Ok(())
}

pub fn edit() -> Result<()> {
    let paths = get_paths()?;

    if !paths.config_file.exists() {
        anyhow::bail!("Config file not found. Run 'clinica init' first.");
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| {
        if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else {
            "nano".to_string()
        }
    });

    let parts: Vec<&str> = editor.split_whitespace().collect();
    let (cmd, args) = parts.split_first().context("Invalid editor command")?;

    let status = Command::new(cmd)
        .args(args)
        .arg(&paths.config_file)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with error");
    }

    // Catch mistakes before the next run trips over them
    Config::load_from(&paths.config_file).context("Edited config is invalid")?;

    println!(
        "{} Configuration saved.",
        "✓".green()
    );

    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let paths = get_paths()?;

    let mut config = Config::load_from(&paths.config_file)
        .context("Failed to load config")?;

    apply(&mut config, key, value)?;

    config.save_to(&paths.config_file)
        .context("Failed to save config")?;

    println!(
        "{} Set {} = {}",
        "✓".green(),
        key.cyan(),
        value
    );

    Ok(())
}

/// Assign `value` to the dotted `key` (e.g. `extraction.anchor`).
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["sources", "hours_url"] => config.sources.hours_url = value.to_string(),
        ["sources", "price_list_url"] => config.sources.price_list_url = value.to_string(),
        ["sources", "price_grid_file"] => config.sources.price_grid_file = optional(value),
        ["sources", "categories_file"] => config.sources.categories_file = optional(value),
        ["sources", "timeout_seconds"] => {
            config.sources.timeout_seconds = value.parse()
                .context("Invalid timeout value")?;
        }
        ["sources", "user_agent"] => config.sources.user_agent = value.to_string(),
        ["extraction", "anchor"] => config.extraction.anchor = value.to_string(),
        ["extraction", "stop_phrase"] => config.extraction.stop_phrase = value.to_string(),
        ["extraction", "initial_marker"] => config.extraction.initial_marker = value.to_string(),
        ["extraction", "followup_marker"] => config.extraction.followup_marker = value.to_string(),
        ["extraction", "max_empty_fields"] => {
            config.extraction.max_empty_fields = value.parse()
                .context("Invalid max_empty_fields value")?;
        }
        ["tagging", "fallback_tag"] => config.tagging.fallback_tag = value.to_string(),
        ["tagging", "service_category"] => config.tagging.service_category = value.to_string(),
        ["tagging", "hours_category"] => config.tagging.hours_category = value.to_string(),
        ["tagging", "hours_tag"] => config.tagging.hours_tag = value.to_string(),
        ["tagging", "include_hours"] => {
            config.tagging.include_hours = value.parse()
                .context("Invalid boolean value")?;
        }
        ["output", "format"] => config.output.format = OutputFormat::parse(value)?,
        ["output", "pretty"] => {
            config.output.pretty = value.parse()
                .context("Invalid boolean value")?;
        }
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    }

    Ok(())
}

/// Empty string clears an optional setting.
fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
