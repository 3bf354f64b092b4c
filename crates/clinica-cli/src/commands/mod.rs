//! CLI command implementations.

pub mod categories;
pub mod config;
pub mod hours;
pub mod init;
pub mod process;
pub mod services;

use anyhow::{Context, Result};
use clinica_config::{AppPaths, Config};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::runtime::Runtime;

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load the configuration, using defaults when clinica is not initialized.
pub fn load_config() -> Result<Config> {
    let paths = get_paths()?;
    Config::load_from(&paths.config_file).context("Failed to load config")
}

/// Runtime for the async fetch layer.
pub fn runtime() -> Result<Runtime> {
    Runtime::new().context("Failed to create async runtime")
}

/// Spinner shown while documents are fetched.
pub fn spinner(message: impl Into<String>) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
