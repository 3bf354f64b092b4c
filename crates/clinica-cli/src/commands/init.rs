//! Initialize Clinica.

use super::get_paths;
use anyhow::{Context, Result};
use clinica_config::Config;
use colored::Colorize;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    // Check if already initialized
    if paths.is_initialized() {
        println!(
            "{} Clinica is already initialized.",
            "Note:".yellow().bold()
        );
        println!("  Config: {}", paths.config_file.display());
        println!("  Categories: {}", paths.categories_file.display());
        return Ok(());
    }

    println!("{}", "Initializing Clinica...".cyan().bold());

    paths
        .ensure_dirs()
        .context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file)
        .context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    // Keep a category file the user already has
    if !paths.categories_file.exists() {
        std::fs::write(&paths.categories_file, Config::default_categories_string())
            .context("Failed to create category file")?;
        println!(
            "  {} Created categories: {}",
            "✓".green(),
            paths.categories_file.display()
        );
    }

    println!();
    println!("{}", "Clinica initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Review sources: {}",
        "clinica config edit".cyan()
    );
    println!(
        "  2. Check extraction: {}",
        "clinica hours && clinica services".cyan()
    );
    println!(
        "  3. Produce records: {}",
        "clinica process -o records.json".cyan()
    );

    Ok(())
}
