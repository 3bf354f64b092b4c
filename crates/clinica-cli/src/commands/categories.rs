//! Category listing and ad-hoc classification.

use super::load_config;
use anyhow::{Context, Result};
use clinica_ingest::{CategoryMap, CategoryTagger};
use colored::Colorize;
use std::path::PathBuf;

pub fn run(classify: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let path = file
        .or_else(|| config.categories_path())
        .context("No category file configured")?;

    let map = CategoryMap::load(&path)
        .with_context(|| format!("Failed to load categories from {}", path.display()))?;

    if let Some(name) = classify {
        let tagger = CategoryTagger::new(map, &config.tagging.fallback_tag);
        let tags = tagger.tags_for(&name);
        println!("{} {}", name.white(), format!("[{}]", tags.joined()).yellow());
        return Ok(());
    }

    if map.is_empty() {
        println!("{}", "No categories defined.".dimmed());
        return Ok(());
    }

    println!("{}", "Categories".cyan().bold());
    println!("{}", "─".repeat(50));
    for category in map.categories() {
        println!(
            "  {} {} {}",
            "•".yellow(),
            category.label.white(),
            format!("({})", category.keywords.join(", ")).dimmed()
        );
    }

    Ok(())
}
