//! Working-hours command.

use super::{load_config, runtime, spinner};
use anyhow::Result;
use clinica_core::WorkingHoursEntry;
use clinica_fetch::DocumentSource;
use clinica_ingest::ClinicScraper;
use colored::Colorize;

pub fn run(source: Option<String>, json: bool) -> Result<()> {
    let config = load_config()?;
    let mut scraper = ClinicScraper::from_config(&config)?;
    if let Some(location) = source {
        scraper = scraper.with_hours_source(DocumentSource::parse(&location));
    }

    let pb = spinner("Fetching working hours")?;
    let entries = runtime()?.block_on(scraper.scrape_working_hours());
    pb.finish_and_clear();

    let Some(entries) = entries? else {
        println!(
            "{} No \"{}\" block found on the page.",
            "Note:".yellow().bold(),
            config.extraction.anchor
        );
        return Ok(());
    };

    if json {
        let maps: Vec<_> = entries.iter().map(WorkingHoursEntry::to_map).collect();
        println!("{}", serde_json::to_string_pretty(&maps)?);
        return Ok(());
    }

    println!("{}", "Working Hours".cyan().bold());
    println!("{}", "─".repeat(50));
    for entry in &entries {
        println!("  {} {}", entry.day.white(), entry.hours.green());
    }
    if entries.is_empty() {
        println!("{}", "  (no schedule lines)".dimmed());
    }

    Ok(())
}
