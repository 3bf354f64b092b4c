//! Full pipeline command.

use super::{load_config, runtime, spinner};
use anyhow::{Context, Result};
use clinica_core::OutputFormat;
use clinica_fetch::DocumentSource;
use clinica_ingest::{ClinicScraper, NormalizationPipeline};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Options for one pipeline run.
pub struct ProcessArgs {
    pub hours_source: Option<String>,
    pub price_source: Option<String>,
    pub categories: Option<PathBuf>,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub no_hours: bool,
}

pub fn run(args: ProcessArgs) -> Result<()> {
    let mut config = load_config()?;
    if let Some(path) = args.categories {
        config.sources.categories_file = Some(path.display().to_string());
    }

    let format = match args.format.as_deref() {
        Some(value) => OutputFormat::parse(value)?,
        None => config.output.format,
    };
    let include_hours = config.tagging.include_hours && !args.no_hours;

    let mut scraper = ClinicScraper::from_config(&config)?;
    if let Some(location) = args.hours_source {
        scraper = scraper.with_hours_source(DocumentSource::parse(&location));
    }
    if let Some(location) = args.price_source {
        scraper = scraper.with_price_source(DocumentSource::parse(&location));
    }
    let pipeline = NormalizationPipeline::from_config(&config);

    let pb = spinner("Fetching clinic documents")?;
    let snapshot = runtime()?.block_on(scraper.scrape());
    pb.finish_and_clear();

    let records = pipeline.run(&snapshot, include_hours);
    let rendered = format.render(&records, config.output.pretty)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} records to {}", records.len(), path.display());
        }
        None => println!("{}", rendered),
    }

    eprintln!();
    eprintln!("{}", "Summary".cyan().bold());
    eprintln!(
        "  Working hours: {}",
        match &snapshot.working_hours {
            Some(entries) => entries.len().to_string().green(),
            None => "unavailable".yellow(),
        }
    );
    eprintln!(
        "  Services:      {}",
        match &snapshot.services {
            Some(services) => services.len().to_string().green(),
            None => "unavailable".yellow(),
        }
    );
    eprintln!(
        "  Records:       {} ({})",
        records.len().to_string().green().bold(),
        format
    );
    if let Some(path) = &args.output {
        eprintln!("  Output:        {}", path.display().to_string().dimmed());
    }

    Ok(())
}
