//! Price-list command.

use super::{load_config, runtime, spinner};
use anyhow::Result;
use clinica_core::format_price;
use clinica_fetch::DocumentSource;
use clinica_ingest::ClinicScraper;
use colored::Colorize;

pub fn run(source: Option<String>, detailed: bool, json: bool) -> Result<()> {
    let config = load_config()?;
    let mut scraper = ClinicScraper::from_config(&config)?;
    if let Some(location) = source {
        scraper = scraper.with_price_source(DocumentSource::parse(&location));
    }

    let pb = spinner("Reading price list")?;
    let services = runtime()?.block_on(scraper.scrape_services());
    pb.finish_and_clear();
    let services = services?;

    if json {
        println!("{}", serde_json::to_string_pretty(&services)?);
        return Ok(());
    }

    if services.is_empty() {
        println!("{}", "No services found.".yellow());
        return Ok(());
    }

    println!("{}", "Services".cyan().bold());
    println!("{}", "─".repeat(70));

    for service in &services {
        if detailed {
            println!("{}\n", service.formatted_info());
        } else {
            println!(
                "  {:<8} {:<8} {} {}",
                service.article.dimmed(),
                service.code.yellow(),
                service.name.white(),
                format!("{} ₽", format_price(service.price)).green()
            );
        }
    }

    let unpriced = services.iter().filter(|s| s.price == 0.0).count();
    println!();
    println!("{} {}", "Total:".green().bold(), services.len());
    if unpriced > 0 {
        println!(
            "{} {} without a readable price",
            "Note:".yellow().bold(),
            unpriced
        );
    }

    Ok(())
}
