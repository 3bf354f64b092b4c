//! Clinica CLI - Clinic document extraction for search indexing

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Clinica - Turn clinic schedules and price lists into search-ready records
#[derive(Parser)]
#[command(name = "clinica")]
#[command(author = "Lalo Morales <lalomorales22@github.com>")]
#[command(version)]
#[command(about = "Turn clinic schedules and price lists into search-ready records", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Clinica (create config and category file)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Extract the department working hours
    Hours {
        /// Page URL or local HTML file (default: from config)
        source: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract services and prices from the price list
    Services {
        /// PDF/JSON grid URL or local file (default: from config)
        source: Option<String>,

        /// Show every field of each service
        #[arg(short, long)]
        detailed: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the full pipeline and emit tagged text records
    Process {
        /// Working-hours page URL or file
        #[arg(long)]
        hours_source: Option<String>,

        /// Price list URL or file (PDF or JSON grid)
        #[arg(long)]
        price_source: Option<String>,

        /// Category keyword file
        #[arg(short, long)]
        categories: Option<PathBuf>,

        /// Output format: json, jsonl, text, columns
        #[arg(short, long)]
        format: Option<String>,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave working-hours records out
        #[arg(long)]
        no_hours: bool,
    },

    /// List categories, or classify a service name
    Categories {
        /// Service name to classify
        #[arg(long)]
        classify: Option<String>,

        /// Category keyword file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Open config file in editor
    Edit,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., sources.hours_url)
        key: String,

        /// Value to set
        value: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clinica=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clinica=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Edit => commands::config::edit(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Hours { source, json } => commands::hours::run(source, json),
        Commands::Services {
            source,
            detailed,
            json,
        } => commands::services::run(source, detailed, json),
        Commands::Process {
            hours_source,
            price_source,
            categories,
            format,
            output,
            no_hours,
        } => commands::process::run(commands::process::ProcessArgs {
            hours_source,
            price_source,
            categories,
            format,
            output,
            no_hours,
        }),
        Commands::Categories { classify, file } => commands::categories::run(classify, file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
