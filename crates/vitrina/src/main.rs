//! Vitrina CLI - listing photo ingestion for the property site.
//!
//! Validates uploads, normalizes them to bounded, watermarked WebP and
//! publishes them to the media store.
//!
//! # Usage
//!
//! ```bash
//! # Check uploads without processing them
//! vitrina validate salon.jpg cocina.heic
//!
//! # Process a directory of listing photos into the media store
//! vitrina process ./piso-calle-mayor/ --output report.jsonl --format jsonl
//!
//! # Render a listing-card thumbnail
//! vitrina thumbnail fachada.jpg -o fachada-card.webp
//!
//! # View configuration
//! vitrina config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Vitrina - listing photo ingestion pipeline.
#[derive(Parser, Debug)]
#[command(name = "vitrina")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check uploads and print one validation result per file
    Validate(cli::validate::ValidateArgs),

    /// Resize, watermark and store photos as WebP
    Process(cli::process::ProcessArgs),

    /// Render a fixed-size WebP thumbnail
    Thumbnail(cli::thumbnail::ThumbnailArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match vitrina_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `vitrina config path`."
            );
            vitrina_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Vitrina v{}", vitrina_core::VERSION);

    match cli.command {
        Commands::Validate(args) => cli::validate::execute(args, &config),
        Commands::Process(args) => cli::process::execute(args, config).await,
        Commands::Thumbnail(args) => cli::thumbnail::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args),
    }
}
