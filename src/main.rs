//! Sitesift main entry point
//!
//! This is the command-line interface for the Sitesift crawler.

use anyhow::Context;
use clap::Parser;
use sitesift::config::{load_config_with_hash, Config};
use sitesift::crawler::crawl;
use sitesift::SiftError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitesift: crawl activated sites and extract structured records
///
/// Sitesift reads the activated sites from the backend store, crawls them,
/// sends every page through a site-specific or generic extractor and the
/// information-extraction service, and stores the resulting records.
#[derive(Parser, Debug)]
#[command(name = "sitesift")]
#[command(version)]
#[command(about = "Crawl sites and extract structured records", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            let e = SiftError::from(e);
            tracing::error!("Failed to load configuration ({:?}): {}", e.kind(), e);
            return Err(e).with_context(|| format!("loading {}", cli.config.display()));
        }
    };

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitesift=info,warn"),
            1 => EnvFilter::new("sitesift=debug,info"),
            2 => EnvFilter::new("sitesift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs one crawl over all activated sites
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Project directory: {}, max requests: {}, request timeout: {} min",
        config.project.dir.display(),
        config
            .crawler
            .max_requests_per_crawl
            .map_or_else(|| "unbounded".to_string(), |n| n.to_string()),
        config.crawler.request_timeout_minutes
    );

    match crawl(config).await {
        Ok(stats) => {
            tracing::info!(
                "Crawl completed: {} pages, {} records",
                stats.pages_completed,
                stats.records_extracted
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed ({:?}): {}", e.kind(), e);
            Err(e.into())
        }
    }
}
