//! # Outbreak News
//!
//! Scrapes disease-outbreak news articles, extracts structured fields with
//! text heuristics, cleans the resulting dataset, and serves it through a
//! read-only HTTP endpoint.
//!
//! ## Usage
//!
//! ```sh
//! outbreak_news scrape --config urls.yaml
//! outbreak_news clean
//! OUTBREAK_API_KEY=secret outbreak_news serve
//! ```
//!
//! ## Architecture
//!
//! Data flows one way through three stages:
//! 1. **Scrape**: fetch each URL and extract a raw record into the raw table
//! 2. **Clean**: deduplicate, validate, and type the raw table into the clean table
//! 3. **Serve**: return the clean table to callers holding the shared secret

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cleaning;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod scrapers;
mod utils;

use api::service::OutbreakService;
use cli::{CleanArgs, Cli, Command, ScrapeArgs, ServeArgs};
use config::ScrapeConfig;
use outputs::json;
use scrapers::fetch::HttpFetcher;
use utils::ensure_writable_parent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.command, "Parsed CLI arguments");

    let result = match args.command {
        Command::Scrape(args) => run_scrape(args).await,
        Command::Clean(args) => run_clean(args).await,
        Command::Serve(args) => run_serve(args).await,
    };

    let elapsed = start_time.elapsed();
    match &result {
        Ok(()) => info!(?elapsed, "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Execution failed"),
    }
    result
}

#[instrument(level = "info", skip_all)]
async fn run_scrape(args: ScrapeArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => ScrapeConfig::load(path)?,
        None => ScrapeConfig::default(),
    };
    if !args.urls.is_empty() {
        config.urls = args.urls.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = secs;
    }
    info!(urls = config.urls.len(), timeout_secs = config.timeout_secs, "Scrape starting");

    // Fail on an unusable output location before fetching anything
    ensure_writable_parent(&args.output).await?;

    let fetcher = HttpFetcher::new(&config)?;
    let report = scrapers::outbreak::scrape_batch(&fetcher, &config.urls, &args.output).await?;

    for failure in &report.failures {
        warn!(url = %failure.url, error = %failure.error, "URL not scraped");
    }
    if let Some(path) = &args.report {
        json::write_report(&report, path).await?;
    }
    info!(path = %args.output.display(), rows = report.succeeded, "Raw table saved");
    Ok(())
}

#[instrument(level = "info", skip_all)]
async fn run_clean(args: CleanArgs) -> Result<(), Box<dyn Error>> {
    ensure_writable_parent(&args.output).await?;
    let stats = cleaning::clean_table(&args.input, &args.output)?;
    debug!(?stats, "Clean finished");
    Ok(())
}

#[instrument(level = "info", skip_all)]
async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn Error>> {
    if args.api_key.is_empty() {
        return Err("refusing to serve with an empty API key".into());
    }
    if !args.data.exists() {
        warn!(path = %args.data.display(), "Clean table not found; requests will fail until it is created");
    }
    let service = OutbreakService::new(args.data, args.api_key);
    api::http::serve(&args.listen, service).await
}
