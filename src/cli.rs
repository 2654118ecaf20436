//! Command-line interface definitions for Outbreak News.
//!
//! Each pipeline stage is its own subcommand. Paths and the API secret can
//! also be supplied through environment variables.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_RAW_TABLE: &str = "scraped_outbreak.news.csv";
pub const DEFAULT_CLEAN_TABLE: &str = "clean_data.csv";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";

/// Command-line arguments for the Outbreak News application.
///
/// # Examples
///
/// ```sh
/// # Scrape the configured article list into the raw table
/// outbreak_news scrape --config urls.yaml --report report.json
///
/// # Rebuild the clean table from the raw table
/// outbreak_news clean
///
/// # Serve the clean table
/// OUTBREAK_API_KEY=secret outbreak_news serve --listen 0.0.0.0:8000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape article URLs into the raw table
    Scrape(ScrapeArgs),
    /// Rebuild the clean table from the raw table
    Clean(CleanArgs),
    /// Serve the clean table over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Optional path to a YAML file listing URLs and fetch settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Article URL to scrape; repeat for several. Overrides the config's list
    #[arg(short, long = "url")]
    pub urls: Vec<String>,

    /// Raw table to write
    #[arg(short, long, env = "OUTBREAK_RAW_TABLE", default_value = DEFAULT_RAW_TABLE)]
    pub output: PathBuf,

    /// Optional path for a JSON batch report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Per-request timeout in seconds (overrides the config file)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Raw table to read
    #[arg(short, long, env = "OUTBREAK_RAW_TABLE", default_value = DEFAULT_RAW_TABLE)]
    pub input: PathBuf,

    /// Clean table to write
    #[arg(short, long, env = "OUTBREAK_CLEAN_TABLE", default_value = DEFAULT_CLEAN_TABLE)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, env = "OUTBREAK_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Clean table to serve
    #[arg(short, long, env = "OUTBREAK_CLEAN_TABLE", default_value = DEFAULT_CLEAN_TABLE)]
    pub data: PathBuf,

    /// Shared secret expected in the X-API-Key header
    #[arg(long, env = "OUTBREAK_API_KEY", hide_env_values = true)]
    pub api_key: String,
}
