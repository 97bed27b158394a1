//! Tally - repository activity and citation collector
//!
//! # Usage
//!
//! ```bash
//! # Run a collection pass (default)
//! TALLY_GITHUB_TOKEN=ghp_xxx TALLY_ADS_TOKEN=xxx tally --config configs/tally.toml
//!
//! # Drop cached history for repositories/publications no longer configured
//! tally prune --config configs/tally.toml
//! ```
//!
//! Tokens are read from the environment, never from the config file, and
//! are never logged. Exit status: 0 when every configured key was fetched,
//! 2 when some keys were skipped (details in the log), nonzero via error
//! for fatal failures.

use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tally_config::Config;
use tally_connectors::{Ads, GitHub};
use tally_pipeline::{prune_unconfigured, Pipeline};
use tally_store::CacheStore;

/// Exit status for a run that skipped some keys
const EXIT_PARTIAL: u8 = 2;

/// Collect repository activity and publication citations into the cache
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file
    #[arg(short, long, default_value = "configs/tally.toml", global = true)]
    config: std::path::PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one collection pass (default)
    Run,

    /// Remove cached history for keys no longer configured
    Prune,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let store = CacheStore::new(&config.cache.path);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config, store).await,
        Command::Prune => prune(config, store),
    }
}

async fn run(config: Config, store: CacheStore) -> Result<ExitCode> {
    let github_token =
        env::var("TALLY_GITHUB_TOKEN").context("TALLY_GITHUB_TOKEN must be set")?;
    let ads_token = match env::var("TALLY_ADS_TOKEN") {
        Ok(token) => token,
        Err(_) if config.publications().is_empty() => String::new(),
        Err(_) => bail!("TALLY_ADS_TOKEN must be set when publications are configured"),
    };

    let github = GitHub::new(&config.github, github_token)?;
    let ads = Ads::new(&config.ads.connector, ads_token)?;

    let pipeline = Pipeline::new(config, github, ads, store);
    let report = pipeline.run().await?;

    for skipped in &report.skipped {
        warn!(key = %skipped.key, reason = %skipped.reason, "skipped this run, will retry next run");
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL))
    }
}

fn prune(config: Config, store: CacheStore) -> Result<ExitCode> {
    let outcome = prune_unconfigured(&config, &store)?;
    for repo in &outcome.removed_repos {
        info!(repo = %repo, "removed cached activity");
    }
    for publication in &outcome.removed_publications {
        info!(publication = %publication, "removed cached citations");
    }
    if outcome.removed_repos.is_empty() && outcome.removed_publications.is_empty() {
        info!("nothing to prune");
    }
    Ok(ExitCode::SUCCESS)
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
