//! SkySniper CLI
//!
//! Searches every configured backend for the cheapest flight, or keeps
//! searching on an interval until a target price shows up.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use skysniper::{
    error::{AppError, Result},
    models::{CabinClass, Config, SearchParams},
    pipeline::{self, Aggregator, Monitor},
    utils::log as console,
};
use tokio::sync::watch;

/// SkySniper - cheapest-flight finder
#[derive(Parser, Debug)]
#[command(
    name = "skysniper",
    version,
    about = "Find the cheapest flight across Iranian airline and travel-agency sites"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "skysniper.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search all sources once and print the results
    Search {
        #[command(flatten)]
        route: RouteArgs,

        /// Print flights as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List available sources
    Sources,

    /// Search repeatedly and report price drops
    Monitor {
        #[command(flatten)]
        route: RouteArgs,

        /// Minutes between checks (default from config)
        #[arg(short = 'n', long)]
        interval: Option<u64>,

        /// Stop once the cheapest price is at or below this (IRR)
        #[arg(short, long)]
        target: Option<f64>,
    },
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Origin airport or city code (e.g. THR)
    origin: String,

    /// Destination airport or city code (e.g. IST)
    destination: String,

    /// Departure date (YYYY-MM-DD)
    date: String,

    /// Number of adults
    #[arg(short, long, default_value_t = 1)]
    adults: u32,

    /// Number of children
    #[arg(short, long, default_value_t = 0)]
    children: u32,

    /// Number of infants
    #[arg(short, long, default_value_t = 0)]
    infants: u32,

    /// Cabin class: economy, business or first
    #[arg(long, default_value = "economy", value_parser = parse_cabin)]
    cabin: CabinClass,

    /// Only query these sources (repeatable)
    #[arg(short = 's', long = "source")]
    sources: Vec<String>,

    /// Use domestic endpoints
    #[arg(short, long)]
    domestic: bool,
}

impl RouteArgs {
    fn params(&self) -> Result<SearchParams> {
        let params = SearchParams::parse(&self.origin, &self.destination, &self.date)?
            .with_passengers(self.adults, self.children, self.infants)
            .with_cabin(self.cabin)
            .domestic(self.domestic);
        params.validate()?;
        Ok(params)
    }
}

fn parse_cabin(value: &str) -> std::result::Result<CabinClass, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "economy" => Ok(CabinClass::Economy),
        "business" => Ok(CabinClass::Business),
        "first" => Ok(CabinClass::First),
        other => Err(format!(
            "unknown cabin '{other}' (expected economy, business or first)"
        )),
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Reject source names the registry does not know, before any request goes out.
fn check_sources(aggregator: &Aggregator, requested: &[String]) -> Result<()> {
    let unknown = aggregator.registry().unknown(requested);
    if unknown.is_empty() {
        return Ok(());
    }
    Err(AppError::config(format!(
        "Unknown source(s): {}. Available: {}",
        unknown.join(", "),
        aggregator.registry().names().join(", ")
    )))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    config.validate()?;
    log::debug!("Loaded configuration from {}", cli.config.display());

    let config = Arc::new(config);
    let aggregator = Aggregator::from_config(Arc::clone(&config));
    check_sources(&aggregator, &config.sources.enabled)?;

    match cli.command {
        Command::Search { route, json } => {
            let params = route.params()?;
            check_sources(&aggregator, &route.sources)?;

            console::set_quiet(json);
            pipeline::run_search(&aggregator, &params, &route.sources, json).await?;
        }

        Command::Sources => {
            pipeline::list_sources(aggregator.registry());
        }

        Command::Monitor {
            route,
            interval,
            target,
        } => {
            let params = route.params()?;
            check_sources(&aggregator, &route.sources)?;

            let interval = interval.unwrap_or(config.monitor.interval_minutes);
            if interval == 0 {
                return Err(AppError::validation("--interval must be at least 1 minute"));
            }
            let target = target.or(config.monitor.target_price);
            if target.is_some_and(|t| !t.is_finite() || t < 0.0) {
                return Err(AppError::validation("--target must be a non-negative price"));
            }

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Interrupt received, stopping monitor...");
                    let _ = shutdown_tx.send(true);
                }
            });

            let monitor = Monitor::new(Duration::from_secs(interval.saturating_mul(60)), target);
            let report =
                pipeline::run_monitor(&aggregator, &monitor, &params, &route.sources, shutdown_rx)
                    .await;

            log::info!(
                "Monitor finished after {} checks (target reached: {})",
                report.ticks,
                report.target_reached
            );
        }
    }

    Ok(())
}
