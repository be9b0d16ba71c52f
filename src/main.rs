//! gauge-relay - one-shot SQL to SignalFx gauge relay
//!
//! Reads the receiver/exporter YAML document, runs every configured query once
//! against the warehouse, maps the rows to gauge datapoints and posts one batch
//! per query to the ingest endpoint. Then it exits.
//!
//! # Usage
//! ```sh
//! GAUGE_RELAY_AUTH_TOKEN=... cargo run -- --config config.yaml
//! ```
//!
//! # Environment Variables
//! - `GAUGE_RELAY_AUTH_TOKEN` - ingest token (overrides `exporters.signalfx.authToken`)
//! - `GAUGE_RELAY_ENDPOINT` - ingest URL (overrides `exporters.signalfx.endpoint`)
//! - `GAUGE_RELAY_DB_PASSWORD` - warehouse password (overrides `params.password`)
//! - `RUST_LOG` - log filter, default `info`

use anyhow::{Context, Result};
use clap::Parser;
use gauge_relay::application::{ErrorPolicy, Relay};
use gauge_relay::config::{Config, DEFAULT_CONFIG_PATH, QuerySpec, ValueMode};
use gauge_relay::domain::errors::{ConfigError, RelayError};
use gauge_relay::domain::ports::DataPointSink;
use gauge_relay::infrastructure::observability::{Metrics, RunReporter};
use gauge_relay::infrastructure::{Database, JsonWriterSink, SignalFxClient};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Relay warehouse query results to SignalFx gauges", long_about = None)]
struct Cli {
    /// YAML configuration document
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Keep processing the remaining queries after one fails
    #[arg(long)]
    continue_on_error: bool,

    /// Print the gauge payloads to stdout instead of posting them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Diagnostics go to stderr; stdout carries status lines only
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("gauge-relay {} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli).map_err(RelayError::from)?;
    let receiver = &config.receivers.sql;
    debug!(
        "intervalSeconds={} is ignored in one-shot mode",
        receiver.interval_seconds
    );
    if receiver.queries.is_empty() {
        warn!("No queries configured; nothing to relay.");
    }

    let db = Database::connect(&receiver.db_driver, &receiver.params)
        .await
        .map_err(RelayError::from)?;

    let policy = if cli.continue_on_error {
        ErrorPolicy::ContinueOnError
    } else {
        ErrorPolicy::FailFast
    };
    let metrics = Metrics::new().context("Failed to create metrics")?;

    if cli.dry_run {
        info!("Dry run: payloads are printed, nothing is posted.");
        let sink = JsonWriterSink::stdout();
        relay_all(db, sink, metrics, &receiver.queries, receiver.value_mode, policy).await
    } else {
        let client = SignalFxClient::new(&config.exporters.signalfx).map_err(RelayError::from)?;
        info!("Posting datapoints to {}", client.endpoint());
        relay_all(db, client, metrics, &receiver.queries, receiver.value_mode, policy).await
    }
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    if !cli.dry_run {
        return Config::load(&cli.config);
    }
    // A dry run never talks to the ingest endpoint, so only the receiver must be valid
    let mut config = Config::from_file(&cli.config)?;
    config.apply_env_overrides();
    config.validate_receiver()?;
    Ok(config)
}

async fn relay_all<S: DataPointSink>(
    db: Database,
    sink: S,
    metrics: Metrics,
    queries: &[QuerySpec],
    value_mode: ValueMode,
    policy: ErrorPolicy,
) -> Result<()> {
    let reporter = RunReporter::new(metrics.clone());
    let mut relay = Relay::new(db, sink, metrics)
        .with_value_mode(value_mode)
        .with_policy(policy);

    let summary = relay.run(queries).await?;
    reporter.report(&summary);

    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} queries failed",
            summary.failures(),
            summary.queries.len()
        );
    }
    Ok(())
}
