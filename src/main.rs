//! USDA PLANTS Harvester
//!
//! Fetches plant profiles for a symbol list and flattens them into four
//! relational CSV tables:
//! - plants.csv: one row per plant record
//! - native_status.csv / ancestors.csv: per-plant profile sections
//! - characteristics.csv: best-effort characteristics endpoint data

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use validator::Validate;

use telemetry::{init_tracing_from_env, metrics};
use usda_client::{FetchConfig, PlantsClient};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct HarvesterConfig {
    /// CSV file with a `Symbol` column naming the plants to fetch.
    #[serde(default = "default_input")]
    input: String,

    /// Directory the four output tables are written into.
    #[serde(default = "default_out_dir")]
    out_dir: String,

    #[serde(default)]
    fetch: FetchConfig,
}

fn default_input() -> String {
    "symbols.csv".to_string()
}

fn default_out_dir() -> String {
    "out".to_string()
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            out_dir: default_out_dir(),
            fetch: FetchConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting plants harvester v{}", env!("CARGO_PKG_VERSION"));

    // Load and validate configuration before touching the network
    let config = load_config()?;
    config
        .fetch
        .validate()
        .context("Invalid fetch configuration")?;
    config.fetch.check().context("Invalid fetch configuration")?;

    info!(
        input = %config.input,
        out_dir = %config.out_dir,
        concurrency = config.fetch.concurrency,
        max_attempts = config.fetch.max_attempts,
        timeout_secs = config.fetch.timeout_secs,
        "Loaded configuration"
    );

    // Load the symbol list
    let symbols = tables::read_symbols(Path::new(&config.input))
        .with_context(|| format!("Failed to read symbol list from {}", config.input))?;
    if symbols.is_empty() {
        warn!(input = %config.input, "Symbol list is empty, output tables will only have headers");
    } else {
        info!(symbols = symbols.len(), "Loaded symbol list");
    }

    let client = Arc::new(
        PlantsClient::new(&config.fetch).context("Failed to create PLANTS API client")?,
    );

    // Cancel outstanding work on Ctrl+C / SIGTERM
    let cancel = CancellationToken::new();
    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown requested, cancelling outstanding fetches");
        shutdown_cancel.cancel();
    });

    // Run the harvest
    let report = pipeline::run_harvest(client, symbols, &config.fetch, None, cancel).await;

    if !report.failures.is_empty() {
        let failed: Vec<&str> = report.failures.iter().map(|f| f.symbol.as_str()).collect();
        warn!(
            failed = failed.len(),
            symbols = %failed.join(","),
            "Symbols not harvested"
        );
    }

    // Write whatever was harvested, even after cancellation
    tables::write_tables(&report.tables, Path::new(&config.out_dir))
        .with_context(|| format!("Failed to write tables to {}", config.out_dir))?;

    let snapshot = metrics().snapshot();
    info!(
        attempted = report.summary.attempted,
        succeeded = report.summary.succeeded,
        failed = report.summary.failed,
        elapsed_ms = report.summary.elapsed_ms,
        fetch_attempts = snapshot.fetch_attempts,
        fetch_retries = snapshot.fetch_retries,
        rate_limited = snapshot.rate_limited_responses,
        characteristics_degraded = snapshot.characteristics_degraded,
        rows_emitted = snapshot.rows_emitted,
        "Harvest complete"
    );

    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<HarvesterConfig> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&HarvesterConfig::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("HARVESTER")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: HarvesterConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested fetch config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(url) = std::env::var("HARVESTER_FETCH_PROFILE_URL") {
        config.fetch.profile_url = url;
    }
    if let Ok(url) = std::env::var("HARVESTER_FETCH_CHARACTERISTICS_URL") {
        config.fetch.characteristics_url = url;
    }
    if let Ok(value) = std::env::var("HARVESTER_FETCH_CONCURRENCY") {
        config.fetch.concurrency = value
            .parse()
            .context("HARVESTER_FETCH_CONCURRENCY is not a number")?;
    }
    if let Ok(value) = std::env::var("HARVESTER_FETCH_MAX_ATTEMPTS") {
        config.fetch.max_attempts = value
            .parse()
            .context("HARVESTER_FETCH_MAX_ATTEMPTS is not a number")?;
    }
    if let Ok(value) = std::env::var("HARVESTER_FETCH_TIMEOUT_SECS") {
        config.fetch.timeout_secs = value
            .parse()
            .context("HARVESTER_FETCH_TIMEOUT_SECS is not a number")?;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
