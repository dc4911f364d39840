//! Monte Carlo Engine Binary
//!
//! Loads a trade outcome file, runs a Monte Carlo simulation and prints the
//! aggregated metrics as JSON to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin monte-carlo -- trades.csv
//! ```
//!
//! # Environment Variables
//!
//! - `MONTE_CARLO_CONFIG`: Config file path (default: config.yaml, optional)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`
//!
//! Ctrl-C stops the run; a stopped run exits with an error and no output.

use std::net::SocketAddr;

use anyhow::{Context, Result, bail};
use monte_carlo_engine::config::{self, Config, DEFAULT_CONFIG_PATH};
use monte_carlo_engine::ingest::load_outcomes;
use monte_carlo_engine::observability::{MetricsConfig, init_metrics};
use monte_carlo_engine::reporting::{StatusReporter, summary_lines};
use monte_carlo_engine::telemetry::init_tracing;
use monte_carlo_engine::{SimulationEvent, SimulationService};
use tokio::signal;

/// Environment variable naming the config file.
const CONFIG_ENV_VAR: &str = "MONTE_CARLO_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = load_configuration()?;
    init_tracing(&config.observability.logging)?;

    tracing::info!("Starting Monte Carlo engine");

    if config.observability.metrics.enabled {
        let addr: SocketAddr = config
            .observability
            .metrics
            .listen_addr
            .parse()
            .context("invalid metrics listen address")?;
        init_metrics(&MetricsConfig::with_addr(addr))?;
    }

    let Some(path) = std::env::args()
        .nth(1)
        .or_else(|| config.input.outcomes_path.clone())
    else {
        bail!("No outcome file: pass a path or set input.outcomes_path");
    };

    let mut reporter = StatusReporter::new();
    reporter.set_parsing_file(&path);
    let loaded = match load_outcomes(&path) {
        Ok(loaded) => loaded,
        Err(e) => {
            reporter.set_error(&e.to_string());
            return Err(e).with_context(|| format!("failed to load outcomes from '{path}'"));
        }
    };
    reporter.parsing_complete();

    let Some(initial_balance) = loaded.initial_balance.or(config.input.initial_balance) else {
        bail!("No initial balance: add a balance= line or set input.initial_balance");
    };

    let request = config.simulation.to_request(loaded.outcomes, initial_balance);
    let service = SimulationService::new(config.engine.clone());

    reporter.set_simulating(request.num_simulations);
    let mut handle = service.submit(request);

    let stop = service.stop_flag();
    let ctrl_c = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping simulation");
            stop.request_stop();
        }
    });

    let terminal = reporter.follow(&mut handle).await;
    ctrl_c.abort();

    match terminal {
        Some(SimulationEvent::Completed(metrics)) => {
            for line in summary_lines(&metrics) {
                tracing::info!("{line}");
            }
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            Ok(())
        }
        Some(event @ SimulationEvent::Failed { .. }) => {
            if let Some(report) = event.error_report() {
                eprintln!("{}", serde_json::to_string_pretty(&report)?);
                bail!("{} ({})", report.message, report.code);
            }
            bail!("Simulation failed")
        }
        Some(SimulationEvent::Stopped) => bail!("Simulation stopped before completion"),
        Some(SimulationEvent::Progress(_)) | None => bail!("Simulation ended without a result"),
    }
}

/// Explicit config paths must exist; the default path is optional.
fn load_configuration() -> Result<Config> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) => config::load_config(Some(&path))
            .with_context(|| format!("failed to load config from '{path}'")),
        Err(_) => config::load_config_or_default(DEFAULT_CONFIG_PATH)
            .context("failed to load default config"),
    }
}
