//! Prometheus metrics for simulation runs.
//!
//! Recording goes through the `metrics` facade and is a no-op until an
//! exporter is installed with [`init_metrics`].
//!
//! # Example
//!
//! ```ignore
//! use monte_carlo_engine::observability::{init_metrics, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default())?;
//! record_run("completed", 0.42);
//! ```

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for run durations (in seconds).
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // 1ms to 2 minutes
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`. Must be
/// called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error if the exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.duration_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

/// Record a finished run.
///
/// # Arguments
///
/// * `outcome` - Terminal state ("completed", "stopped", "failed")
/// * `duration_seconds` - Wall time from submit to terminal event
pub fn record_run(outcome: &str, duration_seconds: f64) {
    counter!(
        "monte_carlo_runs_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "monte_carlo_run_duration_seconds",
        "outcome" => outcome.to_string()
    )
    .record(duration_seconds);
}

/// Record simulated paths.
pub fn record_paths_simulated(count: u64) {
    counter!("monte_carlo_paths_simulated_total").increment(count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_default() {
        let config = MetricsConfig::default();
        assert_eq!(config.listen_addr.port(), 9090);
        assert!(config.duration_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_metrics_config_with_addr() {
        let addr = SocketAddr::from(([127, 0, 0, 1], 9100));
        let config = MetricsConfig::with_addr(addr);

        assert_eq!(config.listen_addr, addr);
        assert!(!config.duration_buckets.is_empty());
    }

    #[test]
    fn test_recording_without_exporter_is_noop() {
        // No recorder installed; the facade discards these
        record_run("completed", 0.1);
        record_paths_simulated(1000);
    }
}
