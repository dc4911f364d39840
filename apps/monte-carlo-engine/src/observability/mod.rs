//! Observability for simulation runs.
//!
//! Prometheus metrics export; structured logging lives in [`crate::telemetry`].

mod metrics;

pub use metrics::{MetricsConfig, MetricsError, init_metrics, record_paths_simulated, record_run};
