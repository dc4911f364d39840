//! Observability configuration for logging and metrics.

use serde::{Deserialize, Serialize};

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ObservabilityConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Prometheus exporter configuration.
    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "json", "pretty" or "compact".
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Include span information.
    #[serde(default = "default_true")]
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            include_spans: true,
        }
    }
}

/// Prometheus exporter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Start the exporter.
    #[serde(default)]
    pub enabled: bool,
    /// Listener address for `/metrics`.
    #[serde(default = "default_metrics_addr")]
    pub listen_addr: String,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: default_metrics_addr(),
        }
    }
}

/// Accepted values for [`LoggingConfig::format`].
pub const LOG_FORMATS: [&str; 3] = ["json", "pretty", "compact"];

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

const fn default_true() -> bool {
    true
}
