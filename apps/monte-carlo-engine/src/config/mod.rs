//! Configuration module for the Monte Carlo engine.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for the simulation engine and its surroundings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use monte_carlo_engine::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("paths per run: {}", config.simulation.num_simulations);
//! ```

mod observability;
mod simulation;

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::simulation::RunnerConfig;

pub use observability::{LOG_FORMATS, LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use simulation::{InputConfig, SimulationDefaults};

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Request defaults.
    #[serde(default)]
    pub simulation: SimulationDefaults,
    /// Runner, parallelism and aggregation settings.
    #[serde(default)]
    pub engine: RunnerConfig,
    /// Outcome source.
    #[serde(default)]
    pub input: InputConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration, falling back to defaults when `path` does not exist.
///
/// # Errors
///
/// Returns a `ConfigError` if an existing file cannot be read, parsed, or
/// validated.
pub fn load_config_or_default(path: &str) -> Result<Config, ConfigError> {
    match load_config(Some(path)) {
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            tracing::debug!(path, "Config file not found, using defaults");
            Ok(Config::default())
        }
        other => other,
    }
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let simulation = &config.simulation;
    if simulation.num_simulations == 0 {
        return Err(invalid("simulation.num_simulations must be positive"));
    }

    let confidence = simulation.confidence_level_percent;
    if !(confidence > 0.0 && confidence < 100.0) {
        return Err(invalid(
            "simulation.confidence_level_percent must be between 0 and 100",
        ));
    }

    let engine = &config.engine;
    if engine.progress_interval == 0 {
        return Err(invalid("engine.progress_interval must be positive"));
    }

    if engine.parallel.batch_size == 0 {
        return Err(invalid("engine.parallel.batch_size must be positive"));
    }

    let ruin = engine.aggregation.ruin_threshold_percent;
    if !(ruin > 0.0 && ruin <= 100.0) {
        return Err(invalid(
            "engine.aggregation.ruin_threshold_percent must be in (0, 100]",
        ));
    }

    if engine.aggregation.max_plot_points == 0 {
        return Err(invalid("engine.aggregation.max_plot_points must be positive"));
    }

    if let Some(balance) = config.input.initial_balance
        && !(balance.is_finite() && balance > 0.0)
    {
        return Err(invalid("input.initial_balance must be positive"));
    }

    let logging = &config.observability.logging;
    if !LOG_FORMATS.contains(&logging.format.as_str()) {
        return Err(invalid(format!(
            "observability.logging.format must be one of: {LOG_FORMATS:?}"
        )));
    }

    let metrics = &config.observability.metrics;
    if metrics.enabled && metrics.listen_addr.parse::<SocketAddr>().is_err() {
        return Err(invalid(format!(
            "observability.metrics.listen_addr '{}' is not a socket address",
            metrics.listen_addr
        )));
    }

    Ok(())
}
