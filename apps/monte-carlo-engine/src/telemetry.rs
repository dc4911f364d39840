//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level.
//!
//! # Usage
//!
//! ```rust,ignore
//! use monte_carlo_engine::{config::LoggingConfig, telemetry::init_tracing};
//!
//! init_tracing(&LoggingConfig::default())?;
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::LoggingConfig;

/// Error raised when a global subscriber is already installed.
#[derive(Debug, thiserror::Error)]
#[error("failed to initialize tracing: {0}")]
pub struct TelemetryError(String);

/// Build the filter: `RUST_LOG` if set and valid, otherwise the configured level.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber was already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config);
    let span_events = if config.include_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(span_events)
        .with_writer(std::io::stderr);

    let result = match config.format.as_str() {
        "pretty" => builder.pretty().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder
            .json()
            .with_current_span(config.include_spans)
            .with_span_list(config.include_spans)
            .try_init(),
    };

    result.map_err(|e| TelemetryError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_from_config() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        // RUST_LOG may be set in CI; either way a filter is produced
        let filter = env_filter(&config);
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let config = LoggingConfig {
            level: "not a [valid directive".to_string(),
            ..LoggingConfig::default()
        };
        let filter = env_filter(&config);
        assert!(!filter.to_string().is_empty());
    }
}
