//! Error handling for the Monte Carlo engine.
//!
//! Errors fall into two groups:
//!
//! | Group | Codes | Surfaced as |
//! |-------|-------|-------------|
//! | Precondition | `EMPTY_OUTCOMES`, `NON_POSITIVE_BALANCE`, `INVALID_SIMULATION_COUNT`, `INVALID_CONFIDENCE_LEVEL`, `NO_RESULTS` | `Failed` before any path runs |
//! | Computation | `COMPUTATION_FAILED` | `Failed` after the worker aborts unexpectedly |
//!
//! Cancellation is not an error and has no code here. Zero denominators in
//! metric calculations resolve to defined fallback values and never produce
//! an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for the Monte Carlo engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No trade outcomes were supplied.
    EmptyOutcomes,
    /// Initial balance is zero, negative or not finite.
    NonPositiveBalance,
    /// Number of simulations is zero.
    InvalidSimulationCount,
    /// Confidence level is outside (0, 100).
    InvalidConfidenceLevel,
    /// Aggregation was requested over zero paths.
    NoResults,
    /// Unexpected failure while simulating.
    ComputationFailed,
}

impl ErrorCode {
    /// Get the stable reason string for this code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::EmptyOutcomes => "EMPTY_OUTCOMES",
            Self::NonPositiveBalance => "NON_POSITIVE_BALANCE",
            Self::InvalidSimulationCount => "INVALID_SIMULATION_COUNT",
            Self::InvalidConfidenceLevel => "INVALID_CONFIDENCE_LEVEL",
            Self::NoResults => "NO_RESULTS",
            Self::ComputationFailed => "COMPUTATION_FAILED",
        }
    }

    /// Whether this code describes a violated precondition.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        !matches!(self, Self::ComputationFailed)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Errors from simulation requests and aggregation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// The outcome sequence is empty.
    #[error("No trade data available")]
    EmptyOutcomes,

    /// The initial balance is not strictly positive.
    #[error("Initial balance must be positive")]
    NonPositiveBalance {
        /// The rejected balance.
        balance: f64,
    },

    /// Zero simulations were requested.
    #[error("Number of simulations must be positive")]
    InvalidSimulationCount,

    /// Confidence level outside the open interval (0, 100).
    #[error("Confidence level must be between 0 and 100, got {level}")]
    InvalidConfidenceLevel {
        /// The rejected level.
        level: f64,
    },

    /// Aggregation over an empty result set.
    #[error("Cannot aggregate zero simulation paths")]
    NoResults,

    /// The worker failed unexpectedly.
    #[error("Simulation error: {message}")]
    Computation {
        /// Failure description.
        message: String,
    },
}

impl SimulationError {
    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyOutcomes => ErrorCode::EmptyOutcomes,
            Self::NonPositiveBalance { .. } => ErrorCode::NonPositiveBalance,
            Self::InvalidSimulationCount => ErrorCode::InvalidSimulationCount,
            Self::InvalidConfidenceLevel { .. } => ErrorCode::InvalidConfidenceLevel,
            Self::NoResults => ErrorCode::NoResults,
            Self::Computation { .. } => ErrorCode::ComputationFailed,
        }
    }

    /// Whether this error was raised before any work started.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        self.code().is_precondition()
    }

    /// Unexpected worker failure.
    #[must_use]
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation {
            message: message.into(),
        }
    }
}

/// Serializable error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code string.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Whether the failure was a precondition violation.
    pub precondition: bool,
}

impl ErrorReport {
    /// Build a report for `code` with a human-readable `message`.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.reason().to_string(),
            message: message.into(),
            precondition: code.is_precondition(),
        }
    }
}

impl From<&SimulationError> for ErrorReport {
    fn from(error: &SimulationError) -> Self {
        Self::new(error.code(), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_classification() {
        assert!(ErrorCode::EmptyOutcomes.is_precondition());
        assert!(ErrorCode::NonPositiveBalance.is_precondition());
        assert!(ErrorCode::NoResults.is_precondition());
        assert!(!ErrorCode::ComputationFailed.is_precondition());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SimulationError::EmptyOutcomes.to_string(),
            "No trade data available"
        );
        assert_eq!(
            SimulationError::NonPositiveBalance { balance: -5.0 }.to_string(),
            "Initial balance must be positive"
        );
        assert_eq!(
            SimulationError::computation("boom").to_string(),
            "Simulation error: boom"
        );
    }

    #[test]
    fn test_error_report_from_error() {
        let report = ErrorReport::from(&SimulationError::InvalidConfidenceLevel { level: 120.0 });

        assert_eq!(report.code, "INVALID_CONFIDENCE_LEVEL");
        assert!(report.precondition);
        assert!(report.message.contains("120"));
    }

    #[test]
    fn test_error_report_for_worker_failure() {
        let report = ErrorReport::new(ErrorCode::ComputationFailed, "Simulation error: boom");

        assert_eq!(report.code, "COMPUTATION_FAILED");
        assert!(!report.precondition);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "code": "COMPUTATION_FAILED",
                "message": "Simulation error: boom",
                "precondition": false,
            })
        );
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::ComputationFailed.to_string(), "COMPUTATION_FAILED");
    }
}
