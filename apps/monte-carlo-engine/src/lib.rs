// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::items_after_statements,
        clippy::cast_precision_loss
    )
)]

//! Monte Carlo Engine - Rust Core Library
//!
//! Estimates the distribution of a trading strategy's future outcomes by
//! replaying its historical trade sequence in randomized order thousands of
//! times and summarizing the resulting equity paths.
//!
//! # Modules
//!
//! - **simulation**: the engine
//!   - `shuffler`: per-path random trade ordering
//!   - `path`: single-path equity, drawdown and ratio computation
//!   - `runner`: N-path orchestration with stop and progress
//!   - `aggregator`: percentile table, risk of ruin, plotting curves
//!   - `service`: async submit/stop surface with an event channel
//!
//! - **ingest**: trade outcome files (JSON, delimited text)
//! - **reporting**: status line state and value formatting
//! - **config**: YAML configuration with env interpolation
//! - **telemetry** / **observability**: tracing setup, Prometheus metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use monte_carlo_engine::{SimulationEvent, SimulationRequest, SimulationService};
//! use monte_carlo_engine::simulation::RunnerConfig;
//!
//! let service = SimulationService::new(RunnerConfig::default());
//! let mut handle = service.submit(SimulationRequest::new(outcomes, 10_000.0));
//!
//! while let Some(event) = handle.next_event().await {
//!     if let SimulationEvent::Completed(metrics) = event {
//!         println!("risk of ruin: {:.2}%", metrics.risk_of_ruin);
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Engine
// =============================================================================

/// Monte Carlo simulation engine.
pub mod simulation;

/// Error types and codes.
pub mod error;

// =============================================================================
// Adapters
// =============================================================================

/// Trade outcome ingestion.
pub mod ingest;

/// Status reporting and formatting.
pub mod reporting;

// =============================================================================
// Infrastructure
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Prometheus metrics.
pub mod observability;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ErrorCode, ErrorReport, SimulationError};
pub use simulation::{
    AggregatedMetrics, CurvePoint, MetricsAggregator, PathResult, PathSimulator,
    RandomOrderShuffler, RunHandle, RunOutcome, SimulationEvent, SimulationRequest,
    SimulationRunner, SimulationService, StopFlag,
};
