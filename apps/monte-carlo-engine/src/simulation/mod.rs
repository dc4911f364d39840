//! Monte Carlo simulation of trade sequences.
//!
//! Resamples a historical sequence of trade outcomes to estimate the
//! distribution of future equity paths:
//!
//! - [`RandomOrderShuffler`] permutes the outcomes once per path
//! - [`PathSimulator`] replays one ordering into equity and risk metrics
//! - [`SimulationRunner`] runs N paths with stop and progress support
//! - [`MetricsAggregator`] reduces the paths into percentiles and curves
//! - [`SimulationService`] drives the runner from async code
//!
//! # Example
//!
//! ```rust,ignore
//! use monte_carlo_engine::simulation::{
//!     RunOutcome, RunnerConfig, SimulationRequest, SimulationRunner, StopFlag,
//! };
//!
//! let request = SimulationRequest::new(vec![100.0, -50.0, 200.0], 10_000.0);
//! let mut runner = SimulationRunner::new(RunnerConfig::default());
//!
//! if let RunOutcome::Completed(metrics) = runner.run(&request, &StopFlag::new(), |_| {})? {
//!     println!("median return: {:.2}%", metrics.median_return);
//! }
//! ```

pub mod aggregator;
pub mod config;
pub mod constants;
pub mod math;
pub mod path;
pub mod progress;
pub mod runner;
pub mod service;
pub mod shuffler;
pub mod types;

pub use aggregator::MetricsAggregator;
pub use config::{AggregationConfig, ParallelConfig, RunnerConfig};
pub use math::percentile;
pub use path::PathSimulator;
pub use progress::{Progress, ProgressCadence, ProgressSnapshot, ProgressTracker};
pub use runner::{RunOutcome, SimulationRunner, StopFlag};
pub use service::{RunHandle, SimulationEvent, SimulationService};
pub use shuffler::RandomOrderShuffler;
pub use types::{AggregatedMetrics, CurvePoint, PathResult, SimulationRequest};
