//! Configuration for the simulation runner and aggregator.

use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_PLOT_POINTS, DEFAULT_PROGRESS_INTERVAL,
    DEFAULT_RUIN_THRESHOLD_PERCENT, DEFAULT_SAMPLE_CURVE_COUNT,
};

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Max drawdown percent above which a path counts as ruined.
    #[serde(default = "default_ruin_threshold")]
    pub ruin_threshold_percent: f64,
    /// Point budget per plotted curve.
    #[serde(default = "default_max_plot_points")]
    pub max_plot_points: usize,
    /// Number of leading paths kept as sample curves.
    #[serde(default = "default_sample_curve_count")]
    pub sample_curve_count: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            ruin_threshold_percent: DEFAULT_RUIN_THRESHOLD_PERCENT,
            max_plot_points: DEFAULT_MAX_PLOT_POINTS,
            sample_curve_count: DEFAULT_SAMPLE_CURVE_COUNT,
        }
    }
}

/// Parallel path execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Run paths on a rayon pool.
    #[serde(default)]
    pub enabled: bool,

    /// Maximum number of threads to use (0 = rayon default).
    #[serde(default)]
    pub max_threads: usize,

    /// Paths per batch; stop checks and progress happen between batches.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_threads: 0,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Runner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Seed for reproducible shuffles (None = OS entropy).
    #[serde(default)]
    pub seed: Option<u64>,

    /// Emit progress every N paths in sequential mode.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Parallel execution.
    #[serde(default)]
    pub parallel: ParallelConfig,

    /// Aggregation.
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            parallel: ParallelConfig::default(),
            aggregation: AggregationConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Set the shuffle seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable parallel execution with the given batch size.
    #[must_use]
    pub const fn with_parallel(mut self, batch_size: usize) -> Self {
        self.parallel.enabled = true;
        self.parallel.batch_size = batch_size;
        self
    }
}

const fn default_ruin_threshold() -> f64 {
    DEFAULT_RUIN_THRESHOLD_PERCENT
}

const fn default_max_plot_points() -> usize {
    DEFAULT_MAX_PLOT_POINTS
}

const fn default_sample_curve_count() -> usize {
    DEFAULT_SAMPLE_CURVE_COUNT
}

const fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

const fn default_progress_interval() -> usize {
    DEFAULT_PROGRESS_INTERVAL
}
