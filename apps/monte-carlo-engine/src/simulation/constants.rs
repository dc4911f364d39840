//! Constants for path metrics and aggregation.

/// Annualization factor applied per trade to the Sharpe ratio.
pub const TRADING_DAYS: f64 = 252.0;

/// Drawdown percent at or below which the Calmar ratio is reported as 0.
pub const CALMAR_DRAWDOWN_EPSILON: f64 = 0.001;

/// Max drawdown percent above which a path counts as ruined.
pub const DEFAULT_RUIN_THRESHOLD_PERCENT: f64 = 90.0;

/// Upper bound on points per plotted curve.
pub const DEFAULT_MAX_PLOT_POINTS: usize = 500;

/// Number of individual paths kept as sample curves.
pub const DEFAULT_SAMPLE_CURVE_COUNT: usize = 5;

/// Emit progress every N paths (plus the first and the last).
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;

/// Paths per rayon batch in parallel mode.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Default number of simulated paths.
pub const DEFAULT_NUM_SIMULATIONS: usize = 1000;

/// Default confidence level in percent.
pub const DEFAULT_CONFIDENCE_LEVEL_PERCENT: f64 = 95.0;

/// Percent scale factor.
pub const HUNDRED: f64 = 100.0;
