//! Core value types shared by the simulation pipeline.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

use super::constants::{DEFAULT_CONFIDENCE_LEVEL_PERCENT, DEFAULT_NUM_SIMULATIONS};

/// Input for one Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    /// Historical trade outcomes in their original order.
    pub outcomes: Vec<f64>,
    /// Starting balance of every path.
    pub initial_balance: f64,
    /// Number of paths to simulate.
    pub num_simulations: usize,
    /// Shuffle the outcome order for every path.
    pub randomize_order: bool,
    /// Confidence level in percent, e.g. 95.0.
    pub confidence_level_percent: f64,
}

impl SimulationRequest {
    /// Create a request with default run parameters.
    #[must_use]
    pub const fn new(outcomes: Vec<f64>, initial_balance: f64) -> Self {
        Self {
            outcomes,
            initial_balance,
            num_simulations: DEFAULT_NUM_SIMULATIONS,
            randomize_order: true,
            confidence_level_percent: DEFAULT_CONFIDENCE_LEVEL_PERCENT,
        }
    }

    /// Set the number of paths.
    #[must_use]
    pub const fn with_simulations(mut self, n: usize) -> Self {
        self.num_simulations = n;
        self
    }

    /// Enable or disable order randomization.
    #[must_use]
    pub const fn with_randomize_order(mut self, randomize: bool) -> Self {
        self.randomize_order = randomize;
        self
    }

    /// Set the confidence level in percent.
    #[must_use]
    pub const fn with_confidence_level(mut self, percent: f64) -> Self {
        self.confidence_level_percent = percent;
        self
    }

    /// Number of trades replayed per path.
    #[must_use]
    pub fn total_trades(&self) -> usize {
        self.outcomes.len()
    }

    /// Check the request preconditions.
    ///
    /// Outcomes are checked before the balance, matching the order in which
    /// failures are reported to the display side.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.outcomes.is_empty() {
            return Err(SimulationError::EmptyOutcomes);
        }
        // NaN fails this comparison too
        if !(self.initial_balance > 0.0 && self.initial_balance.is_finite()) {
            return Err(SimulationError::NonPositiveBalance {
                balance: self.initial_balance,
            });
        }
        if self.num_simulations == 0 {
            return Err(SimulationError::InvalidSimulationCount);
        }
        if !(self.confidence_level_percent > 0.0 && self.confidence_level_percent < 100.0) {
            return Err(SimulationError::InvalidConfidenceLevel {
                level: self.confidence_level_percent,
            });
        }
        Ok(())
    }
}

/// Metrics of a single simulated path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    /// Balance after the last trade.
    pub final_balance: f64,
    /// Total return in percent of the initial balance.
    pub return_percent: f64,
    /// Largest peak-to-trough decline in currency units.
    pub max_drawdown: f64,
    /// Largest decline in percent of the peak it was measured from.
    pub max_drawdown_percent: f64,
    /// Longest run of losing trades.
    pub max_consecutive_losses: u64,
    /// Trades with a positive outcome.
    pub winning_trades: u64,
    /// Trades with a negative outcome.
    pub losing_trades: u64,
    /// Winning trades in percent of all trades.
    pub win_rate: f64,
    /// Mean winning outcome.
    pub avg_win: f64,
    /// Mean losing outcome (positive value).
    pub avg_loss: f64,
    /// Average win over average loss.
    pub risk_reward_ratio: f64,
    /// Gross profit over gross loss.
    pub profit_factor: f64,
    /// Per-trade Sharpe ratio scaled by sqrt(252).
    pub sharpe_ratio: f64,
    /// Absolute return over max drawdown percent.
    pub calmar_ratio: f64,
    /// Balance before the first trade and after each trade.
    pub equity_curve: Vec<f64>,
}

impl PathResult {
    /// Number of trades replayed by this path.
    #[must_use]
    pub fn trade_count(&self) -> usize {
        self.equity_curve.len().saturating_sub(1)
    }

    /// Trades whose outcome was exactly zero.
    #[must_use]
    pub fn flat_trades(&self) -> u64 {
        (self.trade_count() as u64).saturating_sub(self.winning_trades + self.losing_trades)
    }

    /// Balance at a trade index, falling back to the final balance past the end.
    #[must_use]
    pub fn balance_at(&self, index: usize) -> f64 {
        self.equity_curve
            .get(index)
            .copied()
            .unwrap_or(self.final_balance)
    }
}

/// A plottable `(trade index, balance)` point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Trade index on the x axis.
    #[serde(rename = "x")]
    pub trade_index: usize,
    /// Balance on the y axis.
    #[serde(rename = "y")]
    pub balance: f64,
}

impl CurvePoint {
    /// Create a new point.
    #[must_use]
    pub const fn new(trade_index: usize, balance: f64) -> Self {
        Self {
            trade_index,
            balance,
        }
    }
}

/// Summary of a completed Monte Carlo run.
///
/// Field names serialize in camelCase for the display side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMetrics {
    // Overview
    /// Number of simulated paths.
    pub num_simulations: usize,
    /// Trades replayed per path.
    pub total_trades: usize,
    /// 50th percentile return.
    pub median_return: f64,
    /// Mean return across paths.
    pub mean_return: f64,
    /// 50th percentile max drawdown percent.
    pub median_max_drawdown: f64,
    /// 50th percentile Sharpe ratio.
    pub median_sharpe_ratio: f64,
    /// Percent of paths whose drawdown crossed the ruin threshold.
    pub risk_of_ruin: f64,
    /// 50th percentile Calmar ratio.
    pub median_calmar_ratio: f64,

    // Returns
    /// 99th percentile return.
    pub best_return: f64,
    /// 1st percentile return.
    pub worst_return: f64,
    /// 50th percentile profit factor.
    pub median_profit_factor: f64,

    // Risk
    /// 5th percentile max drawdown percent.
    pub best_max_drawdown: f64,
    /// 95th percentile max drawdown percent.
    pub worst_max_drawdown: f64,
    /// 5th percentile return.
    pub value_at_risk_95: f64,

    // Trades
    /// 50th percentile win rate.
    pub median_win_rate: f64,
    /// Mean risk/reward ratio across paths.
    pub avg_risk_reward: f64,
    /// Mean final balance divided by the trade count.
    pub expectancy_per_trade: f64,
    /// Mean of the per-path average loss.
    pub avg_loss: f64,
    /// Largest per-path average win.
    pub largest_win: f64,

    // Equity curves
    /// Median balance at each plotted trade index.
    pub median_curve: Vec<CurvePoint>,
    /// Lower-tail balance at each plotted trade index.
    pub confidence_curve: Vec<CurvePoint>,
    /// Curves of the first paths in submission order.
    pub sample_curves: Vec<Vec<CurvePoint>>,

    // Graph bounds
    /// Lowest plotted balance.
    pub min_y: f64,
    /// Highest plotted balance.
    pub max_y: f64,
    /// Last trade index.
    pub max_x: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SimulationRequest {
        SimulationRequest::new(vec![100.0, -50.0], 1000.0)
    }

    #[test]
    fn test_request_defaults() {
        let req = request();
        assert_eq!(req.num_simulations, DEFAULT_NUM_SIMULATIONS);
        assert!(req.randomize_order);
        assert_eq!(req.confidence_level_percent, 95.0);
        assert_eq!(req.total_trades(), 2);
    }

    #[test]
    fn test_validate_accepts_valid_request() {
        assert_eq!(request().validate(), Ok(()));
    }

    #[test]
    fn test_validate_empty_outcomes_first() {
        let req = SimulationRequest::new(vec![], -1.0);
        assert_eq!(req.validate(), Err(SimulationError::EmptyOutcomes));
    }

    #[test]
    fn test_validate_rejects_bad_balance() {
        for balance in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let req = SimulationRequest::new(vec![1.0], balance);
            assert!(matches!(
                req.validate(),
                Err(SimulationError::NonPositiveBalance { .. })
            ));
        }
    }

    #[test]
    fn test_validate_rejects_zero_simulations() {
        let req = request().with_simulations(0);
        assert_eq!(req.validate(), Err(SimulationError::InvalidSimulationCount));
    }

    #[test]
    fn test_validate_rejects_confidence_bounds() {
        for level in [0.0, 100.0, -5.0, 150.0] {
            let req = request().with_confidence_level(level);
            assert!(matches!(
                req.validate(),
                Err(SimulationError::InvalidConfidenceLevel { .. })
            ));
        }
    }

    #[test]
    fn test_curve_point_serializes_as_xy() {
        let json = serde_json::to_value(CurvePoint::new(3, 1050.0)).unwrap();
        assert_eq!(json["x"], 3);
        assert_eq!(json["y"], 1050.0);
    }

    #[test]
    fn test_balance_at_falls_back_to_final() {
        let path = PathResult {
            final_balance: 1100.0,
            return_percent: 10.0,
            max_drawdown: 0.0,
            max_drawdown_percent: 0.0,
            max_consecutive_losses: 0,
            winning_trades: 1,
            losing_trades: 0,
            win_rate: 100.0,
            avg_win: 100.0,
            avg_loss: 0.0,
            risk_reward_ratio: 0.0,
            profit_factor: 0.0,
            sharpe_ratio: 0.0,
            calmar_ratio: 0.0,
            equity_curve: vec![1000.0, 1100.0],
        };

        assert_eq!(path.balance_at(0), 1000.0);
        assert_eq!(path.balance_at(7), 1100.0);
        assert_eq!(path.trade_count(), 1);
        assert_eq!(path.flat_trades(), 0);
    }
}
