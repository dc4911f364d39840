//! Cross-path aggregation into summary statistics and plotting curves.
//!
//! Every percentile is nearest-rank over the observed values, never
//! interpolated. Curves are downsampled with a fixed stride so that their
//! size stays bounded regardless of the trade count.

use tracing::debug;

use crate::error::SimulationError;

use super::config::AggregationConfig;
use super::constants::HUNDRED;
use super::math::{mean, nearest_rank_index, percentile};
use super::types::{AggregatedMetrics, CurvePoint, PathResult};

/// Reduces path results into [`AggregatedMetrics`].
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    config: AggregationConfig,
}

impl MetricsAggregator {
    /// Create a new aggregator.
    #[must_use]
    pub const fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    /// Get the aggregation config.
    #[must_use]
    pub const fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Aggregate path results.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NoResults`] when `results` is empty.
    pub fn aggregate(
        &self,
        results: &[PathResult],
        total_trades: usize,
        initial_balance: f64,
        confidence_level_percent: f64,
    ) -> Result<AggregatedMetrics, SimulationError> {
        if results.is_empty() {
            return Err(SimulationError::NoResults);
        }

        let returns: Vec<f64> = results.iter().map(|r| r.return_percent).collect();
        let drawdowns: Vec<f64> = results.iter().map(|r| r.max_drawdown_percent).collect();
        let sharpe_ratios: Vec<f64> = results.iter().map(|r| r.sharpe_ratio).collect();
        let profit_factors: Vec<f64> = results.iter().map(|r| r.profit_factor).collect();
        let calmar_ratios: Vec<f64> = results.iter().map(|r| r.calmar_ratio).collect();
        let win_rates: Vec<f64> = results.iter().map(|r| r.win_rate).collect();
        let risk_rewards: Vec<f64> = results.iter().map(|r| r.risk_reward_ratio).collect();
        let avg_losses: Vec<f64> = results.iter().map(|r| r.avg_loss).collect();
        let final_balances: Vec<f64> = results.iter().map(|r| r.final_balance).collect();

        let largest_win = results.iter().map(|r| r.avg_win).fold(0.0, f64::max);

        let ruined = results
            .iter()
            .filter(|r| r.max_drawdown_percent > self.config.ruin_threshold_percent)
            .count();
        let risk_of_ruin = ruined as f64 / results.len() as f64 * HUNDRED;

        let expectancy_per_trade = if total_trades > 0 {
            mean(&final_balances) / total_trades as f64
        } else {
            0.0
        };

        let curves = self.build_curves(
            results,
            total_trades,
            initial_balance,
            confidence_level_percent,
        );

        let metrics = AggregatedMetrics {
            num_simulations: results.len(),
            total_trades,
            median_return: percentile(&returns, 50.0),
            mean_return: mean(&returns),
            median_max_drawdown: percentile(&drawdowns, 50.0),
            median_sharpe_ratio: percentile(&sharpe_ratios, 50.0),
            risk_of_ruin,
            median_calmar_ratio: percentile(&calmar_ratios, 50.0),
            best_return: percentile(&returns, 99.0),
            worst_return: percentile(&returns, 1.0),
            median_profit_factor: percentile(&profit_factors, 50.0),
            best_max_drawdown: percentile(&drawdowns, 5.0),
            worst_max_drawdown: percentile(&drawdowns, 95.0),
            value_at_risk_95: percentile(&returns, 5.0),
            median_win_rate: percentile(&win_rates, 50.0),
            avg_risk_reward: mean(&risk_rewards),
            expectancy_per_trade,
            avg_loss: mean(&avg_losses),
            largest_win,
            median_curve: curves.median,
            confidence_curve: curves.confidence,
            sample_curves: curves.samples,
            min_y: curves.min_y,
            max_y: curves.max_y,
            max_x: total_trades,
        };

        debug!(
            paths = metrics.num_simulations,
            median_return = metrics.median_return,
            worst_max_drawdown = metrics.worst_max_drawdown,
            risk_of_ruin = metrics.risk_of_ruin,
            curve_points = metrics.median_curve.len(),
            "Aggregated simulation paths"
        );

        Ok(metrics)
    }

    /// Stride between plotted trade indices for `points_to_plot` points.
    #[must_use]
    pub fn plot_step(&self, points_to_plot: usize) -> usize {
        (points_to_plot / self.config.max_plot_points.max(1)).max(1)
    }

    fn build_curves(
        &self,
        results: &[PathResult],
        total_trades: usize,
        initial_balance: f64,
        confidence_level_percent: f64,
    ) -> Curves {
        let points_to_plot = total_trades + 1;
        let step = self.plot_step(points_to_plot);
        let lower_tail = HUNDRED - confidence_level_percent;

        let mut bounds = AxisBounds::new(initial_balance);
        let mut median = Vec::with_capacity(points_to_plot / step + 1);
        let mut confidence = Vec::with_capacity(points_to_plot / step + 1);
        let mut balances = Vec::with_capacity(results.len());

        for t in (0..points_to_plot).step_by(step) {
            balances.clear();
            balances.extend(results.iter().map(|r| r.balance_at(t)));
            balances.sort_by(f64::total_cmp);

            let median_value = balances[balances.len() / 2];
            let confidence_value = balances[nearest_rank_index(lower_tail, balances.len())];

            bounds.include(median_value);
            bounds.include(confidence_value);
            median.push(CurvePoint::new(t, median_value));
            confidence.push(CurvePoint::new(t, confidence_value));
        }

        // Leading paths in submission order
        let samples = results
            .iter()
            .take(self.config.sample_curve_count)
            .map(|r| {
                r.equity_curve
                    .iter()
                    .enumerate()
                    .step_by(step)
                    .map(|(t, &balance)| {
                        bounds.include(balance);
                        CurvePoint::new(t, balance)
                    })
                    .collect()
            })
            .collect();

        Curves {
            median,
            confidence,
            samples,
            min_y: bounds.min,
            max_y: bounds.max,
        }
    }
}

struct Curves {
    median: Vec<CurvePoint>,
    confidence: Vec<CurvePoint>,
    samples: Vec<Vec<CurvePoint>>,
    min_y: f64,
    max_y: f64,
}

/// Running y-axis extrema.
struct AxisBounds {
    min: f64,
    max: f64,
}

impl AxisBounds {
    const fn new(seed: f64) -> Self {
        Self {
            min: seed,
            max: seed,
        }
    }

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}
