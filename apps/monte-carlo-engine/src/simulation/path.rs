//! Single-path replay of a trade sequence.
//!
//! Walks the outcomes once, streaming:
//! - Equity curve and running peak
//! - Maximum drawdown, absolute and relative to the peak it was measured from
//! - Win/loss classification and loss streaks
//! - Per-trade percent returns for the Sharpe ratio

use super::constants::{CALMAR_DRAWDOWN_EPSILON, HUNDRED, TRADING_DAYS};
use super::math::{mean, population_std_dev};
use super::types::PathResult;

/// Replays one ordered outcome sequence against a starting balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSimulator;

impl PathSimulator {
    /// Create a new path simulator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Simulate one path.
    ///
    /// Pure function of its inputs. Callers validate that `outcomes` is
    /// non-empty and `initial_balance` is positive.
    #[must_use]
    pub fn simulate(&self, outcomes: &[f64], initial_balance: f64) -> PathResult {
        let mut walk = PathWalk::new(initial_balance, outcomes.len());
        for &outcome in outcomes {
            walk.apply(outcome);
        }
        walk.finish()
    }
}

/// Running state of one path.
struct PathWalk {
    initial_balance: f64,
    balance: f64,
    peak: f64,
    max_drawdown: f64,
    max_drawdown_percent: f64,
    consecutive_losses: u64,
    max_consecutive_losses: u64,
    gross_profit: f64,
    gross_loss: f64,
    winning_trades: u64,
    losing_trades: u64,
    trade_returns: Vec<f64>,
    equity_curve: Vec<f64>,
}

impl PathWalk {
    fn new(initial_balance: f64, trades: usize) -> Self {
        let mut equity_curve = Vec::with_capacity(trades + 1);
        equity_curve.push(initial_balance);

        Self {
            initial_balance,
            balance: initial_balance,
            peak: initial_balance,
            max_drawdown: 0.0,
            max_drawdown_percent: 0.0,
            consecutive_losses: 0,
            max_consecutive_losses: 0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            winning_trades: 0,
            losing_trades: 0,
            trade_returns: Vec::with_capacity(trades),
            equity_curve,
        }
    }

    fn apply(&mut self, outcome: f64) {
        let balance_before = self.balance;
        self.balance += outcome;
        self.equity_curve.push(self.balance);

        if self.balance > self.peak {
            self.peak = self.balance;
        }

        // Percent is pinned to the peak current when the new maximum is
        // recorded, not to the highest peak of the whole path.
        let drawdown = self.peak - self.balance;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
            self.max_drawdown_percent = self.max_drawdown / self.peak * HUNDRED;
        }

        if outcome > 0.0 {
            self.winning_trades += 1;
            self.gross_profit += outcome;
            self.consecutive_losses = 0;
        } else if outcome < 0.0 {
            self.losing_trades += 1;
            self.gross_loss += outcome.abs();
            self.consecutive_losses += 1;
            self.max_consecutive_losses = self.max_consecutive_losses.max(self.consecutive_losses);
        }

        let trade_return = if balance_before == 0.0 {
            0.0
        } else {
            outcome / balance_before * HUNDRED
        };
        self.trade_returns.push(trade_return);
    }

    fn finish(self) -> PathResult {
        let total_trades = self.trade_returns.len();

        let return_percent = (self.balance - self.initial_balance) / self.initial_balance * HUNDRED;

        let win_rate = if total_trades > 0 {
            self.winning_trades as f64 / total_trades as f64 * HUNDRED
        } else {
            0.0
        };

        let avg_win = if self.winning_trades > 0 {
            self.gross_profit / self.winning_trades as f64
        } else {
            0.0
        };

        let avg_loss = if self.losing_trades > 0 {
            self.gross_loss / self.losing_trades as f64
        } else {
            0.0
        };

        let risk_reward_ratio = if avg_loss != 0.0 {
            avg_win / avg_loss
        } else {
            0.0
        };

        let profit_factor = if self.gross_loss != 0.0 {
            self.gross_profit / self.gross_loss
        } else {
            0.0
        };

        let std_dev = population_std_dev(&self.trade_returns);
        let sharpe_ratio = if std_dev != 0.0 {
            mean(&self.trade_returns) / std_dev * TRADING_DAYS.sqrt()
        } else {
            0.0
        };

        let calmar_ratio = if self.max_drawdown_percent > CALMAR_DRAWDOWN_EPSILON {
            (return_percent / self.max_drawdown_percent).abs()
        } else {
            0.0
        };

        PathResult {
            final_balance: self.balance,
            return_percent,
            max_drawdown: self.max_drawdown,
            max_drawdown_percent: self.max_drawdown_percent,
            max_consecutive_losses: self.max_consecutive_losses,
            winning_trades: self.winning_trades,
            losing_trades: self.losing_trades,
            win_rate,
            avg_win,
            avg_loss,
            risk_reward_ratio,
            profit_factor,
            sharpe_ratio,
            calmar_ratio,
            equity_curve: self.equity_curve,
        }
    }
}
