//! Status line state driven by simulation events.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::simulation::{AggregatedMetrics, Progress, RunHandle, SimulationEvent};

use super::format::{format_money, format_pct, format_ratio};

/// Longest file name shown verbatim while parsing.
const MAX_FILE_NAME_CHARS: usize = 30;

/// What the status line is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Nothing running.
    Idle,
    /// Reading an outcome file.
    Parsing,
    /// A run is in progress.
    Simulating,
    /// The last run completed.
    Complete,
    /// The last run failed.
    Error,
    /// The last run was stopped.
    Stopped,
}

/// Current status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Display text.
    pub text: String,
    /// Progress in 0..=100.
    pub progress_percent: usize,
    /// Status kind.
    pub kind: StatusKind,
    /// Whether the status line should be visible.
    pub active: bool,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            text: "Ready".to_string(),
            progress_percent: 0,
            kind: StatusKind::Idle,
            active: false,
        }
    }
}

/// Tracks the status line across parsing and simulation.
#[derive(Debug, Default)]
pub struct StatusReporter {
    snapshot: StatusSnapshot,
}

impl StatusReporter {
    /// Create an idle reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status.
    #[must_use]
    pub const fn snapshot(&self) -> &StatusSnapshot {
        &self.snapshot
    }

    fn set(&mut self, text: String, progress_percent: usize, kind: StatusKind, active: bool) {
        self.snapshot = StatusSnapshot {
            text,
            progress_percent,
            kind,
            active,
        };
    }

    /// Back to idle.
    pub fn set_idle(&mut self) {
        self.snapshot = StatusSnapshot::default();
    }

    /// Show that `file_name` is being parsed. Long names keep their tail.
    pub fn set_parsing_file(&mut self, file_name: &str) {
        let char_count = file_name.chars().count();
        let short_name = if char_count > MAX_FILE_NAME_CHARS {
            let tail: String = file_name
                .chars()
                .skip(char_count - (MAX_FILE_NAME_CHARS - 3))
                .collect();
            format!("...{tail}")
        } else {
            file_name.to_string()
        };
        self.set(
            format!("Parsing {short_name}..."),
            0,
            StatusKind::Parsing,
            true,
        );
    }

    /// Parsing finished.
    pub fn parsing_complete(&mut self) {
        self.set("Parsing complete".to_string(), 100, StatusKind::Parsing, true);
    }

    /// A run of `num_simulations` paths was submitted.
    pub fn set_simulating(&mut self, num_simulations: usize) {
        self.set(
            format!("Starting {num_simulations} simulations..."),
            0,
            StatusKind::Simulating,
            true,
        );
    }

    /// Show an error.
    pub fn set_error(&mut self, reason: &str) {
        self.set(format!("Error: {reason}"), 0, StatusKind::Error, true);
    }

    fn update_progress(&mut self, progress: Progress) {
        if progress.total == 0 {
            return;
        }
        let percent = progress.percentage();
        self.set(
            format!("Running simulation... {percent}%"),
            percent,
            StatusKind::Simulating,
            true,
        );
    }

    /// Apply one event.
    pub fn handle(&mut self, event: &SimulationEvent) {
        match event {
            SimulationEvent::Progress(progress) => self.update_progress(*progress),
            SimulationEvent::Completed(metrics) => {
                self.set(
                    "Simulation complete".to_string(),
                    100,
                    StatusKind::Complete,
                    true,
                );
                log_summary(metrics);
            }
            SimulationEvent::Failed { reason, .. } => {
                warn!(reason = %reason, "Simulation failed");
                self.set_error(reason);
            }
            SimulationEvent::Stopped => {
                let percent = self.snapshot.progress_percent;
                self.set(
                    "Simulation stopped".to_string(),
                    percent,
                    StatusKind::Stopped,
                    false,
                );
            }
        }
    }

    /// Consume events until the terminal one, which is returned.
    pub async fn follow(&mut self, handle: &mut RunHandle) -> Option<SimulationEvent> {
        while let Some(event) = handle.next_event().await {
            self.handle(&event);
            if event.is_terminal() {
                return Some(event);
            }
        }
        None
    }
}

/// Human-readable summary lines for a finished run.
#[must_use]
pub fn summary_lines(metrics: &AggregatedMetrics) -> Vec<String> {
    vec![
        format!(
            "Simulations: {} x {} trades",
            metrics.num_simulations, metrics.total_trades
        ),
        format!(
            "Return: median {} | mean {} | best {} | worst {}",
            format_pct(metrics.median_return),
            format_pct(metrics.mean_return),
            format_pct(metrics.best_return),
            format_pct(metrics.worst_return)
        ),
        format!("Value at risk (95%): {}", format_pct(metrics.value_at_risk_95)),
        format!(
            "Max drawdown: median {} | best {} | worst {}",
            format_pct(metrics.median_max_drawdown),
            format_pct(metrics.best_max_drawdown),
            format_pct(metrics.worst_max_drawdown)
        ),
        format!("Risk of ruin: {}", format_pct(metrics.risk_of_ruin)),
        format!(
            "Sharpe {} | Calmar {} | Profit factor {} | Avg R:R {}",
            format_ratio(metrics.median_sharpe_ratio),
            format_ratio(metrics.median_calmar_ratio),
            format_ratio(metrics.median_profit_factor),
            format_ratio(metrics.avg_risk_reward)
        ),
        format!(
            "Win rate {} | Expectancy {} | Avg loss {} | Largest avg win {}",
            format_pct(metrics.median_win_rate),
            format_money(metrics.expectancy_per_trade),
            format_money(metrics.avg_loss),
            format_money(metrics.largest_win)
        ),
    ]
}

fn log_summary(metrics: &AggregatedMetrics) {
    info!(
        paths = metrics.num_simulations,
        median_return = %format_pct(metrics.median_return),
        worst_return = %format_pct(metrics.worst_return),
        median_max_drawdown = %format_pct(metrics.median_max_drawdown),
        risk_of_ruin = %format_pct(metrics.risk_of_ruin),
        median_sharpe = %format_ratio(metrics.median_sharpe_ratio),
        "Simulation complete"
    );
}
