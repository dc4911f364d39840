//! Request defaults and input locations.

use serde::{Deserialize, Serialize};

use crate::simulation::SimulationRequest;
use crate::simulation::constants::{DEFAULT_CONFIDENCE_LEVEL_PERCENT, DEFAULT_NUM_SIMULATIONS};

/// Defaults applied to requests built from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDefaults {
    /// Paths per run.
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,
    /// Shuffle trade order per path.
    #[serde(default = "default_true")]
    pub randomize_order: bool,
    /// Percentile complement used for the confidence curve.
    #[serde(default = "default_confidence_level")]
    pub confidence_level_percent: f64,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            num_simulations: DEFAULT_NUM_SIMULATIONS,
            randomize_order: true,
            confidence_level_percent: DEFAULT_CONFIDENCE_LEVEL_PERCENT,
        }
    }
}

impl SimulationDefaults {
    /// Build a request for `outcomes` using these defaults.
    #[must_use]
    pub fn to_request(&self, outcomes: Vec<f64>, initial_balance: f64) -> SimulationRequest {
        SimulationRequest::new(outcomes, initial_balance)
            .with_simulations(self.num_simulations)
            .with_randomize_order(self.randomize_order)
            .with_confidence_level(self.confidence_level_percent)
    }
}

/// Where trade outcomes come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InputConfig {
    /// Outcome file; the first CLI argument takes precedence.
    #[serde(default)]
    pub outcomes_path: Option<String>,
    /// Initial balance when the file does not carry one.
    #[serde(default)]
    pub initial_balance: Option<f64>,
}

const fn default_num_simulations() -> usize {
    DEFAULT_NUM_SIMULATIONS
}

const fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL_PERCENT
}

const fn default_true() -> bool {
    true
}
