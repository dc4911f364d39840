//! Orchestration of N independent simulation paths.
//!
//! The runner validates the request, replays the outcomes once per path
//! (shuffled when requested), reports throttled progress and aggregates the
//! collected paths. A cooperative stop flag is checked before every path;
//! a stopped run discards its partial results.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{Level, debug, info, span, warn};

use crate::error::SimulationError;
use crate::observability::record_paths_simulated;

use super::aggregator::MetricsAggregator;
use super::config::RunnerConfig;
use super::path::PathSimulator;
use super::progress::{Progress, ProgressCadence, ProgressTracker};
use super::shuffler::RandomOrderShuffler;
use super::types::{AggregatedMetrics, PathResult, SimulationRequest};

/// Shared cooperative stop flag.
///
/// Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create a cleared flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Idempotent.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop was requested.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag before a new run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Terminal state of a run that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every path ran and was aggregated.
    Completed(Box<AggregatedMetrics>),
    /// A stop was observed; partial results were discarded.
    Stopped {
        /// Paths finished before the stop was observed.
        completed_paths: usize,
    },
}

/// Runs Monte Carlo simulations.
#[derive(Debug)]
pub struct SimulationRunner {
    config: RunnerConfig,
    shuffler: RandomOrderShuffler,
    simulator: PathSimulator,
    aggregator: MetricsAggregator,
    thread_pool: Option<Arc<rayon::ThreadPool>>,
}

impl SimulationRunner {
    /// Create a runner whose shuffler follows `config.seed`.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        let shuffler = RandomOrderShuffler::new(config.seed);
        Self::with_shuffler(config, shuffler)
    }

    /// Create a runner with an injected shuffler.
    #[must_use]
    pub fn with_shuffler(config: RunnerConfig, shuffler: RandomOrderShuffler) -> Self {
        let thread_pool = Self::build_thread_pool(&config);
        let aggregator = MetricsAggregator::new(config.aggregation.clone());

        Self {
            config,
            shuffler,
            simulator: PathSimulator::new(),
            aggregator,
            thread_pool,
        }
    }

    /// Get the runner config.
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn build_thread_pool(config: &RunnerConfig) -> Option<Arc<rayon::ThreadPool>> {
        if !config.parallel.enabled || config.parallel.max_threads == 0 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel.max_threads)
            .thread_name(|i| format!("monte-carlo-{i}"))
            .build()
        {
            Ok(pool) => Some(Arc::new(pool)),
            Err(e) => {
                warn!(error = %e, "Failed to build simulation thread pool, using global pool");
                None
            }
        }
    }

    /// Number of threads used in parallel mode.
    #[must_use]
    pub fn effective_thread_count(&self) -> usize {
        self.thread_pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads())
    }

    /// Run a simulation.
    ///
    /// `on_progress` receives strictly increasing `current` values; the last
    /// call of a completed run has `current == total`.
    ///
    /// # Errors
    ///
    /// Returns a precondition error before any path runs when the request is
    /// invalid.
    pub fn run<F>(
        &mut self,
        request: &SimulationRequest,
        stop: &StopFlag,
        on_progress: F,
    ) -> Result<RunOutcome, SimulationError>
    where
        F: FnMut(Progress),
    {
        request.validate()?;

        let _span = span!(
            Level::INFO,
            "monte_carlo_run",
            paths = request.num_simulations,
            trades = request.total_trades()
        )
        .entered();

        info!(
            paths = request.num_simulations,
            trades = request.total_trades(),
            randomize = request.randomize_order,
            parallel = self.config.parallel.enabled,
            "Running Monte Carlo simulation"
        );

        let tracker = ProgressTracker::new(request.num_simulations as u64);
        let results = if self.config.parallel.enabled {
            self.run_parallel(request, stop, &tracker, on_progress)
        } else {
            self.run_sequential(request, stop, &tracker, on_progress)
        };

        let results = match results {
            Ok(results) => results,
            Err(completed_paths) => {
                info!(completed_paths, "Simulation stopped, discarding partial results");
                return Ok(RunOutcome::Stopped { completed_paths });
            }
        };

        let snapshot = tracker.snapshot();
        record_paths_simulated(snapshot.completed);

        let metrics = self.aggregator.aggregate(
            &results,
            request.total_trades(),
            request.initial_balance,
            request.confidence_level_percent,
        )?;

        info!(
            paths = metrics.num_simulations,
            elapsed_ms = snapshot.elapsed_ms,
            paths_per_sec = snapshot.paths_per_sec,
            median_return = metrics.median_return,
            risk_of_ruin = metrics.risk_of_ruin,
            "Monte Carlo simulation complete"
        );

        Ok(RunOutcome::Completed(Box::new(metrics)))
    }

    /// Strictly ordered loop. `Err` carries the number of finished paths.
    fn run_sequential<F>(
        &mut self,
        request: &SimulationRequest,
        stop: &StopFlag,
        tracker: &ProgressTracker,
        mut on_progress: F,
    ) -> Result<Vec<PathResult>, usize>
    where
        F: FnMut(Progress),
    {
        let total = request.num_simulations;
        let cadence = ProgressCadence::new(self.config.progress_interval);
        let mut results = Vec::with_capacity(total);

        for i in 0..total {
            if stop.is_stop_requested() {
                return Err(i);
            }

            let working = self
                .shuffler
                .order(&request.outcomes, request.randomize_order);
            results.push(self.simulator.simulate(&working, request.initial_balance));
            tracker.path_completed();

            if cadence.should_emit(i, total) {
                on_progress(Progress::new(i + 1, total));
            }
        }

        Ok(results)
    }

    /// Batched rayon execution. `Err` carries the number of kept paths.
    fn run_parallel<F>(
        &mut self,
        request: &SimulationRequest,
        stop: &StopFlag,
        tracker: &ProgressTracker,
        mut on_progress: F,
    ) -> Result<Vec<PathResult>, usize>
    where
        F: FnMut(Progress),
    {
        let total = request.num_simulations;
        let batch_size = self.config.parallel.batch_size.max(1);
        let simulator = self.simulator;
        let outcomes = request.outcomes.as_slice();
        let initial_balance = request.initial_balance;
        let mut results = Vec::with_capacity(total);

        debug!(
            threads = self.effective_thread_count(),
            batch_size, "Running paths in parallel"
        );

        let mut start = 0;
        while start < total {
            if stop.is_stop_requested() {
                return Err(results.len());
            }
            let end = (start + batch_size).min(total);

            // Forks are drawn in submission order so seeded runs reproduce.
            let shufflers: Vec<Option<RandomOrderShuffler>> = (start..end)
                .map(|_| request.randomize_order.then(|| self.shuffler.fork()))
                .collect();

            let simulate_batch = || {
                shufflers
                    .into_par_iter()
                    .map(|shuffler| {
                        if stop.is_stop_requested() {
                            return None;
                        }
                        let working = match shuffler {
                            Some(mut shuffler) => shuffler.order(outcomes, true),
                            None => outcomes.to_vec(),
                        };
                        let result = simulator.simulate(&working, initial_balance);
                        tracker.path_completed();
                        Some(result)
                    })
                    .collect::<Option<Vec<PathResult>>>()
            };

            let batch = match &self.thread_pool {
                Some(pool) => pool.install(simulate_batch),
                None => simulate_batch(),
            };

            match batch {
                Some(batch) => results.extend(batch),
                None => return Err(results.len()),
            }

            let snapshot = tracker.snapshot();
            debug!(
                completed = snapshot.completed,
                total = snapshot.total,
                eta_secs = snapshot.eta_secs,
                "Batch finished"
            );

            on_progress(Progress::new(results.len(), total));
            start = end;
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::{ParallelConfig, RunnerConfig};

    fn sample_outcomes() -> Vec<f64> {
        vec![
            500.0, -200.0, 300.0, 100.0, -150.0, 400.0, -100.0, 250.0, 350.0, -50.0,
        ]
    }

    fn request(n: usize) -> SimulationRequest {
        SimulationRequest::new(sample_outcomes(), 10_000.0).with_simulations(n)
    }

    fn completed(outcome: RunOutcome) -> AggregatedMetrics {
        match outcome {
            RunOutcome::Completed(metrics) => *metrics,
            RunOutcome::Stopped { .. } => panic!("run should complete"),
        }
    }

    #[test]
    fn test_precondition_failures() {
        let mut runner = SimulationRunner::new(RunnerConfig::default());
        let stop = StopFlag::new();

        let empty = SimulationRequest::new(vec![], 1000.0);
        assert_eq!(
            runner.run(&empty, &stop, |_| {}),
            Err(SimulationError::EmptyOutcomes)
        );

        let broke = SimulationRequest::new(vec![1.0], 0.0);
        assert!(matches!(
            runner.run(&broke, &stop, |_| {}),
            Err(SimulationError::NonPositiveBalance { .. })
        ));

        let zero = request(0);
        assert_eq!(
            runner.run(&zero, &stop, |_| {}),
            Err(SimulationError::InvalidSimulationCount)
        );
    }

    #[test]
    fn test_sequential_progress_cadence() {
        let mut runner = SimulationRunner::new(RunnerConfig::default().with_seed(1));
        let mut seen = Vec::new();

        let outcome = runner
            .run(&request(25), &StopFlag::new(), |p| seen.push(p.current))
            .unwrap();

        assert_eq!(seen, vec![1, 11, 21, 25]);
        assert_eq!(completed(outcome).num_simulations, 25);
    }

    #[test]
    fn test_stop_before_start_yields_stopped() {
        let mut runner = SimulationRunner::new(RunnerConfig::default());
        let stop = StopFlag::new();
        stop.request_stop();

        let mut progress_calls = 0;
        let outcome = runner
            .run(&request(100), &stop, |_| progress_calls += 1)
            .unwrap();

        assert_eq!(outcome, RunOutcome::Stopped { completed_paths: 0 });
        assert_eq!(progress_calls, 0);
    }

    #[test]
    fn test_stop_during_run_discards_results() {
        let mut runner = SimulationRunner::new(RunnerConfig::default());
        let stop = StopFlag::new();
        let trigger = stop.clone();

        let outcome = runner
            .run(&request(1000), &stop, |p| {
                if p.current >= 21 {
                    trigger.request_stop();
                }
            })
            .unwrap();

        assert_eq!(outcome, RunOutcome::Stopped { completed_paths: 21 });
    }

    #[test]
    fn test_fixed_order_runs_are_identical() {
        let req = request(50).with_randomize_order(false);
        let mut a = SimulationRunner::new(RunnerConfig::default());
        let mut b = SimulationRunner::new(RunnerConfig::default());

        let first = completed(a.run(&req, &StopFlag::new(), |_| {}).unwrap());
        let second = completed(b.run(&req, &StopFlag::new(), |_| {}).unwrap());

        assert_eq!(first, second);
        // Every path is identical, so every percentile collapses to one value
        assert_eq!(first.best_return, first.worst_return);
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let req = request(200);
        let mut a = SimulationRunner::new(RunnerConfig::default().with_seed(42));
        let mut b = SimulationRunner::new(RunnerConfig::default().with_seed(42));

        let first = completed(a.run(&req, &StopFlag::new(), |_| {}).unwrap());
        let second = completed(b.run(&req, &StopFlag::new(), |_| {}).unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn test_shuffling_preserves_final_balance() {
        let mut runner = SimulationRunner::new(RunnerConfig::default().with_seed(3));
        let metrics = completed(runner.run(&request(100), &StopFlag::new(), |_| {}).unwrap());

        // Order changes the path, never the sum
        let expected_return = sample_outcomes().iter().sum::<f64>() / 10_000.0 * 100.0;
        assert!((metrics.best_return - expected_return).abs() < 1e-9);
        assert!((metrics.worst_return - expected_return).abs() < 1e-9);
        assert!(metrics.worst_max_drawdown >= metrics.best_max_drawdown);
    }

    #[test]
    fn test_parallel_matches_across_thread_counts() {
        let req = request(300);
        let mut single = SimulationRunner::new(RunnerConfig {
            parallel: ParallelConfig {
                enabled: true,
                max_threads: 1,
                batch_size: 64,
            },
            ..RunnerConfig::default().with_seed(9)
        });
        let mut many = SimulationRunner::new(RunnerConfig {
            parallel: ParallelConfig {
                enabled: true,
                max_threads: 4,
                batch_size: 64,
            },
            ..RunnerConfig::default().with_seed(9)
        });

        let first = completed(single.run(&req, &StopFlag::new(), |_| {}).unwrap());
        let second = completed(many.run(&req, &StopFlag::new(), |_| {}).unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_progress_is_per_batch() {
        let mut runner = SimulationRunner::new(RunnerConfig::default().with_seed(2).with_parallel(40));
        let mut seen = Vec::new();

        let outcome = runner
            .run(&request(100), &StopFlag::new(), |p| seen.push(p.current))
            .unwrap();

        assert_eq!(seen, vec![40, 80, 100]);
        assert_eq!(completed(outcome).num_simulations, 100);
    }

    #[test]
    fn test_parallel_stop_between_batches() {
        let mut runner = SimulationRunner::new(RunnerConfig::default().with_parallel(10));
        let stop = StopFlag::new();
        let trigger = stop.clone();

        let outcome = runner
            .run(&request(100), &stop, |_| trigger.request_stop())
            .unwrap();

        assert_eq!(outcome, RunOutcome::Stopped { completed_paths: 10 });
    }

    #[test]
    fn test_stop_flag_reset() {
        let flag = StopFlag::new();
        flag.request_stop();
        flag.request_stop();
        assert!(flag.is_stop_requested());

        flag.reset();
        assert!(!flag.is_stop_requested());
    }
}
