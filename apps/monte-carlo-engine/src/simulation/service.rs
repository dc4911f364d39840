//! Async control surface over the blocking runner.
//!
//! Each submitted run executes on a dedicated blocking task and streams
//! [`SimulationEvent`]s over an unbounded channel, so the worker never waits
//! on the consumer. Runs on one service are serialized by the runner lock.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::error::{ErrorCode, ErrorReport, SimulationError};
use crate::observability::record_run;

use super::config::RunnerConfig;
use super::progress::Progress;
use super::runner::{RunOutcome, SimulationRunner, StopFlag};
use super::types::{AggregatedMetrics, SimulationRequest};

/// Notification emitted during a run.
///
/// Zero or more `Progress` events precede exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SimulationEvent {
    /// Paths completed so far.
    Progress(Progress),
    /// Aggregated results of a finished run.
    Completed(Box<AggregatedMetrics>),
    /// The run was rejected or the worker failed.
    Failed {
        /// Stable error code.
        code: ErrorCode,
        /// Human-readable reason.
        reason: String,
    },
    /// A stop request was honored.
    Stopped,
}

impl SimulationEvent {
    fn failed(error: &SimulationError) -> Self {
        Self::Failed {
            code: error.code(),
            reason: error.to_string(),
        }
    }

    /// Serializable error body of a `Failed` event.
    #[must_use]
    pub fn error_report(&self) -> Option<ErrorReport> {
        match self {
            Self::Failed { code, reason } => Some(ErrorReport::new(*code, reason.clone())),
            _ => None,
        }
    }

    /// Whether no further events follow this one.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }

    /// Metric label for terminal events.
    #[must_use]
    pub const fn outcome_label(&self) -> &'static str {
        match self {
            Self::Progress(_) => "running",
            Self::Completed(_) => "completed",
            Self::Failed { .. } => "failed",
            Self::Stopped => "stopped",
        }
    }
}

/// Handle to one submitted run.
#[derive(Debug)]
pub struct RunHandle {
    run_id: Uuid,
    events: mpsc::UnboundedReceiver<SimulationEvent>,
    task: Option<JoinHandle<()>>,
}

impl RunHandle {
    /// Unique id of this run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Next event, or `None` once the terminal event has been consumed.
    pub async fn next_event(&mut self) -> Option<SimulationEvent> {
        self.events.recv().await
    }

    /// Drain every event of the run.
    pub async fn collect_events(mut self) -> Vec<SimulationEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.events.recv().await {
            events.push(event);
        }
        if let Some(task) = self.task.take() {
            // Terminal event was already delivered; a join error here has
            // nothing left to report.
            let _ = task.await;
        }
        events
    }
}

/// Submits runs and relays stop requests.
#[derive(Debug, Clone)]
pub struct SimulationService {
    runner: Arc<Mutex<SimulationRunner>>,
    stop: StopFlag,
}

impl SimulationService {
    /// Create a service around a runner built from `config`.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_runner(SimulationRunner::new(config))
    }

    /// Create a service around an existing runner.
    #[must_use]
    pub fn with_runner(runner: SimulationRunner) -> Self {
        Self {
            runner: Arc::new(Mutex::new(runner)),
            stop: StopFlag::new(),
        }
    }

    /// Submit a run.
    ///
    /// Clears any earlier stop request. Invalid requests yield a single
    /// `Failed` event without starting a worker. Must be called from within a
    /// tokio runtime.
    pub fn submit(&self, request: SimulationRequest) -> RunHandle {
        let run_id = Uuid::new_v4();
        let (tx, events) = mpsc::unbounded_channel();
        self.stop.reset();

        if let Err(e) = request.validate() {
            warn!(%run_id, error = %e, code = %e.code(), "Rejected simulation request");
            record_run("failed", 0.0);
            let _ = tx.send(SimulationEvent::failed(&e));
            return RunHandle {
                run_id,
                events,
                task: None,
            };
        }

        info!(
            %run_id,
            paths = request.num_simulations,
            trades = request.total_trades(),
            "Starting {} simulations...",
            request.num_simulations
        );

        let runner = Arc::clone(&self.runner);
        let stop = self.stop.clone();
        let started = Instant::now();

        let task = tokio::spawn(async move {
            let progress_tx = tx.clone();
            let span = info_span!("simulation", %run_id);

            let joined = tokio::task::spawn_blocking(move || {
                let _entered = span.entered();
                let mut runner = runner.lock().unwrap_or_else(PoisonError::into_inner);
                runner.run(&request, &stop, |progress| {
                    let _ = progress_tx.send(SimulationEvent::Progress(progress));
                })
            })
            .await;

            let event = match joined {
                Ok(Ok(RunOutcome::Completed(metrics))) => SimulationEvent::Completed(metrics),
                Ok(Ok(RunOutcome::Stopped { completed_paths })) => {
                    info!(%run_id, completed_paths, "Simulation stopped");
                    SimulationEvent::Stopped
                }
                Ok(Err(e)) => {
                    warn!(%run_id, error = %e, "Simulation failed");
                    SimulationEvent::failed(&e)
                }
                Err(join_error) => {
                    let e = SimulationError::computation(join_error.to_string());
                    warn!(%run_id, error = %e, "Simulation worker terminated abnormally");
                    SimulationEvent::failed(&e)
                }
            };

            record_run(event.outcome_label(), started.elapsed().as_secs_f64());
            let _ = tx.send(event);
        });

        RunHandle {
            run_id,
            events,
            task: Some(task),
        }
    }

    /// Ask the active run to stop. Idempotent; a no-op when idle.
    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    /// Shared stop flag, e.g. for signal handlers.
    #[must_use]
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }
}
