//! Progress tracking for simulation runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// A progress notification: `current` of `total` paths done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Paths completed so far (at least 1).
    pub current: usize,
    /// Paths requested.
    pub total: usize,
}

impl Progress {
    /// Create a new progress notification.
    #[must_use]
    pub const fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    /// Whole-number completion percentage.
    #[must_use]
    pub const fn percentage(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.current * 100 / self.total
        }
    }
}

/// Decides which path indices produce a progress notification.
///
/// The first path, every `interval`-th path and the last path notify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCadence {
    interval: usize,
}

impl ProgressCadence {
    /// Create a cadence; an interval of 0 is treated as 1.
    #[must_use]
    pub const fn new(interval: usize) -> Self {
        Self {
            interval: if interval == 0 { 1 } else { interval },
        }
    }

    /// Whether the zero-based path `index` of `total` should notify.
    #[must_use]
    pub const fn should_emit(&self, index: usize, total: usize) -> bool {
        index % self.interval == 0 || index + 1 == total
    }
}

/// Thread-safe completion counter with throughput estimates.
#[derive(Debug)]
pub struct ProgressTracker {
    total_paths: u64,
    completed_paths: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    #[must_use]
    pub fn new(total_paths: u64) -> Self {
        Self {
            total_paths,
            completed_paths: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Mark one path as completed, returning the new completed count.
    pub fn path_completed(&self) -> u64 {
        self.completed_paths.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get current progress.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let completed = self.completed_paths.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed();

        let paths_per_sec = if elapsed.as_secs_f64() > 0.0 {
            completed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        let remaining = self.total_paths.saturating_sub(completed);
        let eta_secs = if paths_per_sec > 0.0 {
            (remaining as f64 / paths_per_sec) as u64
        } else {
            0
        };

        ProgressSnapshot {
            total: self.total_paths,
            completed,
            elapsed_ms: elapsed.as_millis() as u64,
            eta_secs,
            paths_per_sec,
        }
    }
}

/// Progress snapshot with timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Total number of paths.
    pub total: u64,
    /// Completed paths.
    pub completed: u64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Estimated time remaining in seconds.
    pub eta_secs: u64,
    /// Paths simulated per second.
    pub paths_per_sec: f64,
}
