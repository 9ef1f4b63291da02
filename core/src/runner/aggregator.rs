//! Result aggregation from a treatment's workers

use std::time::Duration;

use crate::worker::WorkerStats;

/// Aggregated statistics for one treatment
#[derive(Debug, Clone, Default)]
pub struct TreatmentStats {
    /// Number of workers that completed
    pub workers: usize,

    /// Measurements whose request succeeded
    pub succeeded: usize,

    /// Measurements whose request failed
    pub failed: usize,

    /// Maximum duration across all workers
    pub duration: Duration,

    /// Recorded measurements per second
    pub requests_per_second: f64,

    /// Mean response time across all measurements
    pub mean_response_ms: f64,
}

impl TreatmentStats {
    /// Get the total number of recorded measurements
    pub fn total_requests(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Get the success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        let total = self.total_requests();
        if total > 0 {
            self.succeeded as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Get the error rate (0.0 - 1.0)
    pub fn error_rate(&self) -> f64 {
        1.0 - self.success_rate()
    }
}

/// Aggregate statistics from a treatment's workers
pub fn aggregate_worker_stats(stats: &[WorkerStats]) -> TreatmentStats {
    if stats.is_empty() {
        return TreatmentStats::default();
    }

    let mut merged = WorkerStats::new();
    for s in stats {
        merged.merge(s);
    }

    // Workers run concurrently: the slowest one bounds the treatment
    let duration = stats
        .iter()
        .filter_map(|s| s.elapsed())
        .max()
        .unwrap_or(Duration::ZERO);

    let secs = duration.as_secs_f64();
    let requests_per_second = if secs > 0.0 {
        merged.total_requests() as f64 / secs
    } else {
        0.0
    };

    TreatmentStats {
        workers: stats.len(),
        succeeded: merged.succeeded,
        failed: merged.failed,
        duration,
        requests_per_second,
        mean_response_ms: merged.mean_response_ms(),
    }
}
