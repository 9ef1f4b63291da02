//! Worker measurement loop

use crate::error::BenchResult;
use crate::log::ResultsLog;
use crate::record::MeasurementRecord;
use crate::traits::{ApiClient, ProgressObserver};
use crate::treatment::Treatment;

use super::stats::WorkerStats;

use std::sync::Arc;
use std::time::Duration;

/// Worker performs one treatment's repetitions: execute -> record -> pause -> repeat
///
/// Workers are tokio tasks spawned by the treatment runner. They share the
/// API client and the results log via `Arc` and hold no other shared state.
pub struct Worker {
    /// Worker index within the treatment
    id: usize,

    /// Treatment whose factors every record carries
    treatment: Treatment,

    /// Client for the treatment's API kind
    client: Arc<dyn ApiClient>,

    /// Shared results log
    log: Arc<ResultsLog>,

    /// Progress sink
    observer: Arc<dyn ProgressObserver>,

    /// Sequential measurements to perform
    repetitions: usize,

    /// Pause after each measurement except the last
    request_interval: Duration,
}

impl Worker {
    /// Create a new worker
    pub fn new(
        id: usize,
        treatment: Treatment,
        client: Arc<dyn ApiClient>,
        log: Arc<ResultsLog>,
        observer: Arc<dyn ProgressObserver>,
        repetitions: usize,
        request_interval: Duration,
    ) -> Self {
        Self {
            id,
            treatment,
            client,
            log,
            observer,
            repetitions,
            request_interval,
        }
    }

    /// Run the worker loop
    ///
    /// Every measurement is appended to the log whether or not the request
    /// succeeded. Only a log write failure ends the loop early.
    pub async fn run(self) -> BenchResult<WorkerStats> {
        let mut stats = WorkerStats::new();
        stats.start();

        tracing::debug!(worker_id = self.id, treatment = %self.treatment, "Worker started");

        for rep in 0..self.repetitions {
            let outcome = self.client.execute(self.treatment.query_shape).await;
            let record = MeasurementRecord::new(&self.treatment, &outcome);

            if let Err(e) = self.log.append(&record).await {
                tracing::error!(
                    worker_id = self.id,
                    repetition = rep,
                    error = %e,
                    "Failed to append measurement"
                );
                return Err(e);
            }

            stats.record(&outcome);
            self.observer.measurement_recorded(&record);

            if let Some(error) = &outcome.error {
                tracing::debug!(
                    worker_id = self.id,
                    status = outcome.status_code,
                    transport = outcome.is_transport_failure(),
                    error = %error,
                    "Request failed"
                );
            }

            if rep + 1 < self.repetitions {
                tokio::time::sleep(self.request_interval).await;
            }
        }

        stats.stop();
        tracing::debug!(
            worker_id = self.id,
            succeeded = stats.succeeded,
            failed = stats.failed,
            error_rate = stats.error_rate(),
            rps = stats.requests_per_second(),
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Worker finished"
        );

        Ok(stats)
    }

    /// Get the worker ID
    pub fn id(&self) -> usize {
        self.id
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("treatment", &self.treatment)
            .field("repetitions", &self.repetitions)
            .field("request_interval", &self.request_interval)
            .finish()
    }
}
