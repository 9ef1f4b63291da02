//! Treatment runner
//!
//! Runs one treatment to completion:
//! - an optional warmup phase (warm cache state only) whose outcomes are discarded
//! - exactly `concurrency_level` workers, each performing `repetitions` measurements
//! - a join over every worker, then a check that `concurrency_level × repetitions`
//!   records reached the log

mod aggregator;

pub use aggregator::{aggregate_worker_stats, TreatmentStats};

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::config::ExperimentConfig;
use crate::error::{BenchError, BenchResult};
use crate::log::ResultsLog;
use crate::traits::{ApiClient, ApiClients, NoopObserver, ProgressObserver};
use crate::treatment::Treatment;
use crate::worker::{Worker, WorkerBuilder};

/// Executes treatments against a pair of API clients
pub struct TreatmentRunner {
    clients: ApiClients,
    repetitions: usize,
    warmup_requests: usize,
    request_interval: Duration,
    observer: Arc<dyn ProgressObserver>,
}

impl TreatmentRunner {
    /// Create a runner using the measurement discipline of `config`
    pub fn new(clients: ApiClients, config: &ExperimentConfig) -> Self {
        Self {
            clients,
            repetitions: config.repetitions,
            warmup_requests: config.warmup_requests,
            request_interval: config.request_interval(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report progress to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Records a treatment must append
    pub fn expected_records(&self, treatment: &Treatment) -> usize {
        treatment.concurrency_level * self.repetitions
    }

    /// Run `treatment`, appending its measurements to `log`
    ///
    /// Returns once every worker has finished. Fails if the warmup task or any
    /// worker failed, or if the log gained a number of rows other than
    /// `concurrency_level × repetitions` while the treatment ran.
    pub async fn run(&self, treatment: &Treatment, log: &Arc<ResultsLog>) -> BenchResult<TreatmentStats> {
        let client = self.clients.for_kind(treatment.api_kind);

        if treatment.cache_state.is_warm() {
            let warmup = tokio::spawn(warm_up(
                Arc::clone(&client),
                *treatment,
                self.warmup_requests,
                self.request_interval,
            ));
            if let Err(e) = warmup.await {
                tracing::error!(treatment = %treatment, error = %e, "Warmup task panicked");
                return Err(BenchError::worker(format!("warmup did not complete: {e}")));
            }
        }

        let expected = self.expected_records(treatment);
        let rows_before = log.rows_written();

        // Build every worker before spawning so a build failure leaves no task behind
        let workers = (0..treatment.concurrency_level)
            .map(|worker_id| {
                WorkerBuilder::new(worker_id)
                    .treatment(*treatment)
                    .client(Arc::clone(&client))
                    .log(Arc::clone(log))
                    .observer(Arc::clone(&self.observer))
                    .repetitions(self.repetitions)
                    .request_interval(self.request_interval)
                    .build()
            })
            .collect::<BenchResult<Vec<Worker>>>()?;

        tracing::debug!(
            treatment = %treatment,
            workers = workers.len(),
            repetitions = self.repetitions,
            "Spawning workers"
        );

        let handles = workers
            .into_iter()
            .map(|worker| tokio::spawn(worker.run()));
        let results = join_all(handles).await;

        let mut stats = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (worker_id, result) in results.into_iter().enumerate() {
            match result {
                Ok(Ok(worker_stats)) => stats.push(worker_stats),
                Ok(Err(e)) => {
                    tracing::error!(worker_id, error = %e, "Worker returned error");
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    tracing::error!(worker_id, error = %e, "Worker task panicked");
                    first_error.get_or_insert_with(|| {
                        BenchError::worker(format!("worker {worker_id} did not complete: {e}"))
                    });
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let recorded = log.rows_written() - rows_before;
        if recorded != expected {
            return Err(BenchError::incomplete_treatment(expected, recorded));
        }

        Ok(aggregate_worker_stats(&stats))
    }
}

/// Prime downstream caches with discarded requests
async fn warm_up(
    client: Arc<dyn ApiClient>,
    treatment: Treatment,
    requests: usize,
    request_interval: Duration,
) {
    tracing::info!(treatment = %treatment, requests, "Warming up");

    for _ in 0..requests {
        let outcome = client.execute(treatment.query_shape).await;
        tracing::trace!(
            status = outcome.status_code,
            response_time_ms = outcome.response_time_ms,
            "Warmup request"
        );
        tokio::time::sleep(request_interval).await;
    }
}

impl std::fmt::Debug for TreatmentRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreatmentRunner")
            .field("clients", &self.clients)
            .field("repetitions", &self.repetitions)
            .field("warmup_requests", &self.warmup_requests)
            .field("request_interval", &self.request_interval)
            .finish()
    }
}
