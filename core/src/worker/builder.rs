//! Builder pattern for Worker construction

use crate::error::{BenchError, BenchResult};
use crate::log::ResultsLog;
use crate::traits::{ApiClient, NoopObserver, ProgressObserver};
use crate::treatment::Treatment;

use super::executor::Worker;

use std::sync::Arc;
use std::time::Duration;

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .treatment(treatment)
///     .client(client)
///     .log(log)
///     .repetitions(100)
///     .request_interval(Duration::from_millis(100))
///     .build()?;
/// ```
pub struct WorkerBuilder {
    id: usize,
    treatment: Option<Treatment>,
    client: Option<Arc<dyn ApiClient>>,
    log: Option<Arc<ResultsLog>>,
    observer: Option<Arc<dyn ProgressObserver>>,
    repetitions: Option<usize>,
    request_interval: Duration,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            treatment: None,
            client: None,
            log: None,
            observer: None,
            repetitions: None,
            request_interval: Duration::ZERO,
        }
    }

    /// Set the treatment
    pub fn treatment(mut self, treatment: Treatment) -> Self {
        self.treatment = Some(treatment);
        self
    }

    /// Set the API client
    pub fn client(mut self, client: Arc<dyn ApiClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the results log
    pub fn log(mut self, log: Arc<ResultsLog>) -> Self {
        self.log = Some(log);
        self
    }

    /// Set the progress observer
    pub fn observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Set the number of measurements
    pub fn repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = Some(repetitions);
        self
    }

    /// Set the pause between measurements
    pub fn request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if any required field is missing.
    pub fn build(self) -> BenchResult<Worker> {
        let treatment = self
            .treatment
            .ok_or_else(|| BenchError::missing_config("treatment"))?;
        let client = self.client.ok_or_else(|| BenchError::missing_config("client"))?;
        let log = self.log.ok_or_else(|| BenchError::missing_config("log"))?;
        let repetitions = self
            .repetitions
            .ok_or_else(|| BenchError::missing_config("repetitions"))?;
        let observer = self.observer.unwrap_or_else(|| Arc::new(NoopObserver));

        Ok(Worker::new(
            self.id,
            treatment,
            client,
            log,
            observer,
            repetitions,
            self.request_interval,
        ))
    }
}
