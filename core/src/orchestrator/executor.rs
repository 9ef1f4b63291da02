//! Experiment execution logic

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::config::{ExperimentConfig, OutputConfig};
use crate::error::{BenchError, BenchResult};
use crate::log::ResultsLog;
use crate::runner::{TreatmentRunner, TreatmentStats};
use crate::traits::{ApiClients, ProgressObserver};
use crate::treatment::{enumerate, Treatment};

/// Lifecycle stage of a run, used in log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentState {
    /// Opening the results log
    Initializing,
    /// Building the treatment plan
    Enumerating,
    /// Running the treatment with this 1-based index
    Executing(usize),
    /// Log closed, run complete
    Finalized,
}

impl fmt::Display for ExperimentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => f.write_str("initializing"),
            Self::Enumerating => f.write_str("enumerating"),
            Self::Executing(i) => write!(f, "executing({i})"),
            Self::Finalized => f.write_str("finalized"),
        }
    }
}

/// Experiment manages the run lifecycle
///
/// Responsible for opening the results log, running every treatment of the
/// plan in order, and closing the log on every exit path.
pub struct Experiment {
    /// Experiment configuration
    pub(crate) config: ExperimentConfig,

    /// Results location and column order
    pub(crate) output: OutputConfig,

    /// Runs one treatment at a time
    pub(crate) runner: TreatmentRunner,

    /// Progress observer (shared with workers)
    pub(crate) observer: Arc<dyn ProgressObserver>,
}

impl Experiment {
    /// Create a new experiment
    ///
    /// Use `ExperimentBuilder` for validated construction.
    pub fn new(
        config: ExperimentConfig,
        output: OutputConfig,
        clients: ApiClients,
        observer: Arc<dyn ProgressObserver>,
    ) -> Self {
        let runner = TreatmentRunner::new(clients, &config).with_observer(Arc::clone(&observer));
        Self {
            config,
            output,
            runner,
            observer,
        }
    }

    /// Get the experiment configuration
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Treatment order this experiment runs
    ///
    /// Only reproducible across calls when a seed is configured.
    pub fn plan(&self) -> Vec<Treatment> {
        enumerate(&self.config.factors(), self.config.seed)
    }

    /// Run the experiment
    ///
    /// Returns the path of the completed results log. On failure the log is
    /// closed with every row written so far intact, and the error reports the
    /// last fully recorded treatment.
    pub async fn run(&self) -> BenchResult<PathBuf> {
        let start = Instant::now();

        tracing::info!(
            state = %ExperimentState::Initializing,
            results_dir = %self.output.results_dir.display(),
            "Starting experiment"
        );
        let log = Arc::new(ResultsLog::create(
            &self.output.results_dir,
            Utc::now(),
            &self.output.csv_headers,
        )?);
        tracing::debug!(
            path = %log.path().display(),
            columns = ?log.columns(),
            "Results log opened"
        );

        let plan = self.plan();
        let total = plan.len();
        tracing::info!(
            state = %ExperimentState::Enumerating,
            treatments = total,
            expected_records = self.config.expected_records(),
            seed = ?self.config.seed,
            "Treatment plan ready"
        );

        let mut completed = Vec::with_capacity(total);
        for (i, treatment) in plan.iter().enumerate() {
            let index = i + 1;
            let expected = self.runner.expected_records(treatment);

            tracing::info!(
                state = %ExperimentState::Executing(index),
                total,
                treatment = %treatment,
                expected_records = expected,
                "Running treatment"
            );
            self.observer.treatment_started(index, total, treatment, expected);

            let stats = match self.runner.run(treatment, &log).await {
                Ok(stats) => stats,
                Err(e) => {
                    // 1-based index of the previous treatment
                    let last_completed = (i > 0).then_some(i);
                    tracing::error!(
                        treatment = %treatment,
                        index,
                        total,
                        last_completed = ?last_completed,
                        error = %e,
                        "Treatment failed, aborting experiment"
                    );
                    if let Err(close_err) = log.close().await {
                        tracing::error!(error = %close_err, "Failed to close results log");
                    }
                    return Err(BenchError::aborted(index, total, last_completed, &e));
                }
            };

            tracing::info!(
                index,
                succeeded = stats.succeeded,
                failed = stats.failed,
                mean_response_ms = stats.mean_response_ms,
                rps = stats.requests_per_second,
                "Treatment completed"
            );
            self.observer.treatment_finished(index, &stats);
            completed.push(stats);

            if index < total {
                let pause = self.config.stabilization_interval();
                if !pause.is_zero() {
                    tracing::debug!(secs = pause.as_secs(), "Stabilizing before next treatment");
                    tokio::time::sleep(pause).await;
                }
            }
        }

        let path = log.close().await?.to_path_buf();
        let summary = summarize(&completed);
        tracing::info!(
            state = %ExperimentState::Finalized,
            path = %path.display(),
            records = log.rows_written(),
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Experiment completed"
        );

        Ok(path)
    }
}

/// Totals over every completed treatment
fn summarize(stats: &[TreatmentStats]) -> TreatmentStats {
    stats.iter().fold(TreatmentStats::default(), |mut acc, s| {
        acc.workers += s.workers;
        acc.succeeded += s.succeeded;
        acc.failed += s.failed;
        acc.duration += s.duration;
        acc
    })
}

impl fmt::Debug for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Experiment")
            .field("config", &self.config)
            .field("output", &self.output)
            .field("runner", &self.runner)
            .finish()
    }
}
