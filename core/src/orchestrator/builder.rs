//! Builder pattern for Experiment construction

use std::sync::Arc;

use crate::config::{ExperimentConfig, OutputConfig};
use crate::error::{BenchError, BenchResult};
use crate::traits::{ApiClients, NoopObserver, ProgressObserver};

use super::executor::Experiment;

/// Builder for creating an Experiment with proper configuration
///
/// # Example
///
/// ```ignore
/// let experiment = ExperimentBuilder::new()
///     .config(ExperimentConfig::default().with_repetitions(10))
///     .output(OutputConfig::new("./results"))
///     .clients(ApiClients::new(rest, graphql))
///     .seed(42)
///     .build()?;
/// ```
pub struct ExperimentBuilder {
    config: ExperimentConfig,
    output: OutputConfig,
    clients: Option<ApiClients>,
    observer: Arc<dyn ProgressObserver>,
}

impl ExperimentBuilder {
    /// Create a new experiment builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ExperimentConfig::default(),
            output: OutputConfig::default(),
            clients: None,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Set the full experiment configuration
    pub fn config(mut self, config: ExperimentConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the output configuration
    pub fn output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    /// Set the REST/GraphQL client pair
    pub fn clients(mut self, clients: ApiClients) -> Self {
        self.clients = Some(clients);
        self
    }

    /// Set the progress observer
    pub fn observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Fix the treatment order, overriding any configured seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the experiment
    ///
    /// # Errors
    ///
    /// Returns an error if clients are not set, or if configuration
    /// validation fails.
    pub fn build(self) -> BenchResult<Experiment> {
        let clients = self
            .clients
            .ok_or_else(|| BenchError::missing_config("clients"))?;

        self.config
            .validate()
            .map_err(|e| BenchError::config(e.to_string()))?;
        self.output
            .validate()
            .map_err(|e| BenchError::config(e.to_string()))?;

        Ok(Experiment::new(self.config, self.output, clients, self.observer))
    }
}

impl Default for ExperimentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
