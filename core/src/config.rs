//! Experiment configuration types

use crate::record::{Column, DEFAULT_COLUMNS};
use crate::treatment::{CacheState, Factors, QueryShape};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Experiment configuration
///
/// Defines the factor levels of the design and the measurement discipline:
/// repetitions per worker, warmup size, pacing and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Measurements per worker per treatment
    pub repetitions: usize,

    /// Discarded requests before a warm treatment
    pub warmup_requests: usize,

    /// Pause between consecutive requests of one worker (milliseconds)
    pub request_interval_ms: u64,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Pause between treatments (seconds)
    pub stabilization_interval_secs: u64,

    /// Worker counts to measure
    pub concurrent_clients: Vec<usize>,

    /// Query shapes to measure
    pub query_types: Vec<QueryShape>,

    /// Cache states to measure
    pub cache_states: Vec<CacheState>,

    /// Seed for the treatment order; random when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            repetitions: 100,
            warmup_requests: 15,
            request_interval_ms: 100,
            timeout_secs: 30,
            stabilization_interval_secs: 30,
            concurrent_clients: vec![1, 10, 50],
            query_types: QueryShape::ALL.to_vec(),
            cache_states: CacheState::ALL.to_vec(),
            seed: None,
        }
    }
}

impl ExperimentConfig {
    /// Set repetitions per worker
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set the warmup request count
    pub fn with_warmup_requests(mut self, warmup: usize) -> Self {
        self.warmup_requests = warmup;
        self
    }

    /// Set the inter-request interval
    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the inter-treatment stabilization interval
    pub fn with_stabilization_interval(mut self, interval: Duration) -> Self {
        self.stabilization_interval_secs = interval.as_secs();
        self
    }

    /// Set the factor levels
    pub fn with_factors(
        mut self,
        query_types: Vec<QueryShape>,
        concurrent_clients: Vec<usize>,
        cache_states: Vec<CacheState>,
    ) -> Self {
        self.query_types = query_types;
        self.concurrent_clients = concurrent_clients;
        self.cache_states = cache_states;
        self
    }

    /// Fix the treatment order
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pause between consecutive requests of one worker
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pause between treatments
    pub fn stabilization_interval(&self) -> Duration {
        Duration::from_secs(self.stabilization_interval_secs)
    }

    /// Factor levels for the enumerator
    pub fn factors(&self) -> Factors {
        Factors {
            query_shapes: self.query_types.clone(),
            concurrency_levels: self.concurrent_clients.clone(),
            cache_states: self.cache_states.clone(),
        }
    }

    /// Records the full plan will append to the log
    pub fn expected_records(&self) -> usize {
        let per_level: usize = self.concurrent_clients.iter().sum();
        per_level * self.query_types.len() * self.cache_states.len() * 2 * self.repetitions
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repetitions == 0 {
            return Err(ConfigError::InvalidRepetitions(
                "repetitions must be at least 1".into(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "timeout must be at least 1 second".into(),
            ));
        }

        if self.concurrent_clients.is_empty() {
            return Err(ConfigError::EmptyFactor("concurrent_clients"));
        }
        if self.concurrent_clients.contains(&0) {
            return Err(ConfigError::InvalidConcurrency(
                "concurrency levels must be at least 1".into(),
            ));
        }
        if self.query_types.is_empty() {
            return Err(ConfigError::EmptyFactor("query_types"));
        }
        if self.cache_states.is_empty() {
            return Err(ConfigError::EmptyFactor("cache_states"));
        }

        Ok(())
    }
}

/// Where and how results are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one CSV file per run
    pub results_dir: PathBuf,

    /// Column order of the results log
    pub csv_headers: Vec<Column>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("./results"),
            csv_headers: DEFAULT_COLUMNS.to_vec(),
        }
    }
}

impl OutputConfig {
    /// Create an output config writing into `results_dir`
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            ..Default::default()
        }
    }

    /// Replace the column order
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.csv_headers = columns;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.csv_headers.is_empty() {
            return Err(ConfigError::InvalidHeaders("header list is empty".into()));
        }
        let mut seen = HashSet::new();
        for column in &self.csv_headers {
            if !seen.insert(column) {
                return Err(ConfigError::InvalidHeaders(format!(
                    "column {column} appears more than once"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid repetitions value
    #[error("Invalid repetitions: {0}")]
    InvalidRepetitions(String),

    /// Invalid concurrency value
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// Invalid timeout
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    /// A factor has no levels
    #[error("Factor {0} has no levels")]
    EmptyFactor(&'static str),

    /// Invalid CSV header list
    #[error("Invalid CSV headers: {0}")]
    InvalidHeaders(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExperimentConfig::default();
        assert_eq!(config.repetitions, 100);
        assert_eq!(config.warmup_requests, 15);
        assert_eq!(config.request_interval(), Duration::from_millis(100));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.stabilization_interval(), Duration::from_secs(30));
        assert_eq!(config.concurrent_clients, vec![1, 10, 50]);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder_pattern() {
        let config = ExperimentConfig::default()
            .with_repetitions(3)
            .with_warmup_requests(5)
            .with_request_interval(Duration::from_millis(10))
            .with_factors(vec![QueryShape::Simple], vec![2], vec![CacheState::Cold])
            .with_seed(9);

        assert_eq!(config.repetitions, 3);
        assert_eq!(config.warmup_requests, 5);
        assert_eq!(config.request_interval_ms, 10);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.factors().treatment_count(), 2);
        assert_eq!(config.expected_records(), 12);
    }

    #[test]
    fn test_request_interval_saturates() {
        let config = ExperimentConfig::default().with_request_interval(Duration::MAX);
        assert_eq!(config.request_interval_ms, u64::MAX);
    }

    #[test]
    fn test_expected_records_full_design() {
        let config = ExperimentConfig::default();
        // (1 + 10 + 50) workers * 3 shapes * 2 cache states * 2 APIs * 100 reps
        assert_eq!(config.expected_records(), 61 * 3 * 2 * 2 * 100);
    }

    #[test]
    fn test_config_validation_zero_repetitions() {
        let config = ExperimentConfig::default().with_repetitions(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRepetitions(_))
        ));
    }

    #[test]
    fn test_config_validation_zero_concurrency() {
        let config = ExperimentConfig {
            concurrent_clients: vec![1, 0],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConcurrency(_))
        ));
    }

    #[test]
    fn test_config_validation_empty_factor() {
        let config = ExperimentConfig {
            cache_states: vec![],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyFactor("cache_states"))
        ));
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let config = ExperimentConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_validation_duplicate_column() {
        let output = OutputConfig::default()
            .with_columns(vec![Column::Timestamp, Column::StatusCode, Column::Timestamp]);
        assert!(matches!(
            output.validate(),
            Err(ConfigError::InvalidHeaders(_))
        ));
        assert!(OutputConfig::default().with_columns(vec![]).validate().is_err());
        assert!(OutputConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            repetitions = 3
            concurrent_clients = [2]
            query_types = ["simple", "aggregated"]
            cache_states = ["warm"]
            seed = 11
        "#;
        let config: ExperimentConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.repetitions, 3);
        assert_eq!(config.warmup_requests, 15);
        assert_eq!(
            config.query_types,
            vec![QueryShape::Simple, QueryShape::Aggregated]
        );
        assert_eq!(config.cache_states, vec![CacheState::Warm]);
        assert_eq!(config.seed, Some(11));
    }

    #[test]
    fn test_output_columns_from_toml() {
        let output: OutputConfig = toml::from_str(
            r#"
            results_dir = "/tmp/out"
            csv_headers = ["timestamp", "api_type", "status_code", "error"]
        "#,
        )
        .unwrap();

        assert_eq!(output.results_dir, PathBuf::from("/tmp/out"));
        assert_eq!(output.csv_headers.last(), Some(&Column::Error));
    }
}
