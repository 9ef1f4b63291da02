//! Configuration file loading
//!
//! One TOML file with `[api]`, `[queries]`, `[experiment]`, `[output]` and
//! `[logging]` sections. Every field has a default, so an empty file
//! describes the reference experiment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use api_bench_core::{ExperimentConfig, OutputConfig};
use api_bench_vendors::{ApiConfig, QueryCatalog};
use serde::{Deserialize, Serialize};

/// Complete configuration of one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Endpoints and credentials
    pub api: ApiConfig,
    /// REST paths and GraphQL documents per query shape
    pub queries: QueryCatalog,
    /// Factor levels and measurement discipline
    pub experiment: ExperimentConfig,
    /// Results directory and CSV columns
    pub output: OutputConfig,
    /// Diagnostic log settings
    pub logging: LoggingConfig,
}

/// Diagnostic logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Directory receiving `experiment.log`
    pub log_dir: PathBuf,
    /// Whether to write the log file at all
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("./logs"),
            file: true,
        }
    }
}

impl BenchConfig {
    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.api.validate().context("[api]")?;
        self.queries.validate().context("[queries]")?;
        self.experiment.validate().context("[experiment]")?;
        self.output.validate().context("[output]")?;
        if self.logging.level.trim().is_empty() {
            anyhow::bail!("[logging]: level must not be empty");
        }
        Ok(())
    }

    /// Effective configuration as TOML (the token is never included)
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
