//! api-bench-core: Engine for controlled REST vs GraphQL experiments
//!
//! This crate provides everything between the configuration and the HTTP
//! clients, including:
//!
//! - Experiment factors and the randomized treatment plan
//! - Core traits (ApiClient, ProgressObserver)
//! - Workers, the treatment runner and the experiment coordinator
//! - The append-only CSV results log
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod log;
pub mod orchestrator;
pub mod outcome;
pub mod record;
pub mod runner;
pub mod traits;
pub mod treatment;
pub mod worker;

pub use config::{ConfigError, ExperimentConfig, OutputConfig};
pub use error::*;
pub use log::ResultsLog;
pub use orchestrator::{Experiment, ExperimentBuilder, ExperimentState};
pub use outcome::{Outcome, TRANSPORT_FAILURE_STATUS};
pub use record::{Column, MeasurementRecord, DEFAULT_COLUMNS};
pub use runner::{TreatmentRunner, TreatmentStats};
pub use traits::*;
pub use treatment::{enumerate, ApiKind, CacheState, Factors, QueryShape, Treatment};
pub use worker::{Worker, WorkerBuilder, WorkerStats};

#[cfg(test)]
mod testing;
