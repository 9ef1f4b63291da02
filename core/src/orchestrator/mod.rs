//! Experiment coordinator
//!
//! The Experiment drives a complete run:
//! - Creating the results log and writing its header
//! - Enumerating the randomized treatment plan
//! - Running each treatment in order, pausing between treatments
//! - Closing the log on success and on failure
//!
//! # Example
//!
//! ```ignore
//! use api_bench_core::ExperimentBuilder;
//!
//! let experiment = ExperimentBuilder::new()
//!     .config(config)
//!     .output(output)
//!     .clients(clients)
//!     .build()?;
//!
//! let path = experiment.run().await?;
//! println!("Results: {}", path.display());
//! ```

mod builder;
mod executor;

pub use builder::ExperimentBuilder;
pub use executor::{Experiment, ExperimentState};

#[cfg(test)]
mod tests;
