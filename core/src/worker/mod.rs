//! Worker module for executing measurements
//!
//! The Worker is the unit of concurrency in a treatment, responsible for the
//! simple but critical loop: **execute -> record -> pause -> repeat**.
//!
//! Each Worker is a tokio task that:
//!
//! 1. Executes the treatment's query shape via its `ApiClient`
//! 2. Turns the outcome (success or failure) into a `MeasurementRecord`
//! 3. Appends the record to the shared `ResultsLog`
//! 4. Pauses for the request interval, except after the final repetition
//! 5. Repeats until it has performed its repetitions
//!
//! # Example
//!
//! ```ignore
//! use api_bench_core::worker::WorkerBuilder;
//!
//! let worker = WorkerBuilder::new(0)
//!     .treatment(treatment)
//!     .client(client)
//!     .log(log)
//!     .repetitions(100)
//!     .request_interval(Duration::from_millis(100))
//!     .build()?;
//!
//! let stats = worker.run().await?;
//! println!("Succeeded: {}", stats.succeeded);
//! ```

mod builder;
mod executor;
mod stats;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use stats::WorkerStats;
