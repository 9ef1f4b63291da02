//! Error types for api-bench-core

use thiserror::Error;

/// Classification of a [`BenchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BenchErrorKind {
    /// Configuration failed validation
    #[error("configuration error")]
    Config,

    /// A required builder field was not supplied
    #[error("missing configuration")]
    MissingConfig,

    /// Filesystem error while creating or writing the results log
    #[error("IO error")]
    Io,

    /// CSV encoding error
    #[error("CSV error")]
    Csv,

    /// A worker task failed or panicked
    #[error("worker error")]
    Worker,

    /// A treatment finished with fewer records than it must produce
    #[error("incomplete treatment")]
    IncompleteTreatment,

    /// Append attempted after the results log was closed
    #[error("results log closed")]
    LogClosed,

    /// The experiment stopped before running every treatment
    #[error("experiment aborted at treatment {failed}/{total}")]
    Aborted {
        /// 1-based index of the treatment that failed
        failed: usize,
        /// Number of treatments in the plan
        total: usize,
        /// 1-based index of the last treatment fully recorded, if any
        last_completed: Option<usize>,
    },
}

/// Core error type
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct BenchError {
    /// What went wrong
    pub kind: BenchErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl BenchError {
    /// Create an error of the given kind
    pub fn new(kind: BenchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Configuration validation failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::Config, message)
    }

    /// A builder was finalized without a required field
    pub fn missing_config(field: &str) -> Self {
        Self::new(
            BenchErrorKind::MissingConfig,
            format!("missing required field: {field}"),
        )
    }

    /// Worker task failure
    pub fn worker(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::Worker, message)
    }

    /// Treatment produced the wrong number of records
    pub fn incomplete_treatment(expected: usize, recorded: usize) -> Self {
        Self::new(
            BenchErrorKind::IncompleteTreatment,
            format!("expected {expected} records, recorded {recorded}"),
        )
    }

    /// Results log no longer accepts rows
    pub fn log_closed() -> Self {
        Self::new(
            BenchErrorKind::LogClosed,
            "cannot append to a closed results log",
        )
    }

    /// Wrap a treatment failure into a run abort
    pub fn aborted(
        failed: usize,
        total: usize,
        last_completed: Option<usize>,
        cause: &BenchError,
    ) -> Self {
        let completed = match last_completed {
            Some(idx) => format!("last completed treatment: {idx}"),
            None => "no treatment completed".to_string(),
        };
        Self::new(
            BenchErrorKind::Aborted {
                failed,
                total,
                last_completed,
            },
            format!("{cause} ({completed})"),
        )
    }

    /// Last fully recorded treatment, when this error aborted a run
    pub fn last_completed_treatment(&self) -> Option<usize> {
        match self.kind {
            BenchErrorKind::Aborted { last_completed, .. } => last_completed,
            _ => None,
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        Self::new(BenchErrorKind::Io, err.to_string())
    }
}

impl From<csv::Error> for BenchError {
    fn from(err: csv::Error) -> Self {
        Self::new(BenchErrorKind::Csv, err.to_string())
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_message() {
        let err = BenchError::missing_config("client");
        assert_eq!(err.kind, BenchErrorKind::MissingConfig);
        assert!(err.message.contains("client"));
    }

    #[test]
    fn test_aborted_points_at_last_completed() {
        let cause = BenchError::worker("worker 1 panicked");
        let err = BenchError::aborted(4, 12, Some(3), &cause);

        assert_eq!(err.last_completed_treatment(), Some(3));
        let text = err.to_string();
        assert!(text.contains("4/12"));
        assert!(text.contains("last completed treatment: 3"));
        assert!(text.contains("worker 1 panicked"));
    }

    #[test]
    fn test_aborted_first_treatment() {
        let cause = BenchError::log_closed();
        let err = BenchError::aborted(1, 2, None, &cause);
        assert_eq!(err.last_completed_treatment(), None);
        assert!(err.to_string().contains("no treatment completed"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: BenchError = io.into();
        assert_eq!(err.kind, BenchErrorKind::Io);
        assert!(err.message.contains("disk full"));
    }
}
