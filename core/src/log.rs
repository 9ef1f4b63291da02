//! Append-only CSV results log
//!
//! The log is the only shared mutable resource of a run. Workers never touch
//! the file: they call [`ResultsLog::append`], which serializes writers behind
//! a mutex and flushes each complete row before releasing it, so rows never
//! interleave and every row written before an abort is readable afterwards.

use crate::error::{BenchError, BenchErrorKind, BenchResult};
use crate::record::{Column, MeasurementRecord};
use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Results log for one experiment run
pub struct ResultsLog {
    path: PathBuf,
    columns: Vec<Column>,
    writer: Mutex<Option<csv::Writer<File>>>,
    rows: AtomicUsize,
}

impl ResultsLog {
    /// File name of the log for a run started at `started_at`
    pub fn file_name(started_at: DateTime<Utc>) -> String {
        format!("experiment_{}.csv", started_at.format("%Y-%m-%dT%H-%M-%S"))
    }

    /// Create the results directory if needed and open a fresh log in it
    pub fn create(dir: &Path, started_at: DateTime<Utc>, columns: &[Column]) -> BenchResult<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            BenchError::new(
                BenchErrorKind::Io,
                format!("cannot create results directory {}: {e}", dir.display()),
            )
        })?;
        Self::create_at(dir.join(Self::file_name(started_at)), columns)
    }

    /// Open a fresh log at `path` and write the header row
    ///
    /// Fails if the file already exists; a rerun always starts a new log.
    pub fn create_at(path: impl Into<PathBuf>, columns: &[Column]) -> BenchResult<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                BenchError::new(
                    BenchErrorKind::Io,
                    format!("cannot create results log {}: {e}", path.display()),
                )
            })?;

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        writer.write_record(columns.iter().map(Column::name))?;
        writer.flush()?;

        tracing::debug!(path = %path.display(), columns = columns.len(), "Results log opened");

        Ok(Self {
            path,
            columns: columns.to_vec(),
            writer: Mutex::new(Some(writer)),
            rows: AtomicUsize::new(0),
        })
    }

    /// Append one record as a complete, flushed row
    pub async fn append(&self, record: &MeasurementRecord) -> BenchResult<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or_else(BenchError::log_closed)?;
        writer.write_record(record.fields(&self.columns))?;
        writer.flush()?;
        self.rows.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Flush and close the file; later appends fail with `LogClosed`
    ///
    /// Closing twice is a no-op.
    pub async fn close(&self) -> BenchResult<&Path> {
        let mut guard = self.writer.lock().await;
        if let Some(mut writer) = guard.take() {
            writer.flush()?;
            tracing::debug!(
                path = %self.path.display(),
                rows = self.rows_written(),
                "Results log closed"
            );
        }
        Ok(&self.path)
    }

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column order of every row
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Data rows appended so far (header excluded)
    pub fn rows_written(&self) -> usize {
        self.rows.load(Ordering::SeqCst)
    }
}

impl Drop for ResultsLog {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.get_mut().as_mut() {
            if let Err(e) = writer.flush() {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to flush results log");
            }
        }
    }
}

impl std::fmt::Debug for ResultsLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsLog")
            .field("path", &self.path)
            .field("columns", &self.columns)
            .field("rows", &self.rows_written())
            .finish()
    }
}
