//! Terminal progress bar for experiment runs

use std::sync::atomic::{AtomicUsize, Ordering};

use api_bench_core::{MeasurementRecord, ProgressObserver, Treatment, TreatmentStats};
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str =
    "{prefix:.bold} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// One bar, reset at the start of every treatment
pub struct ProgressReporter {
    bar: ProgressBar,
    failed: AtomicUsize,
}

impl ProgressReporter {
    /// Create a reporter drawing to stderr
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let bar = ProgressBar::new(0);
        bar.set_style(style);

        Self {
            bar,
            failed: AtomicUsize::new(0),
        }
    }

    /// Remove the bar once the run ends
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ProgressReporter {
    fn treatment_started(&self, index: usize, total: usize, treatment: &Treatment, expected: usize) {
        self.failed.store(0, Ordering::Relaxed);
        self.bar.reset();
        self.bar.set_length(expected as u64);
        self.bar.set_prefix(format!("[{index}/{total}]"));
        self.bar.set_message(treatment.to_string());
    }

    fn measurement_recorded(&self, record: &MeasurementRecord) {
        if !record.success {
            let failed = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
            self.bar.set_message(format!(
                "{}/{} (cache={}, cc={}) {failed} failed",
                record.api_kind, record.query_shape, record.cache_state, record.concurrency_level
            ));
        }
        self.bar.inc(1);
    }

    fn treatment_finished(&self, index: usize, stats: &TreatmentStats) {
        self.bar.println(format!(
            "treatment {index}: {} ok, {} failed ({:.1}%), mean {:.1} ms, {:.1} req/s",
            stats.succeeded,
            stats.failed,
            stats.error_rate() * 100.0,
            stats.mean_response_ms,
            stats.requests_per_second
        ));
    }
}
