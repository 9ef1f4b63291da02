//! Tests for the Experiment coordinator

use super::builder::ExperimentBuilder;
use super::executor::ExperimentState;
use crate::config::{ExperimentConfig, OutputConfig};
use crate::record::{Column, DEFAULT_COLUMNS};
use crate::runner::TreatmentStats;
use crate::testing::{mock_clients, read_log, Behavior, MockClient};
use crate::traits::ProgressObserver;
use crate::treatment::{ApiKind, CacheState, QueryShape, Treatment};
use crate::BenchErrorKind;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

fn small_config() -> ExperimentConfig {
    ExperimentConfig::default()
        .with_repetitions(2)
        .with_warmup_requests(1)
        .with_request_interval(Duration::ZERO)
        .with_stabilization_interval(Duration::ZERO)
        .with_factors(
            vec![QueryShape::Simple, QueryShape::Nested],
            vec![1, 2],
            CacheState::ALL.to_vec(),
        )
}

fn succeeding_clients() -> (crate::traits::ApiClients, Arc<MockClient>, Arc<MockClient>) {
    mock_clients(
        MockClient::new(ApiKind::Rest, Behavior::Succeed),
        MockClient::new(ApiKind::GraphQl, Behavior::Succeed),
    )
}

fn only_file(dir: &Path) -> PathBuf {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1, "expected exactly one results file");
    entries.remove(0)
}

#[derive(Default)]
struct EventCounter {
    started: AtomicUsize,
    recorded: AtomicUsize,
    finished: AtomicUsize,
}

impl ProgressObserver for EventCounter {
    fn treatment_started(&self, _index: usize, _total: usize, _treatment: &Treatment, _expected: usize) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn measurement_recorded(&self, _record: &crate::record::MeasurementRecord) {
        self.recorded.fetch_add(1, Ordering::SeqCst);
    }

    fn treatment_finished(&self, _index: usize, _stats: &TreatmentStats) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Builder
// ============================================================================

#[test]
fn test_builder_requires_clients() {
    let err = ExperimentBuilder::new().build().unwrap_err();
    assert_eq!(err.kind, BenchErrorKind::MissingConfig);
    assert!(err.message.contains("clients"));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let (clients, _, _) = succeeding_clients();
    let err = ExperimentBuilder::new()
        .config(ExperimentConfig::default().with_repetitions(0))
        .clients(clients)
        .build()
        .unwrap_err();
    assert_eq!(err.kind, BenchErrorKind::Config);
}

#[test]
fn test_builder_rejects_invalid_output() {
    let (clients, _, _) = succeeding_clients();
    let err = ExperimentBuilder::new()
        .output(OutputConfig::default().with_columns(vec![]))
        .clients(clients)
        .build()
        .unwrap_err();
    assert_eq!(err.kind, BenchErrorKind::Config);
}

#[test]
fn test_builder_seed_gives_reproducible_plan() {
    let build = || {
        let (clients, _, _) = succeeding_clients();
        ExperimentBuilder::new()
            .config(small_config())
            .clients(clients)
            .seed(99)
            .build()
            .unwrap()
    };

    let first = build();
    assert_eq!(first.config().seed, Some(99));
    assert_eq!(first.plan(), build().plan());
    assert_eq!(first.plan().len(), 16);
}

#[test]
fn test_experiment_state_display() {
    assert_eq!(ExperimentState::Initializing.to_string(), "initializing");
    assert_eq!(ExperimentState::Executing(3).to_string(), "executing(3)");
    assert_eq!(ExperimentState::Finalized.to_string(), "finalized");
}

// ============================================================================
// Full runs
// ============================================================================

#[tokio::test]
async fn test_full_run_records_every_measurement() {
    let dir = tempfile::tempdir().unwrap();
    let (clients, rest, graphql) = succeeding_clients();
    let observer = Arc::new(EventCounter::default());

    let experiment = ExperimentBuilder::new()
        .config(small_config())
        .output(OutputConfig::new(dir.path().join("results")))
        .clients(clients)
        .observer(observer.clone())
        .seed(5)
        .build()
        .unwrap();

    let path = experiment.run().await.unwrap();

    assert!(path.starts_with(dir.path().join("results")));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("experiment_"));
    assert!(name.ends_with(".csv"));

    // (1 + 2) workers * 2 shapes * 2 cache states * 2 reps, per API
    let expected = experiment.config().expected_records();
    assert_eq!(expected, 48);

    let (header, rows) = read_log(&path);
    let names: Vec<&str> = DEFAULT_COLUMNS.iter().map(Column::name).collect();
    assert_eq!(header.iter().collect::<Vec<_>>(), names);
    assert_eq!(rows.len(), expected);
    assert_eq!(rows.iter().filter(|r| &r[1] == "REST").count(), 24);
    assert_eq!(rows.iter().filter(|r| &r[1] == "GraphQL").count(), 24);

    // Warm treatments add one discarded call per treatment: 2 shapes * 2 levels
    assert_eq!(rest.calls(), 24 + 4);
    assert_eq!(graphql.calls(), 24 + 4);

    assert_eq!(observer.started.load(Ordering::SeqCst), 16);
    assert_eq!(observer.finished.load(Ordering::SeqCst), 16);
    assert_eq!(observer.recorded.load(Ordering::SeqCst), 48);
}

#[tokio::test]
async fn test_two_treatment_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let (clients, _, _) = succeeding_clients();

    let config = ExperimentConfig::default()
        .with_repetitions(3)
        .with_request_interval(Duration::ZERO)
        .with_stabilization_interval(Duration::ZERO)
        .with_factors(vec![QueryShape::Simple], vec![2], vec![CacheState::Cold]);

    let experiment = ExperimentBuilder::new()
        .config(config)
        .output(OutputConfig::new(dir.path()))
        .clients(clients)
        .build()
        .unwrap();

    assert_eq!(experiment.plan().len(), 2);
    let path = experiment.run().await.unwrap();

    let (_, rows) = read_log(&path);
    assert_eq!(rows.len(), 12);
}

#[tokio::test(start_paused = true)]
async fn test_stabilization_pause_between_treatments_only() {
    let dir = tempfile::tempdir().unwrap();
    let (clients, _, _) = succeeding_clients();

    let config = ExperimentConfig::default()
        .with_repetitions(1)
        .with_request_interval(Duration::ZERO)
        .with_stabilization_interval(Duration::from_secs(10))
        .with_factors(vec![QueryShape::Simple], vec![1], vec![CacheState::Cold]);

    let experiment = ExperimentBuilder::new()
        .config(config)
        .output(OutputConfig::new(dir.path()))
        .clients(clients)
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    experiment.run().await.unwrap();
    let elapsed = start.elapsed();

    // Two treatments, one pause
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(20));
}

// ============================================================================
// Aborts
// ============================================================================

#[tokio::test]
async fn test_abort_keeps_written_rows_and_reports_progress() {
    let dir = tempfile::tempdir().unwrap();
    let (clients, _, _) = mock_clients(
        MockClient::new(ApiKind::Rest, Behavior::Succeed),
        MockClient::new(ApiKind::GraphQl, Behavior::Panic),
    );

    let experiment = ExperimentBuilder::new()
        .config(small_config())
        .output(OutputConfig::new(dir.path()))
        .clients(clients)
        .seed(17)
        .build()
        .unwrap();

    let plan = experiment.plan();
    let failing = plan
        .iter()
        .position(|t| t.api_kind == ApiKind::GraphQl)
        .unwrap();
    let rows_before: usize = plan[..failing]
        .iter()
        .map(|t| t.concurrency_level * 2)
        .sum();

    let err = experiment.run().await.unwrap_err();

    match err.kind {
        BenchErrorKind::Aborted {
            failed,
            total,
            last_completed,
        } => {
            assert_eq!(failed, failing + 1);
            assert_eq!(total, 16);
            assert_eq!(last_completed, (failing > 0).then_some(failing));
        }
        other => panic!("expected Aborted, got {other:?}"),
    }
    assert_eq!(err.last_completed_treatment(), (failing > 0).then_some(failing));

    let (header, rows) = read_log(&only_file(dir.path()));
    assert_eq!(header.len(), DEFAULT_COLUMNS.len());
    assert_eq!(rows.len(), rows_before);
    assert!(rows.iter().all(|r| &r[1] == "REST"));
}

#[tokio::test]
async fn test_warmup_crash_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let (clients, _, _) = mock_clients(
        MockClient::new(ApiKind::Rest, Behavior::Succeed),
        MockClient::new(ApiKind::GraphQl, Behavior::Panic),
    );

    let config = small_config().with_factors(vec![QueryShape::Simple], vec![1], vec![CacheState::Warm]);
    let experiment = ExperimentBuilder::new()
        .config(config)
        .output(OutputConfig::new(dir.path()))
        .clients(clients)
        .seed(3)
        .build()
        .unwrap();

    let plan = experiment.plan();
    let failing = plan
        .iter()
        .position(|t| t.api_kind == ApiKind::GraphQl)
        .unwrap();

    let err = experiment.run().await.unwrap_err();

    assert!(matches!(
        err.kind,
        BenchErrorKind::Aborted { failed, total: 2, .. } if failed == failing + 1
    ));
    assert_eq!(err.last_completed_treatment(), (failing > 0).then_some(failing));
    assert!(err.message.contains("warmup"));

    let (_, rows) = read_log(&only_file(dir.path()));
    assert_eq!(rows.len(), if failing == 0 { 0 } else { 2 });
}

#[tokio::test]
async fn test_unwritable_results_dir_fails_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();
    let (clients, rest, graphql) = succeeding_clients();

    let experiment = ExperimentBuilder::new()
        .config(small_config())
        .output(OutputConfig::new(&blocker))
        .clients(clients)
        .build()
        .unwrap();

    let err = experiment.run().await.unwrap_err();
    assert_eq!(err.kind, BenchErrorKind::Io);
    assert_eq!(rest.calls() + graphql.calls(), 0);
}
