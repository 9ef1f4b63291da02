//! Core traits for API clients and progress observers
//!
//! These traits are defined in core so the engine stays independent of the
//! HTTP stack. Implementations live in `api-bench-vendors` (clients) and the
//! CLI (progress bars).

use crate::outcome::Outcome;
use crate::record::MeasurementRecord;
use crate::runner::TreatmentStats;
use crate::treatment::{ApiKind, QueryShape, Treatment};
use async_trait::async_trait;
use std::sync::Arc;

// ============================================================================
// API Client Trait
// ============================================================================

/// Executes one logical request against the API under test
///
/// Implementations must never return an error: transport and application
/// failures are reported as a failed [`Outcome`]. They must not retry and
/// must not mutate state shared with other workers.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// API style this client speaks
    fn api_kind(&self) -> ApiKind;

    /// Issue the request for `shape` and measure it
    async fn execute(&self, shape: QueryShape) -> Outcome;
}

/// The pair of clients an experiment compares
///
/// Dispatch on API kind happens once per treatment through [`ApiClients::for_kind`].
#[derive(Clone)]
pub struct ApiClients {
    rest: Arc<dyn ApiClient>,
    graphql: Arc<dyn ApiClient>,
}

impl ApiClients {
    /// Pair a REST client with a GraphQL client
    pub fn new(rest: Arc<dyn ApiClient>, graphql: Arc<dyn ApiClient>) -> Self {
        Self { rest, graphql }
    }

    /// Client for the given API kind
    pub fn for_kind(&self, kind: ApiKind) -> Arc<dyn ApiClient> {
        match kind {
            ApiKind::Rest => Arc::clone(&self.rest),
            ApiKind::GraphQl => Arc::clone(&self.graphql),
        }
    }
}

impl std::fmt::Debug for ApiClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClients")
            .field("rest", &self.rest.api_kind())
            .field("graphql", &self.graphql.api_kind())
            .finish()
    }
}

// ============================================================================
// Progress Observer Trait
// ============================================================================

/// Optional observer of experiment progress
///
/// All methods default to no-ops. Called from worker tasks, so implementations
/// must be cheap and thread-safe.
pub trait ProgressObserver: Send + Sync {
    /// A treatment is about to start (`index` is 1-based)
    fn treatment_started(&self, _index: usize, _total: usize, _treatment: &Treatment, _expected: usize) {}

    /// A record was appended to the results log
    fn measurement_recorded(&self, _record: &MeasurementRecord) {}

    /// A treatment finished recording all its measurements
    fn treatment_finished(&self, _index: usize, _stats: &TreatmentStats) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}
