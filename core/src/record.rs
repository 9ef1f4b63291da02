//! Measurement records and the results-log column set

use crate::outcome::Outcome;
use crate::treatment::{ApiKind, CacheState, QueryShape, Treatment};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of the results log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Measurement completion time (UTC)
    pub timestamp: DateTime<Utc>,
    /// API style of the owning treatment
    pub api_kind: ApiKind,
    /// Query shape of the owning treatment
    pub query_shape: QueryShape,
    /// Worker count of the owning treatment
    pub concurrency_level: usize,
    /// Cache state of the owning treatment
    pub cache_state: CacheState,
    /// Latency in milliseconds, rounded to microseconds
    pub response_time_ms: f64,
    /// Serialized payload size (0 on failure)
    pub payload_size_bytes: u64,
    /// HTTP status, or 0 when no response was received
    pub status_code: u16,
    /// Whether the request succeeded
    pub success: bool,
    /// Failure description
    pub error: Option<String>,
}

impl MeasurementRecord {
    /// Build the record for an outcome produced under `treatment`
    pub fn new(treatment: &Treatment, outcome: &Outcome) -> Self {
        Self {
            timestamp: outcome.completed_at,
            api_kind: treatment.api_kind,
            query_shape: treatment.query_shape,
            concurrency_level: treatment.concurrency_level,
            cache_state: treatment.cache_state,
            response_time_ms: round_millis(outcome.response_time_ms),
            payload_size_bytes: if outcome.success {
                outcome.payload_size_bytes
            } else {
                0
            },
            status_code: outcome.status_code.min(599),
            success: outcome.success,
            error: outcome.error.clone(),
        }
    }

    /// Render one column of this record as CSV text
    pub fn field(&self, column: Column) -> String {
        match column {
            Column::Timestamp => self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            Column::ApiType => self.api_kind.to_string(),
            Column::QueryType => self.query_shape.to_string(),
            Column::ConcurrentClients => self.concurrency_level.to_string(),
            Column::CacheState => self.cache_state.to_string(),
            Column::ResponseTimeMs => self.response_time_ms.to_string(),
            Column::PayloadSizeBytes => self.payload_size_bytes.to_string(),
            Column::StatusCode => self.status_code.to_string(),
            Column::Success => self.success.to_string(),
            Column::Error => self.error.clone().unwrap_or_default(),
        }
    }

    /// Render the record in the given column order
    pub fn fields(&self, columns: &[Column]) -> Vec<String> {
        columns.iter().map(|&c| self.field(c)).collect()
    }
}

fn round_millis(ms: f64) -> f64 {
    ((ms.max(0.0)) * 1000.0).round() / 1000.0
}

/// A column of the results log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Completion timestamp
    Timestamp,
    /// REST or GraphQL
    ApiType,
    /// Query shape
    QueryType,
    /// Concurrency level
    ConcurrentClients,
    /// Cache state
    CacheState,
    /// Latency in milliseconds
    ResponseTimeMs,
    /// Payload size in bytes
    PayloadSizeBytes,
    /// HTTP status code
    StatusCode,
    /// Success flag
    Success,
    /// Failure description
    Error,
}

/// Header of the results log consumed by the analysis tooling
pub const DEFAULT_COLUMNS: [Column; 8] = [
    Column::Timestamp,
    Column::ApiType,
    Column::QueryType,
    Column::ConcurrentClients,
    Column::CacheState,
    Column::ResponseTimeMs,
    Column::PayloadSizeBytes,
    Column::StatusCode,
];

impl Column {
    const ALL: [Column; 10] = [
        Column::Timestamp,
        Column::ApiType,
        Column::QueryType,
        Column::ConcurrentClients,
        Column::CacheState,
        Column::ResponseTimeMs,
        Column::PayloadSizeBytes,
        Column::StatusCode,
        Column::Success,
        Column::Error,
    ];

    /// Header label
    pub fn name(&self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::ApiType => "api_type",
            Column::QueryType => "query_type",
            Column::ConcurrentClients => "concurrent_clients",
            Column::CacheState => "cache_state",
            Column::ResponseTimeMs => "response_time_ms",
            Column::PayloadSizeBytes => "payload_size_bytes",
            Column::StatusCode => "status_code",
            Column::Success => "success",
            Column::Error => "error",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s.trim())
            .ok_or_else(|| format!("unknown column: {s:?}"))
    }
}
