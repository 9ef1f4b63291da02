//! Result of a single executor invocation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status code used when no HTTP response was received
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Timing, size and status of one request or aggregate request
///
/// Failures are values, not errors: a timed-out request still yields an
/// `Outcome` with `success == false` and status 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Wall-clock latency in milliseconds
    pub response_time_ms: f64,

    /// Length of the canonical serialized payload (0 on failure)
    pub payload_size_bytes: u64,

    /// HTTP status, or 0 for transport-level failures
    pub status_code: u16,

    /// Whether the request succeeded
    pub success: bool,

    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the request completed or failed
    pub completed_at: DateTime<Utc>,
}

impl Outcome {
    /// Successful request
    pub fn success(elapsed: Duration, payload_size_bytes: u64, status_code: u16) -> Self {
        Self {
            response_time_ms: duration_ms(elapsed),
            payload_size_bytes,
            status_code,
            success: true,
            error: None,
            completed_at: Utc::now(),
        }
    }

    /// Failed request; pass `None` when no HTTP status is known
    pub fn failure(elapsed: Duration, status_code: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            response_time_ms: duration_ms(elapsed),
            payload_size_bytes: 0,
            status_code: status_code.unwrap_or(TRANSPORT_FAILURE_STATUS),
            success: false,
            error: Some(error.into()),
            completed_at: Utc::now(),
        }
    }

    /// True when the failure happened below HTTP (no response received)
    pub fn is_transport_failure(&self) -> bool {
        !self.success && self.status_code == TRANSPORT_FAILURE_STATUS
    }
}

fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
