//! Probe outcome and aggregate record data models

use crate::models::Endpoint;
use crate::types::{FailureKind, RecordStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of a single TCP connection attempt against one endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Identity (raw line) of the probed endpoint
    pub endpoint_id: String,

    /// Round this attempt belongs to (1-based)
    pub round: u32,

    /// Connection-establishment time, present only on success
    pub latency_ms: Option<f64>,

    /// Failure classification, `None` on success
    pub failure_kind: FailureKind,

    /// Human-readable failure description
    pub detail: Option<String>,

    /// When the attempt finished
    pub timestamp: DateTime<Utc>,
}

impl ProbeOutcome {
    /// Create a successful outcome from a measured elapsed time
    pub fn success(endpoint_id: impl Into<String>, round: u32, elapsed: Duration) -> Self {
        Self::success_ms(endpoint_id, round, elapsed.as_secs_f64() * 1000.0)
    }

    /// Create a successful outcome from a latency in milliseconds
    pub fn success_ms(endpoint_id: impl Into<String>, round: u32, latency_ms: f64) -> Self {
        Self {
            endpoint_id: endpoint_id.into(),
            round,
            latency_ms: Some(latency_ms),
            failure_kind: FailureKind::None,
            detail: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a timed-out outcome
    pub fn timeout(endpoint_id: impl Into<String>, round: u32) -> Self {
        Self::failed(endpoint_id, round, FailureKind::Timeout, "Connection timeout".to_string())
    }

    /// Create a refused outcome
    pub fn refused(endpoint_id: impl Into<String>, round: u32) -> Self {
        Self::failed(endpoint_id, round, FailureKind::Refused, "Connection refused".to_string())
    }

    /// Create an outcome for any other network failure
    pub fn network_error(endpoint_id: impl Into<String>, round: u32, error: impl std::fmt::Display) -> Self {
        Self::failed(
            endpoint_id,
            round,
            FailureKind::OtherNetworkError,
            format!("Network error: {}", error),
        )
    }

    fn failed(endpoint_id: impl Into<String>, round: u32, failure_kind: FailureKind, detail: String) -> Self {
        Self {
            endpoint_id: endpoint_id.into(),
            round,
            latency_ms: None,
            failure_kind,
            detail: Some(detail),
            timestamp: Utc::now(),
        }
    }

    /// Check if this attempt established a connection
    pub fn is_successful(&self) -> bool {
        self.failure_kind.is_success()
    }

    /// Latency of a successful attempt, `None` otherwise
    pub fn successful_latency(&self) -> Option<f64> {
        if self.is_successful() {
            self.latency_ms
        } else {
            None
        }
    }

    /// Format as `12.34 ms` or `Failed`
    pub fn format_latency(&self) -> String {
        match self.successful_latency() {
            Some(ms) => format!("{:.2} ms", ms),
            None => "Failed".to_string(),
        }
    }
}

/// Aggregated view of one endpoint after all rounds finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// The endpoint this record summarises
    pub endpoint: Endpoint,

    /// Worst successful latency, `f64::INFINITY` when nothing succeeded
    pub representative_latency_ms: f64,

    /// `Ok` iff the representative latency is finite
    pub status: RecordStatus,

    /// Number of successful attempts
    pub successes: usize,

    /// Number of recorded attempts
    pub attempts: usize,
}

impl AggregateRecord {
    /// Check if the endpoint answered at least once
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Representative latency when finite
    pub fn latency(&self) -> Option<f64> {
        if self.is_ok() {
            Some(self.representative_latency_ms)
        } else {
            None
        }
    }

    /// Share of attempts that succeeded, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64 * 100.0
        }
    }
}
