//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Classification of a single probe attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The connection was established
    None,
    /// The per-probe timer expired before the connection was established
    Timeout,
    /// The remote host actively refused the connection
    Refused,
    /// Any other I/O-level failure (unreachable host, network down, ...)
    OtherNetworkError,
}

impl FailureKind {
    /// Check if this classification represents a successful probe
    pub fn is_success(&self) -> bool {
        matches!(self, FailureKind::None)
    }

    /// Short label used in logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::None => "ok",
            FailureKind::Timeout => "timeout",
            FailureKind::Refused => "refused",
            FailureKind::OtherNetworkError => "network-error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final status of an endpoint after aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    /// At least one probe succeeded
    Ok,
    /// No probe succeeded in any completed round
    Failed,
}

impl RecordStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, RecordStatus::Ok)
    }
}
