//! Data models and structures for the relay latency prober

pub mod config;
pub mod endpoint;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use endpoint::Endpoint;
pub use metrics::{AggregateRecord, ProbeOutcome};
