//! Relay Latency Prober
//!
//! A concurrent TCP latency prober that validates a list of candidate relay
//! endpoints, measures connection-establishment latency over several rounds
//! with a bounded worker pool, and writes a ranked summary.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod stats;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use app::{App, RunOutcome};
pub use config::ProxyEnvironment;
pub use error::{AppError, Result, ValidationError};
pub use executor::{
    cancellation_pair, CancellationHandle, CancellationSignal, MeasurementHistory, ProgressEvent,
    RoundScheduler, ScheduleReport, SchedulerConfig,
};
pub use models::{AggregateRecord, Config, Endpoint, ProbeOutcome};
pub use output::{ConsoleReporter, ResultSink};
pub use probe::{Prober, TcpProber};
pub use stats::{aggregate, ExecutionSummary};
pub use types::{FailureKind, RecordStatus};
pub use validator::{load_endpoints, parse_endpoints, require_endpoints, validate, ValidationReport};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata recorded by `build.rs`
pub fn build_info() -> String {
    format!(
        "{} v{} ({}, built {}, commit {})",
        PKG_NAME,
        VERSION,
        env!("TARGET_TRIPLE"),
        env!("BUILD_TIME"),
        option_env!("GIT_COMMIT").unwrap_or("unknown")
    )
}

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_INPUT_PATH: &str = "proxy.txt";
    pub const DEFAULT_OUTPUT_PATH: &str = "latencyresult.txt";
    pub const DEFAULT_CONCURRENCY: usize = 5;
    pub const DEFAULT_ROUNDS: u32 = 3;
    pub const DEFAULT_TIMEOUT_SECONDS: f64 = 5.0;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Upper bounds shared by CLI, environment and config validation
    pub const MAX_CONCURRENCY: usize = 1024;
    pub const MAX_ROUNDS: u32 = 100;
    pub const MAX_TIMEOUT_SECONDS: f64 = 300.0;

    /// Proxy variables stripped from the process environment before probing
    pub const PROXY_ENV_VARS: &[&str] = &[
        "http_proxy",
        "HTTP_PROXY",
        "https_proxy",
        "HTTPS_PROXY",
        "all_proxy",
        "ALL_PROXY",
    ];
}
