//! TCP connection latency probe

use crate::{
    models::{Endpoint, ProbeOutcome},
    types::FailureKind,
};
use async_trait::async_trait;
use std::future::Future;
use std::io::{self, ErrorKind};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Connection probe abstraction, swapped out by the scheduler tests
#[async_trait]
pub trait Prober: Send + Sync {
    /// Attempt one connection to `endpoint` and report how it went
    ///
    /// Never fails: every network problem is folded into the outcome.
    async fn probe(&self, endpoint: &Endpoint, round: u32, timeout: Duration) -> ProbeOutcome;
}

/// Measures plain TCP connection establishment time
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, endpoint: &Endpoint, round: u32, limit: Duration) -> ProbeOutcome {
        connect_within(endpoint, round, limit, TcpStream::connect(endpoint.socket_addr())).await
    }
}

/// Drive one connect attempt under `limit` and fold the result into an outcome
///
/// Only the handshake is measured; an established connection is closed
/// before returning.
async fn connect_within<F, S>(endpoint: &Endpoint, round: u32, limit: Duration, connect: F) -> ProbeOutcome
where
    F: Future<Output = io::Result<S>>,
{
    let start = Instant::now();

    match timeout(limit, connect).await {
        Ok(Ok(stream)) => {
            let elapsed = start.elapsed();
            drop(stream);
            ProbeOutcome::success(endpoint.id(), round, elapsed)
        }
        Ok(Err(e)) => match classify_connect_error(&e) {
            FailureKind::Refused => ProbeOutcome::refused(endpoint.id(), round),
            FailureKind::Timeout => ProbeOutcome::timeout(endpoint.id(), round),
            _ => ProbeOutcome::network_error(endpoint.id(), round, e),
        },
        Err(_) => ProbeOutcome::timeout(endpoint.id(), round),
    }
}

/// Map an OS-level connect error onto a failure kind
pub fn classify_connect_error(error: &io::Error) -> FailureKind {
    match error.kind() {
        ErrorKind::ConnectionRefused => FailureKind::Refused,
        ErrorKind::TimedOut => FailureKind::Timeout,
        _ => FailureKind::OtherNetworkError,
    }
}
