//! Round-based probe execution engine
//!
//! This module contains:
//! - The round scheduler driving a semaphore-bounded pool of probe tasks
//! - The measurement history collected by the scheduler's coordinator
//! - Cooperative cancellation used by the Ctrl-C handler

pub mod cancel;
pub mod history;

pub use cancel::{cancellation_pair, CancellationHandle, CancellationSignal};
pub use history::MeasurementHistory;

use crate::{
    logging::ProbeLogger,
    models::{Config, Endpoint, ProbeOutcome},
    probe::Prober,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Execution parameters for the round scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum number of probes in flight
    pub concurrency: usize,
    /// Number of sequential rounds
    pub rounds: u32,
    /// Per-probe timeout
    pub timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SchedulerConfig {
    fn from(config: &Config) -> Self {
        Self {
            concurrency: config.concurrency,
            rounds: config.rounds,
            timeout: config.timeout(),
        }
    }
}

/// Progress notifications emitted while a run is in progress
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    RoundStarted {
        round: u32,
        rounds: u32,
    },
    ProbeCompleted {
        round: u32,
        rounds: u32,
        /// Probes finished so far in this round
        completed: usize,
        /// Probes submitted in this round
        total: usize,
        endpoint: Endpoint,
        outcome: ProbeOutcome,
    },
    RoundFinished {
        round: u32,
        completed: usize,
        elapsed: Duration,
    },
    Interrupted {
        round: u32,
    },
}

impl ProgressEvent {
    /// Share of the current round completed, for `ProbeCompleted` events
    pub fn round_percent(&self) -> Option<f64> {
        match self {
            Self::ProbeCompleted { completed, total, .. } if *total > 0 => {
                Some(*completed as f64 / *total as f64 * 100.0)
            }
            _ => None,
        }
    }

    /// Share of all probes of the run completed, for `ProbeCompleted` events
    pub fn overall_percent(&self) -> Option<f64> {
        match self {
            Self::ProbeCompleted { round, rounds, completed, total, .. } if *total > 0 && *rounds > 0 => {
                let done = (*round as usize - 1) * total + completed;
                Some(done as f64 / (*rounds as usize * total) as f64 * 100.0)
            }
            _ => None,
        }
    }
}

/// Result of a scheduler run
#[derive(Debug, Clone)]
pub struct ScheduleReport {
    pub history: MeasurementHistory,
    /// Rounds that ran to completion
    pub rounds_completed: u32,
    /// Set when the run stopped early on cancellation
    pub interrupted: bool,
    pub elapsed: Duration,
}

/// Runs every endpoint through `rounds` sequential probe rounds
pub struct RoundScheduler {
    prober: Arc<dyn Prober>,
    config: SchedulerConfig,
    limiter: Arc<Semaphore>,
    progress: Option<mpsc::UnboundedSender<ProgressEvent>>,
    logger: Option<ProbeLogger>,
}

impl RoundScheduler {
    pub fn new(prober: Arc<dyn Prober>, config: SchedulerConfig) -> Self {
        // One pool shared by every round.
        let limiter = Arc::new(Semaphore::new(config.concurrency.max(1)));
        Self {
            prober,
            config,
            limiter,
            progress: None,
            logger: None,
        }
    }

    /// Stream progress events to `sender`
    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn with_logger(mut self, logger: ProbeLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Probe all endpoints round by round until done or cancelled
    pub async fn run(&self, endpoints: &[Endpoint], cancel: &CancellationSignal) -> ScheduleReport {
        let started = Instant::now();
        let mut history = MeasurementHistory::new(endpoints);
        let targets: Vec<Endpoint> = history.endpoints().to_vec();
        let rounds = self.config.rounds;
        let mut rounds_completed = 0;
        let mut interrupted = false;

        for round in 1..=rounds {
            if cancel.is_cancelled() {
                interrupted = true;
                self.emit(ProgressEvent::Interrupted { round });
                break;
            }

            self.emit(ProgressEvent::RoundStarted { round, rounds });
            let round_started = Instant::now();

            match self.run_round(round, &targets, &mut history, cancel).await {
                Some(completed) => {
                    let elapsed = round_started.elapsed();
                    if let Some(logger) = &self.logger {
                        logger.log_round(round, rounds, completed, elapsed).await;
                    }
                    self.emit(ProgressEvent::RoundFinished { round, completed, elapsed });
                    rounds_completed += 1;
                }
                None => {
                    interrupted = true;
                    self.emit(ProgressEvent::Interrupted { round });
                    break;
                }
            }
        }

        ScheduleReport {
            history,
            rounds_completed,
            interrupted,
            elapsed: started.elapsed(),
        }
    }

    /// Run one round; `None` if it was cut short by cancellation
    async fn run_round(
        &self,
        round: u32,
        targets: &[Endpoint],
        history: &mut MeasurementHistory,
        cancel: &CancellationSignal,
    ) -> Option<usize> {
        let total = targets.len();
        let mut set = JoinSet::new();

        for endpoint in targets {
            if cancel.is_cancelled() {
                set.abort_all();
                return None;
            }

            let endpoint = endpoint.clone();
            let prober = Arc::clone(&self.prober);
            let limiter = Arc::clone(&self.limiter);
            let signal = cancel.clone();
            let timeout = self.config.timeout;

            set.spawn(async move {
                let _permit = limiter.acquire_owned().await.ok()?;
                if signal.is_cancelled() {
                    return None;
                }
                let outcome = prober.probe(&endpoint, round, timeout).await;
                Some((endpoint, outcome))
            });
        }

        let mut completed = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    set.abort_all();
                    return None;
                }
                joined = set.join_next() => match joined {
                    None => break,
                    Some(Ok(Some((endpoint, outcome)))) => {
                        completed += 1;
                        if let Some(logger) = &self.logger {
                            logger.log_probe_outcome(&outcome).await;
                        }
                        if self.progress.is_some() {
                            self.emit(ProgressEvent::ProbeCompleted {
                                round,
                                rounds: self.config.rounds,
                                completed,
                                total,
                                endpoint,
                                outcome: outcome.clone(),
                            });
                        }
                        history.record(outcome);
                    }
                    // Skipped after cancellation
                    Some(Ok(None)) => {}
                    Some(Err(e)) => {
                        if let Some(logger) = &self.logger {
                            logger.log_task_failure(round, &e.to_string()).await;
                        }
                    }
                },
            }
        }

        Some(completed)
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = &self.progress {
            // A dropped receiver just means nobody is watching.
            let _ = sender.send(event);
        }
    }
}
