//! Main application orchestration and execution
//!
//! One run reads and validates the input file, probes every endpoint for
//! the configured number of rounds, aggregates the measurements and writes
//! the ranked result file.

use crate::{
    config::{display_config_summary, validate_config},
    error::{ErrorContext, ErrorReporter, Result},
    executor::{CancellationSignal, RoundScheduler, SchedulerConfig},
    logging::LoggerFactory,
    models::Config,
    output::{ConsoleReporter, ResultSink},
    probe::{Prober, TcpProber},
    stats::{aggregate, ExecutionSummary},
    validator::{load_endpoints, require_endpoints},
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Endpoints that passed validation
    pub endpoints: usize,
    pub rounds_completed: u32,
    pub interrupted: bool,
    /// Lines written to the result file
    pub written: usize,
    pub summary: ExecutionSummary,
}

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    prober: Arc<dyn Prober>,
    removed_proxies: Vec<&'static str>,
}

impl App {
    /// Create an application probing over plain TCP
    pub fn new(config: Config) -> Self {
        Self {
            config,
            prober: Arc::new(TcpProber::new()),
            removed_proxies: Vec::new(),
        }
    }

    /// Replace the probe implementation
    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = prober;
        self
    }

    /// Proxy variables stripped at startup, reported in the log
    pub fn with_removed_proxies(mut self, removed: Vec<&'static str>) -> Self {
        self.removed_proxies = removed;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the application until every round finishes or `cancel` fires
    pub async fn run(&self, cancel: CancellationSignal) -> Result<RunOutcome> {
        let config = &self.config;
        let factory = LoggerFactory::new(config.clone());
        let logger = factory.create_logger("APP").await;
        let probe_logger = factory.create_probe_logger().await;
        let error_logger = factory.create_error_logger().await;
        let console = ConsoleReporter::new(config.enable_color, config.verbose);
        let reporter = ErrorReporter::new(config.enable_color, config.verbose);

        if config.debug {
            println!("{}", crate::build_info());
            println!("Session: {}", factory.session_id());
            println!("{}\n", display_config_summary(config));
        }

        for warning in validate_config(config)? {
            eprintln!("{}", warning.format(config.enable_color));
        }

        if !self.removed_proxies.is_empty() {
            logger
                .info(&format!("Removed proxy variables: {}", self.removed_proxies.join(", ")))
                .field("removed", &self.removed_proxies)
                .log()
                .await;
        }

        let operation = logger.start_operation("probe_run").await;

        let report = match load_endpoints(&config.input_path).await {
            Ok(report) => report,
            Err(e) => {
                error_logger.log_error(&e, Some("loading input"), Some(&operation)).await;
                logger.end_operation(&operation, "probe_run", false).await;
                return Err(e);
            }
        };

        for (line_no, error) in &report.rejected {
            probe_logger.log_rejected_line(*line_no, error).await;
        }
        if !report.rejected.is_empty() {
            eprintln!("{}", reporter.format_rejections(&report.rejected));
        }
        println!("{}", console.render_input(&report, &config.input_path));

        if let Err(e) = require_endpoints(&report, &config.input_path) {
            logger.end_operation(&operation, "probe_run", false).await;
            return Err(e);
        }

        crate::log_info!(
            logger,
            "Probing {} endpoint(s) over {} round(s)",
            report.endpoints.len(),
            config.rounds
        );
        crate::log_debug!(
            logger,
            "Pool of {} worker(s), {:.3}s connect timeout",
            config.concurrency,
            config.timeout_seconds
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(console.consume(rx));

        let scheduler = RoundScheduler::new(self.prober.clone(), SchedulerConfig::from(config))
            .with_progress(tx)
            .with_logger(probe_logger);
        let schedule = scheduler.run(&report.endpoints, &cancel).await;
        // Closes the progress channel so the printer drains and exits
        drop(scheduler);
        printer.await.context("Progress printer failed")?;

        let records = aggregate(&schedule.history);
        let written = match ResultSink::write_to_path(&records, &config.output_path) {
            Ok(written) => written,
            Err(e) => {
                error_logger.log_error(&e, Some("writing results"), Some(&operation)).await;
                logger.end_operation(&operation, "probe_run", false).await;
                return Err(e);
            }
        };

        let summary = ExecutionSummary::from_history(&schedule.history, &records);
        let ranked = ResultSink::rank(&records);
        print!("{}", console.render_summary(&schedule, &summary, &ranked, &config.output_path));

        logger
            .info("Run finished")
            .correlation_id(&operation)
            .field("rounds_completed", schedule.rounds_completed)
            .field("interrupted", schedule.interrupted)
            .field("written", written)
            .log()
            .await;
        logger.end_operation(&operation, "probe_run", true).await;

        Ok(RunOutcome {
            endpoints: report.endpoints.len(),
            rounds_completed: schedule.rounds_completed,
            interrupted: schedule.interrupted,
            written,
            summary,
        })
    }
}
