//! Console rendering of scheduler progress and the run summary

use crate::{
    executor::{ProgressEvent, ScheduleReport},
    models::AggregateRecord,
    stats::ExecutionSummary,
    validator::ValidationReport,
};
use colored::*;
use std::path::Path;
use tokio::sync::mpsc;

/// Latency band used to pick a display color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerformanceLevel {
    Excellent, // < 50ms
    Good,      // 50-150ms
    Fair,      // 150-300ms
    Poor,      // 300-1000ms
    VeryPoor,  // >= 1000ms
    Unreachable,
}

impl PerformanceLevel {
    pub fn from_latency(latency_ms: Option<f64>) -> Self {
        match latency_ms {
            None => Self::Unreachable,
            Some(ms) if ms < 50.0 => Self::Excellent,
            Some(ms) if ms < 150.0 => Self::Good,
            Some(ms) if ms < 300.0 => Self::Fair,
            Some(ms) if ms < 1000.0 => Self::Poor,
            Some(_) => Self::VeryPoor,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor | Self::Unreachable => Color::Red,
        }
    }
}

/// Prints progress lines and summaries to stdout
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    use_color: bool,
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.use_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.use_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Text for one progress event, `None` for events that print nothing
    pub fn render_event(&self, event: &ProgressEvent) -> Option<String> {
        match event {
            ProgressEvent::RoundStarted { round, rounds } => {
                Some(self.bold(&format!("--- Round {}/{} ---", round, rounds)).to_string())
            }
            ProgressEvent::ProbeCompleted { endpoint, outcome, .. } => {
                let percent = event.overall_percent().unwrap_or(0.0);
                let status = outcome.format_latency();
                let level = PerformanceLevel::from_latency(outcome.successful_latency());
                Some(format!(
                    "[{:6.2}%] Tested {}: {}",
                    percent,
                    endpoint.raw_line,
                    self.colorize(&status, level.color())
                ))
            }
            ProgressEvent::RoundFinished { round, completed, elapsed } => {
                if self.verbose {
                    Some(
                        self.colorize(
                            &format!(
                                "Round {} finished: {} probes in {:.2}s",
                                round,
                                completed,
                                elapsed.as_secs_f64()
                            ),
                            Color::BrightBlack,
                        )
                        .to_string(),
                    )
                } else {
                    None
                }
            }
            ProgressEvent::Interrupted { round } => Some(
                self.colorize(
                    &format!("Interrupted during round {}; saving results collected so far", round),
                    Color::Yellow,
                )
                .to_string(),
            ),
        }
    }

    /// Print events until the scheduler drops its sender
    pub async fn consume(self, mut events: mpsc::UnboundedReceiver<ProgressEvent>) -> usize {
        let mut printed = 0;
        while let Some(event) = events.recv().await {
            if let Some(line) = self.render_event(&event) {
                println!("{}", line);
                printed += 1;
            }
        }
        printed
    }

    /// Describe the input after validation
    pub fn render_input(&self, report: &ValidationReport, path: &Path) -> String {
        let mut text = format!(
            "Loaded {} endpoint(s) from '{}'",
            report.endpoints.len(),
            path.display()
        );
        if report.skipped() > 0 {
            text.push_str(&format!(
                " ({} skipped: {} invalid, {} duplicate)",
                report.skipped(),
                report.rejected.len(),
                report.duplicates.len()
            ));
        }
        text
    }

    /// Final summary printed after the result file is written
    pub fn render_summary(
        &self,
        schedule: &ScheduleReport,
        summary: &ExecutionSummary,
        ranked: &[&AggregateRecord],
        output_path: &Path,
    ) -> String {
        let mut out = String::new();

        if schedule.interrupted {
            out.push_str(&format!(
                "\n{}\n",
                self.colorize(
                    &format!("Run interrupted after {} completed round(s).", schedule.rounds_completed),
                    Color::Yellow
                )
            ));
        }

        out.push_str(&format!(
            "\nResults ranked by worst-case latency and saved to '{}'.\n",
            output_path.display()
        ));

        let reachable = format!("{}/{}", summary.ok_endpoints, summary.total_endpoints);
        let reachable_color = if summary.ok_endpoints == 0 { Color::Red } else { Color::Green };
        out.push_str(&format!(
            "Reachable endpoints: {}, success rate {:.1}% ({} of {} probes)\n",
            self.colorize(&reachable, reachable_color),
            summary.success_rate,
            summary.successful_attempts,
            summary.total_attempts
        ));

        if let (Some(best), Some(latency)) = (&summary.best_endpoint, summary.best_latency_ms) {
            let level = PerformanceLevel::from_latency(Some(latency));
            out.push_str(&format!(
                "Best endpoint: {} ({})\n",
                self.bold(best),
                self.colorize(&format!("{:.2} ms", latency), level.color())
            ));
        }

        if self.verbose {
            out.push_str(&format!(
                "Failures: {} timeout, {} refused, {} other\n",
                summary.timeouts, summary.refused, summary.other_errors
            ));
            out.push_str(&format!("Elapsed: {:.2}s\n", schedule.elapsed.as_secs_f64()));

            for (rank, record) in ranked.iter().take(10).enumerate() {
                let level = PerformanceLevel::from_latency(record.latency());
                let latency = match record.latency() {
                    Some(ms) => format!("{:.2} ms", ms),
                    None => "Failed".to_string(),
                };
                out.push_str(&format!(
                    "  {:>2}. {:<40} {} ({}/{} ok)\n",
                    rank + 1,
                    record.endpoint.display_prefix(),
                    self.colorize(&latency, level.color()),
                    record.successes,
                    record.attempts
                ));
            }
        }

        out
    }
}
