//! Aggregation of probe outcomes into per-endpoint records and run totals


use crate::{
    executor::MeasurementHistory,
    models::{AggregateRecord, Endpoint, ProbeOutcome},
    types::{FailureKind, RecordStatus},
};
use serde::{Deserialize, Serialize};

/// Worst successful latency, or `+∞` if nothing succeeded
pub fn representative_latency(outcomes: &[ProbeOutcome]) -> f64 {
    outcomes
        .iter()
        .filter_map(ProbeOutcome::successful_latency)
        .fold(None, |max: Option<f64>, latency| match max {
            Some(current) if current >= latency => Some(current),
            _ => Some(latency),
        })
        .unwrap_or(f64::INFINITY)
}

/// Build the aggregate record for one endpoint
pub fn aggregate_endpoint(endpoint: &Endpoint, outcomes: &[ProbeOutcome]) -> AggregateRecord {
    let representative_latency_ms = representative_latency(outcomes);
    let status = if representative_latency_ms.is_finite() {
        RecordStatus::Ok
    } else {
        RecordStatus::Failed
    };

    AggregateRecord {
        endpoint: endpoint.clone(),
        representative_latency_ms,
        status,
        successes: outcomes.iter().filter(|o| o.is_successful()).count(),
        attempts: outcomes.len(),
    }
}

/// One record per endpoint, in history order. Does not modify the history.
pub fn aggregate(history: &MeasurementHistory) -> Vec<AggregateRecord> {
    history
        .iter()
        .map(|(endpoint, outcomes)| aggregate_endpoint(endpoint, outcomes))
        .collect()
}

/// Run-wide totals shown after the results are saved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total_endpoints: usize,
    pub ok_endpoints: usize,
    pub failed_endpoints: usize,
    pub total_attempts: usize,
    pub successful_attempts: usize,
    pub timeouts: usize,
    pub refused: usize,
    pub other_errors: usize,
    /// Successful attempts over all attempts, in percent
    pub success_rate: f64,
    /// Raw line of the lowest-latency endpoint
    pub best_endpoint: Option<String>,
    pub best_latency_ms: Option<f64>,
    /// Mean representative latency over reachable endpoints
    pub mean_latency_ms: Option<f64>,
}

impl ExecutionSummary {
    /// Totals from the history and its aggregate records
    pub fn from_history(history: &MeasurementHistory, records: &[AggregateRecord]) -> Self {
        let mut summary = Self::from_records(records);

        for (_, outcomes) in history.iter() {
            for outcome in outcomes {
                match outcome.failure_kind {
                    FailureKind::None => {}
                    FailureKind::Timeout => summary.timeouts += 1,
                    FailureKind::Refused => summary.refused += 1,
                    FailureKind::OtherNetworkError => summary.other_errors += 1,
                }
            }
        }

        summary
    }

    /// Totals derivable from aggregate records alone
    pub fn from_records(records: &[AggregateRecord]) -> Self {
        let ok: Vec<&AggregateRecord> = records.iter().filter(|r| r.is_ok()).collect();
        let total_attempts: usize = records.iter().map(|r| r.attempts).sum();
        let successful_attempts: usize = records.iter().map(|r| r.successes).sum();

        let best = ok
            .iter()
            .min_by(|a, b| a.representative_latency_ms.total_cmp(&b.representative_latency_ms));

        let mean_latency_ms = if ok.is_empty() {
            None
        } else {
            Some(ok.iter().map(|r| r.representative_latency_ms).sum::<f64>() / ok.len() as f64)
        };

        Self {
            total_endpoints: records.len(),
            ok_endpoints: ok.len(),
            failed_endpoints: records.len() - ok.len(),
            total_attempts,
            successful_attempts,
            timeouts: 0,
            refused: 0,
            other_errors: 0,
            success_rate: if total_attempts == 0 {
                0.0
            } else {
                successful_attempts as f64 / total_attempts as f64 * 100.0
            },
            best_endpoint: best.map(|r| r.endpoint.raw_line.clone()),
            best_latency_ms: best.map(|r| r.representative_latency_ms),
            mean_latency_ms,
        }
    }

    pub fn failed_attempts(&self) -> usize {
        self.total_attempts - self.successful_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;

    fn history_with(lines: &[(&str, &[Option<f64>])]) -> MeasurementHistory {
        let endpoints: Vec<Endpoint> = lines.iter().map(|(line, _)| validate(line).unwrap()).collect();
        let mut history = MeasurementHistory::new(&endpoints);
        for (line, latencies) in lines {
            let id = validate(line).unwrap().raw_line;
            for (i, latency) in latencies.iter().enumerate() {
                let round = i as u32 + 1;
                let outcome = match latency {
                    Some(ms) => ProbeOutcome::success_ms(id.clone(), round, *ms),
                    None => ProbeOutcome::timeout(id.clone(), round),
                };
                history.record(outcome);
            }
        }
        history
    }

    #[test]
    fn test_representative_is_max_success() {
        let history = history_with(&[("1.1.1.1,443,US,CF", &[Some(10.0), Some(20.0), Some(15.0)])]);
        let records = aggregate(&history);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].representative_latency_ms, 20.0);
        assert_eq!(records[0].status, RecordStatus::Ok);
        assert_eq!(records[0].successes, 3);
    }

    #[test]
    fn test_failures_ignored_when_any_success() {
        let history = history_with(&[("1.1.1.1,443", &[None, Some(7.5), None])]);
        let records = aggregate(&history);
        assert_eq!(records[0].representative_latency_ms, 7.5);
        assert!(records[0].is_ok());
        assert_eq!(records[0].attempts, 3);
        assert_eq!(records[0].successes, 1);
    }

    #[test]
    fn test_all_failed_is_infinite() {
        let history = history_with(&[("8.8.8.8,53,US,Google", &[None, None, None])]);
        let records = aggregate(&history);
        assert!(records[0].representative_latency_ms.is_infinite());
        assert_eq!(records[0].status, RecordStatus::Failed);
        assert_eq!(records[0].latency(), None);
    }

    #[test]
    fn test_no_outcomes_is_failed() {
        let history = history_with(&[("8.8.8.8,53", &[])]);
        let records = aggregate(&history);
        assert_eq!(records[0].status, RecordStatus::Failed);
        assert_eq!(records[0].attempts, 0);
    }

    #[test]
    fn test_records_follow_history_order() {
        let history = history_with(&[
            ("3.3.3.3,80", &[Some(1.0)]),
            ("1.1.1.1,80", &[Some(3.0)]),
            ("2.2.2.2,80", &[None]),
        ]);
        let ids: Vec<String> = aggregate(&history).into_iter().map(|r| r.endpoint.raw_line).collect();
        assert_eq!(ids, vec!["3.3.3.3,80", "1.1.1.1,80", "2.2.2.2,80"]);
    }

    #[test]
    fn test_execution_summary() {
        let mut history = history_with(&[
            ("1.1.1.1,443,US,CF", &[Some(10.0), Some(20.0), Some(15.0)]),
            ("9.9.9.9,999,Quad9", &[Some(6.0), None, Some(5.0)]),
            ("8.8.8.8,53,US,Google", &[None, None]),
        ]);
        history.record(ProbeOutcome::refused("8.8.8.8,53,US,Google", 3));

        let records = aggregate(&history);
        let summary = ExecutionSummary::from_history(&history, &records);

        assert_eq!(summary.total_endpoints, 3);
        assert_eq!(summary.ok_endpoints, 2);
        assert_eq!(summary.failed_endpoints, 1);
        assert_eq!(summary.total_attempts, 9);
        assert_eq!(summary.successful_attempts, 5);
        assert_eq!(summary.failed_attempts(), 4);
        assert_eq!(summary.timeouts, 3);
        assert_eq!(summary.refused, 1);
        assert_eq!(summary.other_errors, 0);
        assert_eq!(summary.best_endpoint.as_deref(), Some("9.9.9.9,999,Quad9"));
        assert_eq!(summary.best_latency_ms, Some(6.0));
        assert_eq!(summary.mean_latency_ms, Some(13.0));
        assert!((summary.success_rate - 55.555).abs() < 0.01);
    }

    #[test]
    fn test_empty_summary() {
        let summary = ExecutionSummary::from_records(&[]);
        assert_eq!(summary.total_endpoints, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert!(summary.best_endpoint.is_none());
        assert!(summary.mean_latency_ms.is_none());
    }
}
