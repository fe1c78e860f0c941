//! Per-endpoint record of every probe outcome collected during a run

use crate::models::{Endpoint, ProbeOutcome};
use std::collections::HashMap;

/// Accumulated outcomes keyed by endpoint identity
///
/// Endpoints are kept in registration order so that aggregation and ranking
/// see them in the same order as the input file. Only the scheduler's
/// coordinator writes to the history, one outcome at a time.
#[derive(Debug, Clone, Default)]
pub struct MeasurementHistory {
    endpoints: Vec<Endpoint>,
    outcomes: HashMap<String, Vec<ProbeOutcome>>,
}

impl MeasurementHistory {
    /// Create a history with an empty outcome list for every endpoint
    pub fn new(endpoints: &[Endpoint]) -> Self {
        let mut history = Self::default();
        for endpoint in endpoints {
            history.register(endpoint.clone());
        }
        history
    }

    /// Add an endpoint; returns `false` if its identity is already known
    pub fn register(&mut self, endpoint: Endpoint) -> bool {
        if self.outcomes.contains_key(endpoint.id()) {
            return false;
        }
        self.outcomes.insert(endpoint.id().to_string(), Vec::new());
        self.endpoints.push(endpoint);
        true
    }

    /// Append one outcome; returns `false` for an unknown endpoint
    pub fn record(&mut self, outcome: ProbeOutcome) -> bool {
        match self.outcomes.get_mut(&outcome.endpoint_id) {
            Some(list) => {
                list.push(outcome);
                true
            }
            None => false,
        }
    }

    /// Outcomes recorded for one endpoint, in completion order
    pub fn outcomes(&self, endpoint_id: &str) -> Option<&[ProbeOutcome]> {
        self.outcomes.get(endpoint_id).map(Vec::as_slice)
    }

    /// Iterate endpoints with their outcomes in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&Endpoint, &[ProbeOutcome])> {
        self.endpoints.iter().map(move |endpoint| {
            let outcomes = self
                .outcomes
                .get(endpoint.id())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            (endpoint, outcomes)
        })
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Total number of outcomes across all endpoints
    pub fn total_outcomes(&self) -> usize {
        self.outcomes.values().map(Vec::len).sum()
    }
}
