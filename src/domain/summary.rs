//! Run summary aggregating item outcomes

use super::{ItemOutcome, Update};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregated result of one orchestrated batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Outcome of every item that reached a terminal state, in execution order
    pub outcomes: Vec<ItemOutcome>,
    /// Items never started because the batch was aborted
    pub not_attempted: Vec<Update>,
    /// When the batch started
    pub started_at: DateTime<Utc>,
    /// When the batch finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    /// Creates an empty summary starting now
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            not_attempted: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Records a terminal outcome
    pub fn record(&mut self, outcome: ItemOutcome) {
        self.outcomes.push(outcome);
    }

    /// Marks the batch as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Returns all committed outcomes
    pub fn committed(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_committed())
    }

    /// Returns all rolled back outcomes
    pub fn rolled_back(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_rolled_back())
    }

    /// Returns the number of committed updates
    pub fn committed_count(&self) -> usize {
        self.committed().count()
    }

    /// Returns the number of rolled back updates
    pub fn rolled_back_count(&self) -> usize {
        self.rolled_back().count()
    }

    /// Returns true when every item reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.not_attempted.is_empty()
    }

    /// Elapsed wall time, if finished
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
