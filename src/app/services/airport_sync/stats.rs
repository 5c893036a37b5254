//! Synchronization run statistics and outcomes

use serde::Serialize;

/// Counters for one synchronization run
///
/// `success` and `failed` count records; `error` counts batches that were
/// abandoned because fetching or persisting them failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatistics {
    /// Pending records found when the run started
    pub total: usize,
    /// Records replaced with authoritative data
    pub success: usize,
    /// Records the source had no data for
    pub failed: usize,
    /// Batches abandoned on a fetch or persist failure
    pub error: usize,
}

impl SyncStatistics {
    /// Create empty statistics for a run over `total` pending records
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Records that reached a terminal status this run
    pub fn reconciled(&self) -> usize {
        self.success + self.failed
    }

    /// Records left pending for a later run
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.reconciled())
    }

    /// Calculate success rate as a percentage of the pending total
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// Whether every batch was fetched and persisted
    pub fn is_clean(&self) -> bool {
        self.error == 0
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Synchronized {} pending airports: {} succeeded ({:.1}%), {} failed, {} batch errors, {} left pending",
            self.total,
            self.success,
            self.success_rate(),
            self.failed,
            self.error,
            self.remaining()
        )
    }
}

/// Result of a synchronization run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No record was pending when the run started
    NothingToDo,
    /// The run processed the pending records
    Completed(SyncStatistics),
}

impl SyncOutcome {
    pub fn statistics(&self) -> Option<&SyncStatistics> {
        match self {
            SyncOutcome::NothingToDo => None,
            SyncOutcome::Completed(stats) => Some(stats),
        }
    }
}
