//! Reconciliation of one batch against the source response

use crate::app::models::{Airport, AirportDataResponse, SyncStatus};

/// Reconciled records of one batch, ready to persist
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciledBatch {
    pub airports: Vec<Airport>,
    pub success: usize,
    pub failed: usize,
}

/// Reconcile every queried record against the source response
///
/// The first candidate for a key replaces the local attributes and the record
/// becomes `DONE`. A key with no candidates, or missing from the response,
/// keeps its local attributes and becomes `FAILED`. Identity (id and ICAO)
/// always comes from the local record.
pub fn reconcile_batch(batch: &[Airport], mut response: AirportDataResponse) -> ReconciledBatch {
    let mut reconciled = ReconciledBatch {
        airports: Vec::with_capacity(batch.len()),
        ..Default::default()
    };

    for local in batch {
        let candidate = response
            .remove(&local.icao)
            .and_then(|candidates| candidates.into_iter().next());

        let mut record = local.clone();
        match candidate {
            Some(authoritative) => {
                record.replace_attributes(authoritative);
                record.status = SyncStatus::Done;
                reconciled.success += 1;
            }
            None => {
                record.status = SyncStatus::Failed;
                reconciled.failed += 1;
            }
        }
        reconciled.airports.push(record);
    }

    reconciled
}
