//! Batch synchronization of pending airports
//!
//! A run scans the record store for `PENDING` airports and reconciles them
//! against the external source in bounded concurrent batches:
//!
//! 1. **Partition**: pending records are split into FIFO batches
//! 2. **Distribute**: a producer task feeds batches into one bounded channel
//!    whose receiver is shared by a fixed pool of workers
//! 3. **Reconcile**: each worker fetches its batch with one source call and
//!    resolves every queried key to `DONE` or `FAILED`
//! 4. **Persist**: the reconciled batch is written with one batch upsert
//!
//! Failures are contained per batch. A failed fetch or upsert is counted as
//! one batch error and abandoned without retry; its records stay `PENDING`
//! for the next run and no other batch is affected.
//!
//! The cancellation token acts as the run deadline. Workers stop pulling
//! batches once it fires but never abort a fetch already in flight.

use crate::app::models::{Airport, SyncStatus};
use crate::app::services::airport_repository::AirportRepository;
use crate::app::services::source_client::AviationSource;
use crate::constants::{DEFAULT_SYNC_BATCH_SIZE, DEFAULT_SYNC_WORKERS};
use crate::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub mod reconcile;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use reconcile::{ReconciledBatch, reconcile_batch};
pub use stats::{SyncOutcome, SyncStatistics};

type SharedReceiver = Arc<Mutex<mpsc::Receiver<Vec<Airport>>>>;
type SharedStats = Arc<Mutex<SyncStatistics>>;

/// Reconciles pending airports against the authoritative source
pub struct AirportSyncService {
    repository: Arc<dyn AirportRepository>,
    source: Arc<dyn AviationSource>,
    batch_size: usize,
    workers: usize,
}

impl AirportSyncService {
    pub fn new(repository: Arc<dyn AirportRepository>, source: Arc<dyn AviationSource>) -> Self {
        Self {
            repository,
            source,
            batch_size: DEFAULT_SYNC_BATCH_SIZE,
            workers: DEFAULT_SYNC_WORKERS,
        }
    }

    /// Set the number of ICAO codes per source request (at least one)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the number of concurrent workers (at least one)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Run one synchronization pass
    ///
    /// Only a failed pending scan fails the run; batch failures are counted
    /// in the returned statistics.
    pub async fn synchronize(&self, cancel: &CancellationToken) -> Result<SyncOutcome> {
        let pending = self.repository.scan(SyncStatus::Pending).await.map_err(|e| {
            error!("Failed to scan pending airports: {}", e);
            e
        })?;

        if pending.is_empty() {
            info!("No pending airports to synchronize");
            return Ok(SyncOutcome::NothingToDo);
        }

        let total = pending.len();
        let batches: Vec<Vec<Airport>> = pending
            .chunks(self.batch_size)
            .map(<[Airport]>::to_vec)
            .collect();
        let capacity = (total / self.batch_size).max(1);

        info!(
            "Synchronizing {} pending airports in {} batches with {} workers",
            total,
            batches.len(),
            self.workers
        );

        let (sender, receiver) = mpsc::channel(capacity);
        let receiver: SharedReceiver = Arc::new(Mutex::new(receiver));
        let stats: SharedStats = Arc::new(Mutex::new(SyncStatistics::new(total)));

        let mut workers = JoinSet::new();
        for worker_id in 0..self.workers {
            let receiver = receiver.clone();
            let stats = stats.clone();
            let repository = self.repository.clone();
            let source = self.source.clone();
            let cancel = cancel.clone();

            workers.spawn(async move {
                Self::worker_task(worker_id, receiver, stats, repository, source, cancel).await
            });
        }
        // Workers own the receiver now; once they all exit the producer sees a closed channel
        drop(receiver);

        let producer = tokio::spawn(async move {
            for batch in batches {
                if sender.send(batch).await.is_err() {
                    debug!("All sync workers stopped, dropping remaining batches");
                    break;
                }
            }
        });

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Sync worker task panicked: {}", e);
            }
        }
        if let Err(e) = producer.await {
            error!("Sync producer task panicked: {}", e);
        }

        let stats = match Arc::try_unwrap(stats) {
            Ok(stats) => stats.into_inner(),
            Err(shared) => shared.lock().await.clone(),
        };

        if cancel.is_cancelled() && stats.remaining() > 0 {
            warn!(
                "Synchronization stopped early: {} airports left pending",
                stats.remaining()
            );
        }
        info!("{}", stats.summary());

        Ok(SyncOutcome::Completed(stats))
    }

    async fn worker_task(
        worker_id: usize,
        receiver: SharedReceiver,
        stats: SharedStats,
        repository: Arc<dyn AirportRepository>,
        source: Arc<dyn AviationSource>,
        cancel: CancellationToken,
    ) {
        let mut batches_processed = 0usize;

        debug!("Worker {} started", worker_id);

        loop {
            // Check the run deadline before taking more work
            if cancel.is_cancelled() {
                debug!("Worker {} stopping: run cancelled", worker_id);
                break;
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Worker {} stopping: run cancelled while waiting", worker_id);
                    break;
                }
                next = async { receiver.lock().await.recv().await } => next,
            };
            let Some(batch) = next else {
                debug!("Worker {} finished - queue closed", worker_id);
                break;
            };

            Self::process_batch(worker_id, &batch, repository.as_ref(), source.as_ref(), &stats)
                .await;
            batches_processed += 1;
        }

        debug!("Worker {} completed {} batches", worker_id, batches_processed);
    }

    async fn process_batch(
        worker_id: usize,
        batch: &[Airport],
        repository: &dyn AirportRepository,
        source: &dyn AviationSource,
        stats: &SharedStats,
    ) {
        let keys = batch
            .iter()
            .map(|a| a.icao.as_str())
            .collect::<Vec<_>>()
            .join(",");

        debug!("Worker {} fetching batch of {} airports", worker_id, batch.len());

        let response = match source.fetch_airports(&keys).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    "Worker {} failed to fetch batch of {} airports: {}",
                    worker_id,
                    batch.len(),
                    e
                );
                stats.lock().await.error += 1;
                return;
            }
        };

        let reconciled = reconcile_batch(batch, response);

        if let Err(e) = repository.batch_upsert(&reconciled.airports).await {
            error!(
                "Worker {} failed to persist batch of {} airports: {}",
                worker_id,
                reconciled.airports.len(),
                e
            );
            stats.lock().await.error += 1;
            return;
        }

        let mut shared = stats.lock().await;
        shared.success += reconciled.success;
        shared.failed += reconciled.failed;
    }
}
