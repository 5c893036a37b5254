//! Schedule command implementation
//!
//! Registers a cron job that runs one budget-bounded synchronization pass per
//! tick, and keeps the scheduler alive until the process is interrupted.

use super::shared::{Services, apply_sync_overrides, build_services, is_critical_error};
use super::sync::{describe, run_with_budget};
use crate::app::services::airport_sync::AirportSyncService;
use crate::cli::args::ScheduleArgs;
use crate::config::Config;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Schedule command runner
pub async fn run_schedule(
    args: ScheduleArgs,
    mut config: Config,
    cancel: CancellationToken,
) -> Result<()> {
    apply_sync_overrides(&mut config, &args.sync)?;
    if let Some(cron) = args.cron {
        config.sync.schedule = cron;
    }

    let Services { sync, .. } = build_services(&config).await?;
    let schedule = config.sync.schedule.clone();
    let budget = config.run_budget();

    let mut scheduler = JobScheduler::new()
        .await
        .map_err(|e| Error::scheduler(format!("Failed to create scheduler: {}", e)))?;

    let job = sync_job(&schedule, sync, budget, cancel.clone())?;
    scheduler
        .add(job)
        .await
        .map_err(|e| Error::scheduler(format!("Failed to add sync job: {}", e)))?;
    scheduler
        .start()
        .await
        .map_err(|e| Error::scheduler(format!("Failed to start scheduler: {}", e)))?;

    info!(
        "Scheduled synchronization '{}' with a {}s run budget; press CTRL+C to stop",
        schedule,
        budget.as_secs()
    );

    cancel.cancelled().await;

    info!("Stopping scheduler");
    scheduler
        .shutdown()
        .await
        .map_err(|e| Error::scheduler(format!("Failed to stop scheduler: {}", e)))?;
    Ok(())
}

/// Build the recurring sync job
///
/// Ticks that arrive while a previous run is still going are skipped.
fn sync_job(
    schedule: &str,
    sync: Arc<AirportSyncService>,
    budget: Duration,
    cancel: CancellationToken,
) -> Result<Job> {
    let running = Arc::new(Mutex::new(()));

    Job::new_async(schedule, move |_uuid, _scheduler| {
        let sync = sync.clone();
        let cancel = cancel.clone();
        let running = running.clone();

        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                warn!("Previous synchronization still running, skipping this tick");
                return;
            };
            if cancel.is_cancelled() {
                return;
            }

            info!("Scheduled synchronization started");
            match run_with_budget(&sync, &cancel, budget).await {
                Ok(outcome) => info!("{}", describe(&outcome)),
                Err(e) if is_critical_error(&e) => {
                    error!("Scheduled synchronization failed, stopping schedule: {}", e);
                    cancel.cancel();
                }
                Err(e) => error!("Scheduled synchronization failed: {}", e),
            }
        })
    })
    .map_err(|e| Error::scheduler(format!("Invalid cron expression '{}': {}", schedule, e)))
}
