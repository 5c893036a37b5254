//! Sync command implementation
//!
//! Runs one synchronization pass bounded by the configured run budget and
//! reports the resulting statistics.

use super::shared::{Services, apply_sync_overrides, build_services, create_spinner, print_json};
use crate::app::services::airport_sync::{AirportSyncService, SyncOutcome};
use crate::cli::args::{CommonArgs, OutputFormat, SyncArgs};
use crate::config::Config;
use crate::Result;
use colored::*;
use indicatif::HumanDuration;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Sync command runner
pub async fn run_sync(
    args: SyncArgs,
    common: &CommonArgs,
    mut config: Config,
    cancel: CancellationToken,
) -> Result<()> {
    apply_sync_overrides(&mut config, &args)?;
    let Services { sync, .. } = build_services(&config).await?;

    let start_time = Instant::now();
    let spinner = common
        .show_progress()
        .then(|| create_spinner("Synchronizing pending airports"));

    let outcome = run_with_budget(&sync, &cancel, config.run_budget()).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let outcome = outcome?;

    match common.output_format {
        OutputFormat::Human => print_human_outcome(&outcome, start_time.elapsed()),
        OutputFormat::Json => print_json_outcome(&outcome)?,
    }
    Ok(())
}

/// Run one pass under a child token that fires when `budget` elapses
///
/// Cancelling `root` also cancels the run. The timer is torn down as soon as
/// the pass returns.
pub async fn run_with_budget(
    sync: &AirportSyncService,
    root: &CancellationToken,
    budget: Duration,
) -> Result<SyncOutcome> {
    let run_token = root.child_token();
    let deadline = run_token.clone();
    let timer = tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(budget) => {
                warn!("Synchronization run budget of {}s spent, stopping after in-flight batches", budget.as_secs());
                deadline.cancel();
            }
            _ = deadline.cancelled() => {}
        }
    });

    let outcome = sync.synchronize(&run_token).await;

    timer.abort();
    outcome
}

fn print_human_outcome(outcome: &SyncOutcome, elapsed: Duration) {
    let stats = match outcome {
        SyncOutcome::NothingToDo => {
            println!("{}", "Nothing to sync: no pending airports".yellow());
            return;
        }
        SyncOutcome::Completed(stats) => stats,
    };

    println!("\n{}", "Airport Synchronization Complete".bold().green());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   • Pending airports: {}", stats.total);
    println!(
        "   • Synchronized: {} ({:.1}%)",
        stats.success.to_string().green(),
        stats.success_rate()
    );
    println!("   • No source data: {}", stats.failed.to_string().yellow());
    if stats.error > 0 {
        println!("   • Failed batches: {}", stats.error.to_string().red());
    }
    if stats.remaining() > 0 {
        println!("   • Left pending: {}", stats.remaining());
    }
    println!("   • Duration: {}", HumanDuration(elapsed));
    println!();

    info!("{}", stats.summary());
}

fn print_json_outcome(outcome: &SyncOutcome) -> Result<()> {
    let value = match outcome {
        SyncOutcome::NothingToDo => json!({ "outcome": "nothing_to_do" }),
        SyncOutcome::Completed(stats) => json!({
            "outcome": "completed",
            "statistics": stats,
            "remaining": stats.remaining(),
        }),
    };
    print_json(&value)
}

/// Statistics as a single log line, for scheduled runs
pub fn describe(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::NothingToDo => "No airport data to sync".to_string(),
        SyncOutcome::Completed(stats) => stats.summary(),
    }
}
