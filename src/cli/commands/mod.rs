//! Command implementations for the aviation sync CLI
//!
//! Each command lives in its own module; this module validates arguments,
//! loads layered configuration, initializes logging and dispatches.

pub mod airport;
pub mod migrate;
pub mod schedule;
pub mod search;
pub mod shared;
pub mod sync;

use crate::Result;
use crate::cli::args::{Args, Commands};
use tokio_util::sync::CancellationToken;

/// Main command runner
///
/// `cancel` is the process-wide shutdown token. Long-running commands stop
/// taking new work once it fires and return what they finished.
pub async fn run(args: Args, cancel: CancellationToken) -> Result<()> {
    args.validate()?;

    let config = shared::load_configuration(&args.common)?;
    shared::setup_logging(&args.common, &config.logging.level)?;

    let common = args.common;
    match args.command {
        Commands::Sync(sync_args) => sync::run_sync(sync_args, &common, config, cancel).await,
        Commands::Schedule(schedule_args) => {
            schedule::run_schedule(schedule_args, config, cancel).await
        }
        Commands::Search(search_args) => {
            search::run_search(search_args, &common, config, cancel).await
        }
        Commands::Weather(weather_args) => {
            search::run_weather(weather_args, &common, config, cancel).await
        }
        Commands::AirportWeather(search_args) => {
            search::run_airport_weather(search_args, &common, config, cancel).await
        }
        Commands::Airport(airport_args) => airport::run_airport(airport_args, &common, config).await,
        Commands::Migrate => migrate::run_migrate(config).await,
    }
}
