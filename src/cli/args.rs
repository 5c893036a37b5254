//! Command-line argument definitions for the aviation sync service
//!
//! This module defines the complete CLI interface using the clap derive API.

use crate::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_WORKERS};
use crate::{Error, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the aviation sync service
///
/// Keeps a local airport registry consistent with an authoritative aviation
/// data source and serves cached airport and weather lookups.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "aviation-sync",
    version,
    about = "Synchronize a local airport registry and serve cached airport and weather lookups",
    long_about = "Reconciles pending airport records against an authoritative aviation data \
                  source in bounded concurrent batches, and resolves airport and weather lookups \
                  through a cache, the local record store and the external source."
)]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Debug, Clone, ClapArgs)]
pub struct CommonArgs {
    /// Path to configuration file
    ///
    /// JSON configuration file. If not specified, looks for
    /// <config dir>/aviation-sync/config.json
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// PostgreSQL connection URL
    ///
    /// Overrides DATABASE_URL. Without a database URL an in-memory record
    /// store is used, which does not outlive the process.
    #[arg(
        long = "database-url",
        value_name = "URL",
        global = true,
        help = "PostgreSQL connection URL (overrides DATABASE_URL)"
    )]
    pub database_url: Option<String>,

    /// Redis connection URL
    ///
    /// Overrides REDIS_URL. Without it lookups are cached in process memory
    /// only, so separate invocations never share cached results.
    #[arg(
        long = "redis-url",
        value_name = "URL",
        global = true,
        help = "Redis connection URL for the shared cache (overrides REDIS_URL)"
    )]
    pub redis_url: Option<String>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors and critical messages. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        global = true,
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run one synchronization pass over pending airports
    Sync(SyncArgs),
    /// Run synchronization on a cron schedule until interrupted
    Schedule(ScheduleArgs),
    /// Search airports through the cache-aside resolver
    Search(SearchArgs),
    /// Look up current weather for one or more cities
    Weather(WeatherArgs),
    /// Search airports and enrich each result with its city's weather
    AirportWeather(SearchArgs),
    /// Manage stored airport records
    Airport(AirportArgs),
    /// Create the PostgreSQL schema
    Migrate,
}

/// Arguments for the sync command
#[derive(Debug, Clone, ClapArgs)]
pub struct SyncArgs {
    /// Number of concurrent synchronization workers
    #[arg(short = 'j', long = "workers", value_name = "COUNT")]
    pub workers: Option<usize>,

    /// Number of ICAO codes per source request
    #[arg(short = 'b', long = "batch-size", value_name = "SIZE")]
    pub batch_size: Option<usize>,

    /// Wall-clock budget for the run in seconds
    ///
    /// Workers stop taking new batches once the budget is spent; batches in
    /// flight still complete.
    #[arg(long = "run-budget", value_name = "SECONDS")]
    pub run_budget_secs: Option<u64>,
}

/// Arguments for the schedule command
#[derive(Debug, Clone, ClapArgs)]
pub struct ScheduleArgs {
    /// Six-field cron expression (sec min hour day month weekday)
    #[arg(long = "cron", value_name = "EXPR")]
    pub cron: Option<String>,

    #[command(flatten)]
    pub sync: SyncArgs,
}

/// Arguments for search and airport-weather
#[derive(Debug, Clone, ClapArgs)]
pub struct SearchArgs {
    /// Exact ICAO identifier
    #[arg(long = "icao", value_name = "ICAO")]
    pub icao: Option<String>,

    /// Case-insensitive facility name fragment
    #[arg(long = "name", value_name = "NAME")]
    pub name: Option<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

/// 1-based paging; values below one fall back to the defaults
#[derive(Debug, Clone, ClapArgs)]
pub struct PageArgs {
    #[arg(long = "page", value_name = "N", default_value_t = DEFAULT_PAGE)]
    pub page: usize,

    #[arg(long = "page-size", value_name = "N", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

/// Arguments for the weather command
#[derive(Debug, Clone, ClapArgs)]
pub struct WeatherArgs {
    /// Cities to look up
    #[arg(value_name = "CITY", required = true, num_args = 1..)]
    pub cities: Vec<String>,
}

/// Arguments for the airport command
#[derive(Debug, Clone, ClapArgs)]
pub struct AirportArgs {
    #[command(subcommand)]
    pub command: AirportCommand,
}

/// Airport record operations
#[derive(Debug, Clone, Subcommand)]
pub enum AirportCommand {
    /// List stored airports
    List(PageArgs),
    /// Show one stored airport
    Get {
        #[arg(value_name = "ICAO")]
        icao: String,
    },
    /// Validate and insert airports from a JSON array file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Delete a stored airport
    Delete {
        #[arg(value_name = "ICAO")]
        icao: String,
    },
}

/// Output format options for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl CommonArgs {
    /// Get the appropriate log level, falling back to the configured one
    pub fn get_log_level<'a>(&self, configured: &'a str) -> &'a str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => configured,
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }

    /// Validate shared arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }
}

impl SyncArgs {
    /// Validate the sync arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(Error::configuration(
                    "Number of workers must be greater than 0",
                ));
            }

            if workers > MAX_WORKERS {
                return Err(Error::configuration(format!(
                    "Number of workers cannot exceed {}",
                    MAX_WORKERS
                )));
            }
        }

        if self.batch_size == Some(0) {
            return Err(Error::configuration("Batch size must be greater than 0"));
        }

        if self.run_budget_secs == Some(0) {
            return Err(Error::configuration("Run budget must be greater than 0"));
        }

        Ok(())
    }
}

impl Args {
    /// Validate the parsed arguments for consistency
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;

        match &self.command {
            Commands::Sync(sync) => sync.validate(),
            Commands::Schedule(schedule) => schedule.sync.validate(),
            _ => Ok(()),
        }
    }
}
