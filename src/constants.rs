//! Application constants for the aviation sync service
//!
//! This module contains default values, cache key prefixes and status
//! literals used throughout the service.

// =============================================================================
// Synchronization Defaults
// =============================================================================

/// Number of ICAO codes sent to the external source per request
pub const DEFAULT_SYNC_BATCH_SIZE: usize = 30;

/// Number of concurrent synchronization workers
pub const DEFAULT_SYNC_WORKERS: usize = 10;

/// Upper bound on configurable worker counts
pub const MAX_WORKERS: usize = 100;

/// Wall-clock budget for a scheduled synchronization run in seconds
pub const DEFAULT_SYNC_RUN_BUDGET_SECS: u64 = 60;

/// Cron expression for the scheduled run (sec min hour day month weekday)
pub const DEFAULT_SYNC_SCHEDULE: &str = "0 0 5 * * *";

// =============================================================================
// Join Defaults
// =============================================================================

/// Maximum number of weather enrichment workers
pub const DEFAULT_JOIN_WORKERS: usize = 10;

// =============================================================================
// Cache Configuration
// =============================================================================

/// Time-to-live for cached airport search results (24 hours)
pub const DEFAULT_SEARCH_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// How often the in-memory cache drops entries nobody read again
pub const CACHE_PURGE_INTERVAL_SECS: u64 = 60;

/// Weather cache entries expire on quarter-hour boundaries
pub const WEATHER_CACHE_BOUNDARY_MINUTES: u32 = 15;

/// Cache key prefixes
pub mod cache_keys {
    /// Prefix for airport search result sets
    pub const AIRPORT_PREFIX: &str = "airport";

    /// Prefix for weather reports
    pub const WEATHER_PREFIX: &str = "weather";
}

// =============================================================================
// Record Status Literals
// =============================================================================

/// Reconciliation status values as persisted
pub mod status {
    /// Record is missing attributes and awaits reconciliation
    pub const PENDING: &str = "PENDING";

    /// Record holds authoritative data
    pub const DONE: &str = "DONE";

    /// Authoritative source has no data for the record
    pub const FAILED: &str = "FAILED";
}

// =============================================================================
// External Source Defaults
// =============================================================================

/// Default base URL of the airport data API
pub const DEFAULT_AIRPORT_API_URL: &str = "https://api.aviationapi.com/v1";

/// Default base URL of the weather API
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.weatherapi.com/v1";

/// Default request timeout for external calls in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// User agent sent with external requests
pub const DEFAULT_USER_AGENT: &str = concat!("aviation-sync/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Database Defaults
// =============================================================================

/// Default size of the PostgreSQL connection pool
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Seconds to wait for a pooled connection
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// CLI Defaults
// =============================================================================

/// Default page number for listings
pub const DEFAULT_PAGE: usize = 1;

/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Environment variable names read during configuration loading
pub mod env_vars {
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const AIRPORT_API_URL: &str = "AIRPORT_API_URL";
    pub const WEATHER_API_URL: &str = "WEATHER_API_URL";
    pub const WEATHER_API_KEY: &str = "WEATHER_API_KEY";
    pub const REDIS_URL: &str = "REDIS_URL";
}

/// Directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "aviation-sync";

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "config.json";
