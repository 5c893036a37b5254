//! Configuration management and validation.
//!
//! Configuration is layered: built-in defaults, then an optional JSON config
//! file, then `.env` and process environment variables, then command-line
//! overrides applied by the CLI.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_AIRPORT_API_URL, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_JOIN_WORKERS, DEFAULT_SEARCH_CACHE_TTL_SECS,
    DEFAULT_SYNC_BATCH_SIZE, DEFAULT_SYNC_RUN_BUDGET_SECS, DEFAULT_SYNC_SCHEDULE,
    DEFAULT_SYNC_WORKERS, DEFAULT_USER_AGENT, DEFAULT_WEATHER_API_URL, MAX_WORKERS, env_vars,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Record store connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; the in-memory store is used when absent
    pub url: Option<String>,

    /// Maximum pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        }
    }
}

/// External airport and weather API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub airport_api_url: String,
    pub weather_api_url: String,
    pub weather_api_key: String,

    /// Connect and request timeout in seconds
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            airport_api_url: DEFAULT_AIRPORT_API_URL.to_string(),
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            weather_api_key: String::new(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Cache lifetimes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis connection URL; a process-local cache is used when absent
    pub url: Option<String>,

    /// Lifetime of cached airport search results in seconds
    pub search_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            search_ttl_secs: DEFAULT_SEARCH_CACHE_TTL_SECS,
        }
    }
}

/// Batch synchronization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// ICAO codes per source request
    pub batch_size: usize,

    /// Concurrent synchronization workers
    pub workers: usize,

    /// Wall-clock budget of a scheduled run in seconds
    pub run_budget_secs: u64,

    /// Six-field cron expression for scheduled runs
    pub schedule: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_SYNC_BATCH_SIZE,
            workers: DEFAULT_SYNC_WORKERS,
            run_budget_secs: DEFAULT_SYNC_RUN_BUDGET_SECS,
            schedule: DEFAULT_SYNC_SCHEDULE.to_string(),
        }
    }
}

/// Weather join settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    pub max_workers: usize,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_JOIN_WORKERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level when neither `-v` nor `RUST_LOG` is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
    pub join: JoinConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Default config file location under the user's config directory
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Read a JSON config file; missing sections and fields take defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            Error::configuration(format!(
                "Invalid config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load defaults, then the config file, then `.env` and the environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading config file {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup; blank values are ignored
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(env_vars::DATABASE_URL) {
            self.database.url = Some(url);
        }
        if let Some(url) = lookup(env_vars::AIRPORT_API_URL) {
            self.source.airport_api_url = url;
        }
        if let Some(url) = lookup(env_vars::WEATHER_API_URL) {
            self.source.weather_api_url = url;
        }
        if let Some(key) = lookup(env_vars::WEATHER_API_KEY) {
            self.source.weather_api_key = key;
        }
        if let Some(url) = lookup(env_vars::REDIS_URL) {
            self.cache.url = Some(url);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.sync.batch_size == 0 {
            return Err(Error::configuration("Sync batch size must be greater than 0"));
        }

        if self.sync.workers == 0 {
            return Err(Error::configuration("Sync workers must be greater than 0"));
        }

        if self.sync.workers > MAX_WORKERS {
            return Err(Error::configuration(format!(
                "Sync workers cannot exceed {}",
                MAX_WORKERS
            )));
        }

        if self.sync.run_budget_secs == 0 {
            return Err(Error::configuration("Sync run budget must be greater than 0"));
        }

        if self.join.max_workers == 0 || self.join.max_workers > MAX_WORKERS {
            return Err(Error::configuration(format!(
                "Join workers must be between 1 and {}",
                MAX_WORKERS
            )));
        }

        if self.source.airport_api_url.trim().is_empty() {
            return Err(Error::configuration("Airport API URL must not be empty"));
        }

        if self.source.weather_api_url.trim().is_empty() {
            return Err(Error::configuration("Weather API URL must not be empty"));
        }

        if self.source.timeout_secs == 0 {
            return Err(Error::configuration("Source timeout must be greater than 0"));
        }

        if self.cache.search_ttl_secs == 0 {
            return Err(Error::configuration("Search cache TTL must be greater than 0"));
        }

        if self.database.max_connections == 0 {
            return Err(Error::configuration(
                "Database max connections must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Create configuration with a database URL
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database.url = Some(url.into());
        self
    }

    /// Create configuration with custom sync worker count
    pub fn with_sync_workers(mut self, workers: usize) -> Self {
        self.sync.workers = workers;
        self
    }

    /// Create configuration with custom sync batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.sync.batch_size = batch_size;
        self
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.search_ttl_secs)
    }

    pub fn run_budget(&self) -> Duration {
        Duration::from_secs(self.sync.run_budget_secs)
    }
}
