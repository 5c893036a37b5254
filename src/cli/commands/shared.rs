//! Shared components for CLI commands
//!
//! This module contains logging setup, layered configuration loading and the
//! wiring of services from configuration used by every command.

use crate::app::services::airport_repository::{
    AirportRepository, InMemoryAirportRepository, PgAirportRepository,
};
use crate::app::services::airport_service::AirportService;
use crate::app::services::airport_sync::AirportSyncService;
use crate::app::services::airport_weather::AirportWeatherService;
use crate::app::services::cache_store::{CacheStore, InMemoryCache, RedisCache};
use crate::app::services::source_client::{AviationSource, HttpSourceClient};
use crate::app::services::weather_service::WeatherService;
use crate::cli::args::{CommonArgs, SyncArgs};
use crate::config::Config;
use crate::constants::CACHE_PURGE_INTERVAL_SECS;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Set up structured logging on stderr
pub fn setup_logging(args: &CommonArgs, configured_level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level(configured_level);

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aviation_sync={}", log_level)));

    if args.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_configuration(args: &CommonArgs) -> Result<Config> {
    // Determine config file path
    let default_config_path = if args.config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &args.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    let mut config = Config::load_layered(config_file)?;

    // Apply CLI argument overrides
    apply_cli_overrides(&mut config, args);

    // Final validation
    config.validate()?;

    Ok(config)
}

/// Apply shared CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, args: &CommonArgs) {
    if let Some(database_url) = &args.database_url {
        config.database.url = Some(database_url.clone());
    }
    if let Some(redis_url) = &args.redis_url {
        config.cache.url = Some(redis_url.clone());
    }
}

/// Apply sync CLI argument overrides to configuration
pub fn apply_sync_overrides(config: &mut Config, args: &SyncArgs) -> Result<()> {
    if let Some(workers) = args.workers {
        config.sync.workers = workers;
    }
    if let Some(batch_size) = args.batch_size {
        config.sync.batch_size = batch_size;
    }
    if let Some(run_budget_secs) = args.run_budget_secs {
        config.sync.run_budget_secs = run_budget_secs;
    }

    config.validate()
}

/// Services wired from configuration
pub struct Services {
    pub repository: Arc<dyn AirportRepository>,
    pub airports: Arc<AirportService>,
    pub weather: Arc<WeatherService>,
    pub airport_weather: AirportWeatherService,
    pub sync: Arc<AirportSyncService>,
}

/// Open the configured record store
///
/// PostgreSQL when a database URL is configured, otherwise a process-local
/// in-memory store.
pub async fn open_repository(config: &Config) -> Result<Arc<dyn AirportRepository>> {
    match &config.database.url {
        Some(url) => {
            let repository =
                PgAirportRepository::connect(url, config.database.max_connections).await?;
            Ok(Arc::new(repository))
        }
        None => {
            warn!("No database URL configured, using in-memory record store");
            Ok(Arc::new(InMemoryAirportRepository::new()))
        }
    }
}

/// Open the configured cache
///
/// Redis when a cache URL is configured, otherwise a process-local cache
/// with a background purger.
pub async fn open_cache(config: &Config) -> Result<Arc<dyn CacheStore>> {
    match config.cache.url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(url) => Ok(Arc::new(RedisCache::connect(url).await?)),
        None => {
            warn!("No Redis URL configured, cached lookups will not outlive this process");
            let cache = Arc::new(InMemoryCache::new());
            InMemoryCache::spawn_purger(&cache, Duration::from_secs(CACHE_PURGE_INTERVAL_SECS));
            Ok(cache)
        }
    }
}

/// Build every service over one record store, cache and source client
pub async fn build_services(config: &Config) -> Result<Services> {
    let repository = open_repository(config).await?;
    let cache = open_cache(config).await?;
    let source: Arc<dyn AviationSource> = Arc::new(HttpSourceClient::new(config.source.clone())?);

    if config.source.weather_api_key.is_empty() {
        warn!("WEATHER_API_KEY is not set, weather lookups will likely be rejected");
    }

    let airports = Arc::new(
        AirportService::new(repository.clone(), cache.clone(), source.clone())
            .with_search_ttl(config.search_ttl()),
    );
    let weather = Arc::new(WeatherService::new(cache, source.clone()));
    let airport_weather = AirportWeatherService::new(airports.clone(), weather.clone())
        .with_max_workers(config.join.max_workers);
    let sync = Arc::new(
        AirportSyncService::new(repository.clone(), source)
            .with_batch_size(config.sync.batch_size)
            .with_workers(config.sync.workers),
    );

    info!("Services initialized");
    Ok(Services {
        repository,
        airports,
        weather,
        airport_weather,
        sync,
    })
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Check if an error is critical enough to stop a recurring job
pub fn is_critical_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Configuration { .. } | Error::Database { .. } | Error::Cancelled { .. }
    )
}

/// Create a spinner with appropriate styling
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::OutputFormat;

    fn common() -> CommonArgs {
        CommonArgs {
            config_file: None,
            database_url: None,
            redis_url: None,
            verbose: 0,
            quiet: false,
            output_format: OutputFormat::Human,
        }
    }

    #[test]
    fn test_database_url_override() {
        let mut config = Config::default();
        let mut args = common();
        args.database_url = Some("postgres://localhost/aviation".to_string());
        args.redis_url = Some("redis://localhost:6379".to_string());

        apply_cli_overrides(&mut config, &args);
        assert_eq!(config.cache.url.as_deref(), Some("redis://localhost:6379"));

        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/aviation")
        );
    }

    #[test]
    fn test_sync_overrides_are_validated() {
        let mut config = Config::default();
        let args = SyncArgs {
            workers: Some(3),
            batch_size: Some(15),
            run_budget_secs: None,
        };
        apply_sync_overrides(&mut config, &args).unwrap();
        assert_eq!(config.sync.workers, 3);
        assert_eq!(config.sync.batch_size, 15);
        assert_eq!(config.sync.run_budget_secs, 60);

        let args = SyncArgs {
            workers: Some(500),
            batch_size: None,
            run_budget_secs: None,
        };
        assert!(apply_sync_overrides(&mut Config::default(), &args).is_err());
    }

    #[test]
    fn test_critical_errors() {
        assert!(is_critical_error(&Error::configuration("bad")));
        assert!(!is_critical_error(&Error::external_source("down")));
    }

    #[tokio::test]
    async fn test_cache_without_url_is_process_local() {
        let cache = open_cache(&Config::default()).await.unwrap();
        cache
            .set("airport:KAVL::1:0", b"[]".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get("airport:KAVL::1:0").await.unwrap().as_deref(),
            Some(b"[]".as_slice())
        );
    }

    #[tokio::test]
    async fn test_malformed_cache_url_is_rejected() {
        let mut config = Config::default();
        config.cache.url = Some("definitely not a url".to_string());
        assert!(matches!(
            open_cache(&config).await,
            Err(Error::CacheStore { .. })
        ));
    }

    #[tokio::test]
    async fn test_services_without_database_use_memory_store() {
        let services = build_services(&Config::default()).await.unwrap();
        assert!(services.repository.get_all(0, 0).await.unwrap().is_empty());
    }
}
