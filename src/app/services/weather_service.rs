//! Cache-aside weather resolution
//!
//! Weather is cached per city until the next quarter-hour mark, so every
//! entry expires at :00, :15, :30 or :45 regardless of when it was written.

use crate::app::models::WeatherReport;
use crate::app::services::cache_store::{self, CacheStore};
use crate::app::services::source_client::AviationSource;
use crate::constants::WEATHER_CACHE_BOUNDARY_MINUTES;
use crate::{Error, Result};
use chrono::{DateTime, Timelike, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Time remaining from `now` until the next quarter-hour boundary
///
/// A write exactly on a boundary lives for a full quarter hour.
pub fn quarter_hour_ttl(now: DateTime<Utc>) -> Duration {
    let window = u64::from(WEATHER_CACHE_BOUNDARY_MINUTES) * 60;
    let elapsed_secs = u64::from(now.minute() % WEATHER_CACHE_BOUNDARY_MINUTES) * 60
        + u64::from(now.second());
    // nanosecond() exceeds one second during a leap second
    let elapsed = Duration::from_secs(elapsed_secs)
        + Duration::from_nanos(u64::from(now.nanosecond() % 1_000_000_000));

    Duration::from_secs(window).saturating_sub(elapsed)
}

/// Resolves current weather through the cache, falling back to the source
pub struct WeatherService {
    cache: Arc<dyn CacheStore>,
    source: Arc<dyn AviationSource>,
}

impl WeatherService {
    pub fn new(cache: Arc<dyn CacheStore>, source: Arc<dyn AviationSource>) -> Self {
        Self { cache, source }
    }

    /// Current weather for `city`
    ///
    /// Source failures propagate. Cache faults degrade to a source call.
    pub async fn get_weather(
        &self,
        city: &str,
        cancel: &CancellationToken,
    ) -> Result<WeatherReport> {
        if cancel.is_cancelled() {
            return Err(Error::cancelled(format!("weather lookup for {}", city)));
        }

        let key = cache_store::weather_key(city);
        if let Some(report) = cache_store::get_json::<WeatherReport>(self.cache.as_ref(), &key).await
        {
            debug!("Weather cache hit for {}", city);
            return Ok(report);
        }

        if cancel.is_cancelled() {
            return Err(Error::cancelled(format!("weather lookup for {}", city)));
        }

        debug!("Weather cache miss for {}, asking source", city);
        let report = self.source.fetch_weather(city).await?;

        let ttl = quarter_hour_ttl(Utc::now());
        cache_store::set_json(self.cache.as_ref(), &key, &report, ttl).await;

        Ok(report)
    }
}
