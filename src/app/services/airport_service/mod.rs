//! Airport lookups and record management
//!
//! [`AirportService::search_airport`] resolves queries through three tiers:
//!
//! 1. **Cache**: the serialized result set for the exact query parameters
//! 2. **Record store**: a filtered search; any rows, or a broad query, end here
//! 3. **External source**: a keyed query with no local rows is fetched,
//!    written through to the store as `DONE` and cached
//!
//! A cache hit is trusted as-is and never revalidated against the store.
//! Cache faults degrade to a miss and never fail a lookup.
//!
//! The CRUD operations validate attribute formats and derive the record
//! status from completeness before persisting.

use crate::app::models::{Airport, AirportQuery, SyncStatus};
use crate::app::services::airport_repository::AirportRepository;
use crate::app::services::airport_validator;
use crate::app::services::cache_store::{self, CacheStore};
use crate::app::services::source_client::AviationSource;
use crate::constants::DEFAULT_SEARCH_CACHE_TTL_SECS;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[cfg(test)]
pub mod tests;

/// Airport resolver and record manager
pub struct AirportService {
    repository: Arc<dyn AirportRepository>,
    cache: Arc<dyn CacheStore>,
    source: Arc<dyn AviationSource>,
    search_ttl: Duration,
}

impl AirportService {
    pub fn new(
        repository: Arc<dyn AirportRepository>,
        cache: Arc<dyn CacheStore>,
        source: Arc<dyn AviationSource>,
    ) -> Self {
        Self {
            repository,
            cache,
            source,
            search_ttl: Duration::from_secs(DEFAULT_SEARCH_CACHE_TTL_SECS),
        }
    }

    /// Set the lifetime of cached search results
    pub fn with_search_ttl(mut self, ttl: Duration) -> Self {
        self.search_ttl = ttl;
        self
    }

    /// Resolve a query through cache, record store and external source
    ///
    /// An unknown key the source has no data for yields an empty result,
    /// which is not cached.
    pub async fn search_airport(
        &self,
        query: &AirportQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Airport>> {
        let key = query.cache_key();

        check_cancelled(cancel, &key)?;
        if let Some(cached) =
            cache_store::get_json::<Vec<Airport>>(self.cache.as_ref(), &key).await
        {
            debug!("Airport cache hit for {}", key);
            return Ok(cached);
        }

        check_cancelled(cancel, &key)?;
        debug!("Airport cache miss for {}, searching record store", key);
        let airports = self.repository.search(query).await.map_err(|e| {
            error!("Failed to search airports for {}: {}", key, e);
            e
        })?;

        if !airports.is_empty() || query.is_broad() {
            cache_store::set_json(self.cache.as_ref(), &key, &airports, self.search_ttl).await;
            return Ok(airports);
        }

        // A stored key outside this page or name filter is a genuine empty result
        if self.repository.get_by_icao(&query.icao).await?.is_some() {
            debug!("Airport {} stored but outside query {}", query.icao, key);
            cache_store::set_json(self.cache.as_ref(), &key, &airports, self.search_ttl).await;
            return Ok(airports);
        }

        check_cancelled(cancel, &key)?;
        info!("Airport {} not stored locally, fetching from source", query.icao);
        let mut response = self.source.fetch_airports(&query.icao).await.map_err(|e| {
            error!("Failed to fetch airport {} from source: {}", query.icao, e);
            e
        })?;

        let Some(candidate) = response
            .remove(&query.icao)
            .and_then(|candidates| candidates.into_iter().next())
        else {
            debug!("Source has no data for {}", query.icao);
            return Ok(Vec::new());
        };

        let fetched = Airport {
            icao: query.icao.clone(),
            ..candidate
        }
        .with_status(SyncStatus::Done);

        let inserted = self.repository.insert(fetched).await.map_err(|e| {
            error!("Failed to store fetched airport {}: {}", query.icao, e);
            e
        })?;

        let airports = vec![inserted];
        cache_store::set_json(self.cache.as_ref(), &key, &airports, self.search_ttl).await;
        Ok(airports)
    }

    /// One page of every stored airport
    pub async fn get_all_airports(&self, limit: usize, offset: usize) -> Result<Vec<Airport>> {
        self.repository.get_all(limit, offset).await
    }

    /// Stored airport by ICAO identifier
    pub async fn get_airport(&self, icao: &str) -> Result<Airport> {
        self.repository
            .get_by_icao(icao)
            .await?
            .ok_or_else(|| Error::airport_not_found(icao))
    }

    /// Validate and insert a new airport
    ///
    /// Complete records are stored as `DONE`, all others as `PENDING` so the
    /// next synchronization run picks them up.
    pub async fn create_airport(&self, airport: Airport) -> Result<Airport> {
        let airport = prepare(airport)?;
        let created = self.repository.insert(airport).await?;
        info!("Created airport {} ({})", created.icao, created.status);
        Ok(created)
    }

    /// Validate and replace an existing airport's attributes
    pub async fn update_airport(&self, airport: Airport) -> Result<Airport> {
        let airport = prepare(airport)?;
        let updated = self.repository.update_by_icao(airport).await?;
        info!("Updated airport {} ({})", updated.icao, updated.status);
        Ok(updated)
    }

    pub async fn delete_airport(&self, icao: &str) -> Result<()> {
        self.repository.delete_by_icao(icao).await?;
        info!("Deleted airport {}", icao);
        Ok(())
    }
}

fn prepare(mut airport: Airport) -> Result<Airport> {
    airport.icao = airport.icao.trim().to_string();
    airport_validator::validate(&airport)?;
    airport.status = if airport_validator::is_complete(&airport) {
        SyncStatus::Done
    } else {
        SyncStatus::Pending
    };
    Ok(airport)
}

fn check_cancelled(cancel: &CancellationToken, key: &str) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::cancelled(format!("airport search {}", key)));
    }
    Ok(())
}
