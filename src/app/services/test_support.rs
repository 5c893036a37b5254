//! Fakes and fixtures shared by service unit tests

use crate::app::models::{
    Airport, AirportDataResponse, AirportQuery, SyncStatus, Weather, WeatherCondition,
    WeatherReport,
};
use crate::app::services::airport_repository::{AirportRepository, InMemoryAirportRepository};
use crate::app::services::cache_store::CacheStore;
use crate::app::services::source_client::AviationSource;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Airport with every attribute populated in valid formats
pub fn complete_airport(icao: &str) -> Airport {
    Airport {
        id: 0,
        facility_type: Some("AIRPORT".to_string()),
        facility_name: Some(format!("{} FIELD", icao)),
        faa: Some(icao.trim_start_matches('K').to_string()),
        region: Some("ASO".to_string()),
        state: Some("NORTH CAROLINA".to_string()),
        county: Some("BUNCOMBE".to_string()),
        city: Some(format!("{} CITY", icao)),
        ownership: Some("PU".to_string()),
        facility_use: Some("PU".to_string()),
        manager: Some("Field Manager".to_string()),
        manager_phone: Some("(828) 684-2226".to_string()),
        latitude: Some("35-26-04.0000N".to_string()),
        longitude: Some("082-32-33.8000W".to_string()),
        icao: icao.to_string(),
        status: SyncStatus::Pending,
    }
}

/// Weather report with a recognisable temperature
pub fn weather_report(temp_c: f64) -> WeatherReport {
    WeatherReport::new(Weather {
        last_updated: "2024-05-01 12:00".to_string(),
        temp_c,
        condition: WeatherCondition {
            text: "Sunny".to_string(),
            icon: String::new(),
            code: 1000,
        },
        ..Default::default()
    })
}

/// Scriptable external source that records every call
#[derive(Default)]
pub struct FakeSource {
    airports: HashMap<String, Vec<Airport>>,
    weather: HashMap<String, WeatherReport>,
    failing_airport_keys: HashSet<String>,
    failing_weather: HashSet<String>,
    fail_all_airports: bool,
    delay: Option<Duration>,
    airport_calls: AtomicUsize,
    weather_calls: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer lookups of `icao` with the given candidates
    pub fn with_airports(mut self, icao: &str, candidates: Vec<Airport>) -> Self {
        self.airports.insert(icao.to_string(), candidates);
        self
    }

    pub fn with_weather(mut self, city: &str, report: WeatherReport) -> Self {
        self.weather.insert(city.to_string(), report);
        self
    }

    /// Fail any airport batch that contains `icao`
    pub fn failing_airport_key(mut self, icao: &str) -> Self {
        self.failing_airport_keys.insert(icao.to_string());
        self
    }

    pub fn failing_all_airports(mut self) -> Self {
        self.fail_all_airports = true;
        self
    }

    pub fn failing_weather(mut self, city: &str) -> Self {
        self.failing_weather.insert(city.to_string());
        self
    }

    /// Sleep before answering every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn airport_calls(&self) -> usize {
        self.airport_calls.load(Ordering::SeqCst)
    }

    pub fn weather_calls(&self) -> usize {
        self.weather_calls.load(Ordering::SeqCst)
    }

    /// Raw comma-joined keys of every airport request, in arrival order
    pub fn airport_requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AviationSource for FakeSource {
    async fn fetch_airports(&self, icaos: &str) -> Result<AirportDataResponse> {
        self.airport_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(icaos.to_string());
        self.pause().await;

        let keys: Vec<&str> = icaos.split(',').collect();
        if self.fail_all_airports || keys.iter().any(|k| self.failing_airport_keys.contains(*k)) {
            return Err(Error::external_source(format!(
                "fake source rejected {}",
                icaos
            )));
        }

        Ok(keys
            .into_iter()
            .filter_map(|k| self.airports.get(k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn fetch_weather(&self, query: &str) -> Result<WeatherReport> {
        self.weather_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if self.failing_weather.contains(query) {
            return Err(Error::external_source(format!(
                "fake source has no weather for {}",
                query
            )));
        }
        self.weather
            .get(query)
            .cloned()
            .ok_or_else(|| Error::external_source(format!("unknown location {}", query)))
    }
}

/// Cache whose every operation fails
#[derive(Default)]
pub struct FailingCache {
    pub writes: AtomicUsize,
}

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(Error::cache_store("cache unavailable"))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(Error::cache_store("cache unavailable"))
    }
}

/// In-memory store with injectable failures and call counters
#[derive(Default)]
pub struct FlakyRepository {
    pub inner: InMemoryAirportRepository,
    failing_upsert_keys: HashSet<String>,
    fail_scan: bool,
    search_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
}

impl FlakyRepository {
    pub fn new(inner: InMemoryAirportRepository) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    /// Fail any batch upsert that contains `icao`
    pub fn failing_upsert_key(mut self, icao: &str) -> Self {
        self.failing_upsert_keys.insert(icao.to_string());
        self
    }

    pub fn failing_scan(mut self) -> Self {
        self.fail_scan = true;
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AirportRepository for FlakyRepository {
    async fn scan(&self, status: SyncStatus) -> Result<Vec<Airport>> {
        if self.fail_scan {
            return Err(Error::record_store("scan unavailable"));
        }
        self.inner.scan(status).await
    }

    async fn get_by_icao(&self, icao: &str) -> Result<Option<Airport>> {
        self.inner.get_by_icao(icao).await
    }

    async fn get_all(&self, limit: usize, offset: usize) -> Result<Vec<Airport>> {
        self.inner.get_all(limit, offset).await
    }

    async fn search(&self, query: &AirportQuery) -> Result<Vec<Airport>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query).await
    }

    async fn insert(&self, airport: Airport) -> Result<Airport> {
        self.inner.insert(airport).await
    }

    async fn update_by_icao(&self, airport: Airport) -> Result<Airport> {
        self.inner.update_by_icao(airport).await
    }

    async fn batch_upsert(&self, airports: &[Airport]) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if airports
            .iter()
            .any(|a| self.failing_upsert_keys.contains(&a.icao))
        {
            return Err(Error::record_store("upsert rejected"));
        }
        self.inner.batch_upsert(airports).await
    }

    async fn delete_by_icao(&self, icao: &str) -> Result<()> {
        self.inner.delete_by_icao(icao).await
    }
}
