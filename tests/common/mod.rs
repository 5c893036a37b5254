//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use aviation_sync::app::models::{AirportDataResponse, WeatherCondition, WeatherReport};
use aviation_sync::app::services::source_client::AviationSource;
use aviation_sync::{Airport, Error, Result, Weather};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-process stand-in for the airport and weather APIs
#[derive(Default)]
pub struct StubSource {
    airports: HashMap<String, Airport>,
    weather: HashMap<String, WeatherReport>,
    pub airport_calls: AtomicUsize,
    pub weather_calls: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_airport(mut self, airport: Airport) -> Self {
        self.airports.insert(airport.icao.clone(), airport);
        self
    }

    pub fn with_weather(mut self, city: &str, temp_c: f64) -> Self {
        self.weather.insert(
            city.to_string(),
            WeatherReport::new(Weather {
                last_updated: "2024-05-01 12:00".to_string(),
                temp_c,
                condition: WeatherCondition {
                    text: "Partly cloudy".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            }),
        );
        self
    }

    pub fn airport_calls(&self) -> usize {
        self.airport_calls.load(Ordering::SeqCst)
    }

    pub fn weather_calls(&self) -> usize {
        self.weather_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AviationSource for StubSource {
    async fn fetch_airports(&self, icaos: &str) -> Result<AirportDataResponse> {
        self.airport_calls.fetch_add(1, Ordering::SeqCst);
        Ok(icaos
            .split(',')
            .filter_map(|icao| {
                self.airports
                    .get(icao)
                    .map(|airport| (icao.to_string(), vec![airport.clone()]))
            })
            .collect())
    }

    async fn fetch_weather(&self, query: &str) -> Result<WeatherReport> {
        self.weather_calls.fetch_add(1, Ordering::SeqCst);
        self.weather
            .get(query)
            .cloned()
            .ok_or_else(|| Error::external_source(format!("No matching location for {}", query)))
    }
}

/// Authoritative record for `icao` with every attribute populated
pub fn authoritative_airport(icao: &str, city: &str) -> Airport {
    Airport {
        facility_type: Some("AIRPORT".to_string()),
        facility_name: Some(format!("{} REGIONAL", city.to_uppercase())),
        faa: Some(icao.trim_start_matches('K').to_string()),
        region: Some("ASO".to_string()),
        state: Some("NORTH CAROLINA".to_string()),
        county: Some("BUNCOMBE".to_string()),
        city: Some(city.to_string()),
        ownership: Some("PU".to_string()),
        facility_use: Some("PU".to_string()),
        manager: Some("JANE DOE".to_string()),
        manager_phone: Some("828-555-0100".to_string()),
        latitude: Some("35-26-04.0000N".to_string()),
        longitude: Some("082-32-30.0000W".to_string()),
        ..Airport::new(icao)
    }
}
