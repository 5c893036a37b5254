//! Weather report models
//!
//! Field names follow the external weather API's `current.json` payload so
//! reports round-trip through the cache unchanged.

use super::Airport;
use serde::{Deserialize, Serialize};

/// Textual weather condition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherCondition {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub code: i32,
}

/// Current weather conditions for a city
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub last_updated: String,
    pub temp_c: f64,
    pub is_day: i32,
    pub condition: WeatherCondition,
    pub wind_kph: f64,
    pub wind_degree: i32,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub precip_mm: f64,
    pub humidity: i32,
    pub cloud: i32,
    pub feelslike_c: f64,
    pub windchill_c: f64,
    pub heatindex_c: f64,
    pub dewpoint_c: f64,
    pub vis_km: f64,
    pub uv: f64,
    pub gust_kph: f64,
}

/// Envelope returned by the weather API and stored in the cache
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: Weather,
}

impl WeatherReport {
    pub fn new(current: Weather) -> Self {
        Self { current }
    }
}

/// Airport enriched with the weather of its city
///
/// Serializes as the flat airport object with an extra `weather` key, which
/// is omitted when no report could be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportWeather {
    #[serde(flatten)]
    pub airport: Airport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
}

impl AirportWeather {
    /// Airport without enrichment
    pub fn bare(airport: Airport) -> Self {
        Self {
            airport,
            weather: None,
        }
    }

    pub fn with_weather(airport: Airport, weather: Weather) -> Self {
        Self {
            airport,
            weather: Some(weather),
        }
    }
}
