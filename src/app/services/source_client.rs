//! External aviation and weather data sources
//!
//! [`AviationSource`] is the seam between the engines and the outside world:
//! the HTTP implementation talks to the airport and weather APIs, tests plug
//! in fakes that count calls and inject failures.

use crate::app::models::{AirportDataResponse, WeatherReport};
use crate::config::SourceConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Authoritative data source for airports and current weather
#[async_trait]
pub trait AviationSource: Send + Sync {
    /// Look up a comma-joined list of ICAO codes
    ///
    /// The response maps each key the source recognised to zero or more
    /// candidate records. Keys may be missing from the response entirely.
    async fn fetch_airports(&self, icaos: &str) -> Result<AirportDataResponse>;

    /// Current weather for a free-text location (usually a city name)
    async fn fetch_weather(&self, query: &str) -> Result<WeatherReport>;
}

/// HTTP client for the airport and weather APIs
#[derive(Debug, Clone)]
pub struct HttpSourceClient {
    client: Client,
    config: SourceConfig,
}

impl HttpSourceClient {
    /// Build a client with the configured timeout and user agent
    pub fn new(config: SourceConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport("Failed to build HTTP client", e))?;

        Ok(Self { client, config })
    }

    fn airports_url(&self) -> String {
        format!("{}/airports", self.config.airport_api_url.trim_end_matches('/'))
    }

    fn weather_url(&self) -> String {
        format!(
            "{}/current.json",
            self.config.weather_api_url.trim_end_matches('/')
        )
    }

    /// Issue a GET and decode the JSON body, separating transport, status and payload faults
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Request for {} failed", what), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::external_source(format!(
                "{} returned HTTP {} for {}",
                url,
                status.as_u16(),
                what
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response for {}", what), e))?;

        serde_json::from_slice(&body)
            .map_err(|e| Error::decode(format!("Malformed payload for {}", what), e))
    }
}

#[async_trait]
impl AviationSource for HttpSourceClient {
    async fn fetch_airports(&self, icaos: &str) -> Result<AirportDataResponse> {
        debug!("Fetching airport data for {}", icaos);
        self.get_json(&self.airports_url(), &[("apt", icaos)], &format!("airports {}", icaos))
            .await
    }

    async fn fetch_weather(&self, query: &str) -> Result<WeatherReport> {
        debug!("Fetching weather for {}", query);
        self.get_json(
            &self.weather_url(),
            &[("key", self.config.weather_api_key.as_str()), ("q", query)],
            &format!("weather {}", query),
        )
        .await
    }
}
