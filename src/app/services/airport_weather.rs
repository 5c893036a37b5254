//! Weather enrichment of airport result sets
//!
//! Records are fed into one shared queue drained by a bounded pool of worker
//! tasks. Each worker resolves the weather for a record's city and appends the
//! enriched record to a shared result collection. Output order follows
//! completion order, not input order.

use crate::app::models::{Airport, AirportQuery, AirportWeather};
use crate::app::services::airport_service::AirportService;
use crate::app::services::weather_service::WeatherService;
use crate::constants::DEFAULT_JOIN_WORKERS;
use crate::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

type SharedReceiver = Arc<Mutex<mpsc::Receiver<Airport>>>;
type SharedResults = Arc<Mutex<Vec<AirportWeather>>>;

/// Airport search joined with per-city weather
pub struct AirportWeatherService {
    airports: Arc<AirportService>,
    weather: Arc<WeatherService>,
    max_workers: usize,
}

impl AirportWeatherService {
    pub fn new(airports: Arc<AirportService>, weather: Arc<WeatherService>) -> Self {
        Self {
            airports,
            weather,
            max_workers: DEFAULT_JOIN_WORKERS,
        }
    }

    /// Set the upper bound on enrichment workers (at least one)
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Resolve the query, then enrich every result with weather
    pub async fn search_airport_weather(
        &self,
        query: &AirportQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<AirportWeather>> {
        let airports = self.airports.search_airport(query, cancel).await?;
        Ok(self.join(airports, cancel).await)
    }

    /// Attach current weather to each record
    ///
    /// Never fails: a record whose lookup errors, has no city, or is reached
    /// after cancellation is returned without weather.
    pub async fn join(
        &self,
        records: Vec<Airport>,
        cancel: &CancellationToken,
    ) -> Vec<AirportWeather> {
        if records.is_empty() {
            return Vec::new();
        }

        let worker_count = self.max_workers.min(records.len());
        let (sender, receiver) = mpsc::channel(records.len());
        let receiver: SharedReceiver = Arc::new(Mutex::new(receiver));
        let results: SharedResults = Arc::new(Mutex::new(Vec::with_capacity(records.len())));

        debug!(
            "Enriching {} airports with {} weather workers",
            records.len(),
            worker_count
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            let receiver = receiver.clone();
            let results = results.clone();
            let weather = self.weather.clone();
            let cancel = cancel.clone();

            workers.spawn(async move {
                Self::worker_task(worker_id, receiver, results, weather, cancel).await
            });
        }

        for record in records {
            if sender.send(record).await.is_err() {
                error!("Weather workers stopped before the queue was filled");
                break;
            }
        }
        drop(sender);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Weather worker task panicked: {}", e);
            }
        }

        match Arc::try_unwrap(results) {
            Ok(results) => results.into_inner(),
            Err(shared) => shared.lock().await.clone(),
        }
    }

    async fn worker_task(
        worker_id: usize,
        receiver: SharedReceiver,
        results: SharedResults,
        weather: Arc<WeatherService>,
        cancel: CancellationToken,
    ) {
        let mut enriched = 0usize;

        loop {
            let next = receiver.lock().await.recv().await;
            let Some(airport) = next else {
                break;
            };

            let joined = if cancel.is_cancelled() {
                AirportWeather::bare(airport)
            } else {
                match airport.weather_city().map(str::to_string) {
                    Some(city) => match weather.get_weather(&city, &cancel).await {
                        Ok(report) => {
                            enriched += 1;
                            AirportWeather::with_weather(airport, report.current)
                        }
                        Err(e) if e.is_source_failure() => {
                            warn!(
                                "Worker {} got no weather for {} ({}): {}",
                                worker_id, airport.icao, city, e
                            );
                            AirportWeather::bare(airport)
                        }
                        Err(e) => {
                            error!(
                                "Worker {} failed to get weather for {} ({}): {}",
                                worker_id, airport.icao, city, e
                            );
                            AirportWeather::bare(airport)
                        }
                    },
                    None => AirportWeather::bare(airport),
                }
            };

            results.lock().await.push(joined);
        }

        debug!("Worker {} enriched {} airports", worker_id, enriched);
    }
}
