//! In-memory record store
//!
//! Used when no database is configured and throughout the test suites.

use super::AirportRepository;
use crate::app::models::{Airport, AirportQuery, SyncStatus};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Records {
    by_icao: HashMap<String, Airport>,
    last_id: i64,
}

impl Records {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Records matching `filter`, ordered by id and paged
    fn collect<F>(&self, filter: F, limit: usize, offset: usize) -> Vec<Airport>
    where
        F: Fn(&Airport) -> bool,
    {
        let mut matches: Vec<&Airport> = self.by_icao.values().filter(|a| filter(a)).collect();
        matches.sort_by_key(|a| a.id);

        let take = if limit == 0 { usize::MAX } else { limit };
        matches.into_iter().skip(offset).take(take).cloned().collect()
    }
}

/// Airport store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryAirportRepository {
    records: RwLock<Records>,
}

impl InMemoryAirportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records, assigning ids in order
    pub fn with_airports(airports: impl IntoIterator<Item = Airport>) -> Self {
        let mut records = Records::default();
        for mut airport in airports {
            airport.id = records.next_id();
            records.by_icao.insert(airport.icao.clone(), airport);
        }
        Self {
            records: RwLock::new(records),
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.by_icao.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AirportRepository for InMemoryAirportRepository {
    async fn scan(&self, status: SyncStatus) -> Result<Vec<Airport>> {
        let records = self.records.read().await;
        Ok(records.collect(|a| a.status == status, 0, 0))
    }

    async fn get_by_icao(&self, icao: &str) -> Result<Option<Airport>> {
        Ok(self.records.read().await.by_icao.get(icao).cloned())
    }

    async fn get_all(&self, limit: usize, offset: usize) -> Result<Vec<Airport>> {
        let records = self.records.read().await;
        Ok(records.collect(|_| true, limit, offset))
    }

    async fn search(&self, query: &AirportQuery) -> Result<Vec<Airport>> {
        let records = self.records.read().await;
        Ok(records.collect(|a| query.matches(a), query.limit, query.offset))
    }

    async fn insert(&self, mut airport: Airport) -> Result<Airport> {
        let mut records = self.records.write().await;
        if records.by_icao.contains_key(&airport.icao) {
            return Err(Error::record_store(format!(
                "Airport {} already exists",
                airport.icao
            )));
        }

        airport.id = records.next_id();
        records
            .by_icao
            .insert(airport.icao.clone(), airport.clone());
        Ok(airport)
    }

    async fn update_by_icao(&self, mut airport: Airport) -> Result<Airport> {
        let mut records = self.records.write().await;
        let existing = records
            .by_icao
            .get_mut(&airport.icao)
            .ok_or_else(|| Error::airport_not_found(airport.icao.clone()))?;

        airport.id = existing.id;
        *existing = airport.clone();
        Ok(airport)
    }

    async fn batch_upsert(&self, airports: &[Airport]) -> Result<()> {
        let mut records = self.records.write().await;
        for airport in airports {
            let id = match records.by_icao.get(&airport.icao) {
                Some(existing) => existing.id,
                None => records.next_id(),
            };
            records.by_icao.insert(
                airport.icao.clone(),
                Airport {
                    id,
                    ..airport.clone()
                },
            );
        }
        Ok(())
    }

    async fn delete_by_icao(&self, icao: &str) -> Result<()> {
        self.records
            .write()
            .await
            .by_icao
            .remove(icao)
            .map(|_| ())
            .ok_or_else(|| Error::airport_not_found(icao))
    }
}
