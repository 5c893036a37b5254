//! Airport record store
//!
//! The record store is the system of record for airports. Everything above it
//! (resolver, synchronization engine, CRUD) goes through [`AirportRepository`]
//! so the in-memory and PostgreSQL backends are interchangeable.
//!
//! Records are addressed by their natural key (ICAO identifier) on every
//! mutating path. The surrogate `id` is assigned by the backend on insert and
//! only used for stable ordering of listings.

use crate::app::models::{Airport, AirportQuery, SyncStatus};
use crate::Result;
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

#[cfg(test)]
pub mod tests;

pub use memory::InMemoryAirportRepository;
pub use postgres::PgAirportRepository;

/// Persistence operations over airport records
#[async_trait]
pub trait AirportRepository: Send + Sync {
    /// All records currently in `status`, ordered by id
    async fn scan(&self, status: SyncStatus) -> Result<Vec<Airport>>;

    /// Point lookup by natural key
    async fn get_by_icao(&self, icao: &str) -> Result<Option<Airport>>;

    /// One page of all records ordered by id; `limit == 0` means unbounded
    async fn get_all(&self, limit: usize, offset: usize) -> Result<Vec<Airport>>;

    /// Filtered page of records
    ///
    /// `icao` matches exactly, `facility_name` as a case-insensitive
    /// substring; empty filters match everything.
    async fn search(&self, query: &AirportQuery) -> Result<Vec<Airport>>;

    /// Insert a new record, returning it with its assigned id
    async fn insert(&self, airport: Airport) -> Result<Airport>;

    /// Replace every attribute of the record with the same natural key
    ///
    /// Fails with `Error::AirportNotFound` when no such record exists.
    async fn update_by_icao(&self, airport: Airport) -> Result<Airport>;

    /// Insert or replace each record by natural key as one unit of work
    async fn batch_upsert(&self, airports: &[Airport]) -> Result<()>;

    /// Delete by natural key, `Error::AirportNotFound` when nothing was removed
    async fn delete_by_icao(&self, icao: &str) -> Result<()>;
}
