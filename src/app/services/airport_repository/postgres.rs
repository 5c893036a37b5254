//! PostgreSQL record store backed by an sqlx connection pool

use super::AirportRepository;
use crate::app::models::{Airport, AirportQuery, SyncStatus};
use crate::constants::DB_ACQUIRE_TIMEOUT_SECS;
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use std::time::Duration;
use tracing::{debug, info};

const SELECT_COLUMNS: &str = "id, icao, facility_type, facility_name, faa, region, state, \
     county, city, ownership, facility_use, manager, manager_phone, latitude, longitude, status";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS airports (
    id            BIGSERIAL PRIMARY KEY,
    icao          TEXT NOT NULL UNIQUE,
    facility_type TEXT,
    facility_name TEXT,
    faa           TEXT,
    region        TEXT,
    state         TEXT,
    county        TEXT,
    city          TEXT,
    ownership     TEXT,
    facility_use  TEXT,
    manager       TEXT,
    manager_phone TEXT,
    latitude      TEXT,
    longitude     TEXT,
    status        TEXT NOT NULL DEFAULT 'PENDING'
)
"#;

const CREATE_STATUS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_airports_status ON airports (status)";

/// Airport store persisted in PostgreSQL
#[derive(Debug, Clone)]
pub struct PgAirportRepository {
    pool: PgPool,
}

impl PgAirportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url` and verify it with a round trip
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(DB_ACQUIRE_TIMEOUT_SECS))
            .connect(database_url)
            .await
            .map_err(|e| Error::database("Failed to connect to PostgreSQL", e))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| Error::database("PostgreSQL connection check failed", e))?;

        debug!("Connected to PostgreSQL (max {} connections)", max_connections);
        Ok(Self::new(pool))
    }

    /// Create the airports table and its indexes when missing
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database("Failed to create airports table", e))?;
        sqlx::query(CREATE_STATUS_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database("Failed to create status index", e))?;

        info!("Airport schema is up to date");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn airport_from_row(row: &PgRow) -> Result<Airport> {
    let status: String = row.try_get("status")?;
    Ok(Airport {
        id: row.try_get("id")?,
        icao: row.try_get("icao")?,
        facility_type: row.try_get("facility_type")?,
        facility_name: row.try_get("facility_name")?,
        faa: row.try_get("faa")?,
        region: row.try_get("region")?,
        state: row.try_get("state")?,
        county: row.try_get("county")?,
        city: row.try_get("city")?,
        ownership: row.try_get("ownership")?,
        facility_use: row.try_get("facility_use")?,
        manager: row.try_get("manager")?,
        manager_phone: row.try_get("manager_phone")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        status: status.parse()?,
    })
}

fn airports_from_rows(rows: &[PgRow]) -> Result<Vec<Airport>> {
    rows.iter().map(airport_from_row).collect()
}

/// Postgres treats a NULL limit as unbounded
fn sql_limit(limit: usize) -> Option<i64> {
    (limit > 0).then(|| i64::try_from(limit).unwrap_or(i64::MAX))
}

fn sql_offset(offset: usize) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

#[async_trait]
impl AirportRepository for PgAirportRepository {
    async fn scan(&self, status: SyncStatus) -> Result<Vec<Airport>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM airports WHERE status = $1 ORDER BY id",
            SELECT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database(format!("Failed to scan {} airports", status), e))?;

        airports_from_rows(&rows)
    }

    async fn get_by_icao(&self, icao: &str) -> Result<Option<Airport>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM airports WHERE icao = $1",
            SELECT_COLUMNS
        ))
        .bind(icao)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::database(format!("Failed to load airport {}", icao), e))?;

        row.as_ref().map(airport_from_row).transpose()
    }

    async fn get_all(&self, limit: usize, offset: usize) -> Result<Vec<Airport>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM airports ORDER BY id LIMIT $1 OFFSET $2",
            SELECT_COLUMNS
        ))
        .bind(sql_limit(limit))
        .bind(sql_offset(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database("Failed to list airports", e))?;

        airports_from_rows(&rows)
    }

    async fn search(&self, query: &AirportQuery) -> Result<Vec<Airport>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM airports \
             WHERE ($1 = '' OR icao = $1) \
               AND ($2 = '' OR facility_name ILIKE '%' || $2 || '%') \
             ORDER BY id LIMIT $3 OFFSET $4",
            SELECT_COLUMNS
        ))
        .bind(&query.icao)
        .bind(&query.facility_name)
        .bind(sql_limit(query.limit))
        .bind(sql_offset(query.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database("Failed to search airports", e))?;

        airports_from_rows(&rows)
    }

    async fn insert(&self, airport: Airport) -> Result<Airport> {
        let row = sqlx::query(&format!(
            "INSERT INTO airports (icao, facility_type, facility_name, faa, region, state, \
             county, city, ownership, facility_use, manager, manager_phone, latitude, \
             longitude, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(&airport.icao)
        .bind(&airport.facility_type)
        .bind(&airport.facility_name)
        .bind(&airport.faa)
        .bind(&airport.region)
        .bind(&airport.state)
        .bind(&airport.county)
        .bind(&airport.city)
        .bind(&airport.ownership)
        .bind(&airport.facility_use)
        .bind(&airport.manager)
        .bind(&airport.manager_phone)
        .bind(&airport.latitude)
        .bind(&airport.longitude)
        .bind(airport.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::database(format!("Failed to insert airport {}", airport.icao), e))?;

        airport_from_row(&row)
    }

    async fn update_by_icao(&self, airport: Airport) -> Result<Airport> {
        let row = sqlx::query(&format!(
            "UPDATE airports SET facility_type = $2, facility_name = $3, faa = $4, \
             region = $5, state = $6, county = $7, city = $8, ownership = $9, \
             facility_use = $10, manager = $11, manager_phone = $12, latitude = $13, \
             longitude = $14, status = $15 \
             WHERE icao = $1 RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(&airport.icao)
        .bind(&airport.facility_type)
        .bind(&airport.facility_name)
        .bind(&airport.faa)
        .bind(&airport.region)
        .bind(&airport.state)
        .bind(&airport.county)
        .bind(&airport.city)
        .bind(&airport.ownership)
        .bind(&airport.facility_use)
        .bind(&airport.manager)
        .bind(&airport.manager_phone)
        .bind(&airport.latitude)
        .bind(&airport.longitude)
        .bind(airport.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::database(format!("Failed to update airport {}", airport.icao), e))?;

        match row {
            Some(row) => airport_from_row(&row),
            None => Err(Error::airport_not_found(airport.icao)),
        }
    }

    async fn batch_upsert(&self, airports: &[Airport]) -> Result<()> {
        if airports.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO airports (icao, facility_type, facility_name, faa, region, state, \
             county, city, ownership, facility_use, manager, manager_phone, latitude, \
             longitude, status) ",
        );
        builder.push_values(airports, |mut row, airport| {
            row.push_bind(airport.icao.clone())
                .push_bind(airport.facility_type.clone())
                .push_bind(airport.facility_name.clone())
                .push_bind(airport.faa.clone())
                .push_bind(airport.region.clone())
                .push_bind(airport.state.clone())
                .push_bind(airport.county.clone())
                .push_bind(airport.city.clone())
                .push_bind(airport.ownership.clone())
                .push_bind(airport.facility_use.clone())
                .push_bind(airport.manager.clone())
                .push_bind(airport.manager_phone.clone())
                .push_bind(airport.latitude.clone())
                .push_bind(airport.longitude.clone())
                .push_bind(airport.status.as_str());
        });
        builder.push(
            " ON CONFLICT (icao) DO UPDATE SET \
             facility_type = EXCLUDED.facility_type, \
             facility_name = EXCLUDED.facility_name, \
             faa = EXCLUDED.faa, \
             region = EXCLUDED.region, \
             state = EXCLUDED.state, \
             county = EXCLUDED.county, \
             city = EXCLUDED.city, \
             ownership = EXCLUDED.ownership, \
             facility_use = EXCLUDED.facility_use, \
             manager = EXCLUDED.manager, \
             manager_phone = EXCLUDED.manager_phone, \
             latitude = EXCLUDED.latitude, \
             longitude = EXCLUDED.longitude, \
             status = EXCLUDED.status",
        );

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::database(format!("Failed to upsert {} airports", airports.len()), e)
            })?;
        Ok(())
    }

    async fn delete_by_icao(&self, icao: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM airports WHERE icao = $1")
            .bind(icao)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database(format!("Failed to delete airport {}", icao), e))?;

        if result.rows_affected() == 0 {
            return Err(Error::airport_not_found(icao));
        }
        Ok(())
    }
}
