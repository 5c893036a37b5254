//! Data models for aviation sync
//!
//! This module contains the core data structures for representing airport
//! records, their reconciliation status and the query parameters used by the
//! cache-aside read path.

pub mod weather;

pub use weather::{AirportWeather, Weather, WeatherCondition, WeatherReport};

use crate::constants::{cache_keys, status};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Reconciliation Status
// =============================================================================

/// Reconciliation state of an airport record
///
/// Only the synchronization engine moves records between these states in
/// bulk. Direct inserts derive the status from attribute completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncStatus {
    /// Attributes incomplete, awaiting reconciliation
    #[default]
    Pending,
    /// Attributes replaced with authoritative data
    Done,
    /// Authoritative source had no data for this record
    Failed,
}

impl SyncStatus {
    /// Persisted string form of the status
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Pending => status::PENDING,
            SyncStatus::Done => status::DONE,
            SyncStatus::Failed => status::FAILED,
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            status::PENDING => Ok(SyncStatus::Pending),
            status::DONE => Ok(SyncStatus::Done),
            status::FAILED => Ok(SyncStatus::Failed),
            other => Err(Error::validation(format!(
                "Unknown sync status '{}': expected PENDING, DONE or FAILED",
                other
            ))),
        }
    }
}

// =============================================================================
// Airport Record
// =============================================================================

/// Airport record keyed by its ICAO identifier
///
/// Field names follow the external airport API, which is also the JSON shape
/// stored in the cache. `id` is a surrogate assigned by the record store;
/// `icao` is the natural key and never changes once stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Airport {
    /// Surrogate identifier assigned by the record store
    #[serde(default)]
    pub id: i64,

    /// Facility type (e.g. "AIRPORT", "HELIPORT")
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<String>,

    /// Official facility name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_name: Option<String>,

    /// FAA location identifier
    #[serde(rename = "faa_ident", skip_serializing_if = "Option::is_none")]
    pub faa: Option<String>,

    /// ICAO identifier - natural key
    #[serde(rename = "icao_ident", default)]
    pub icao: String,

    /// FAA region code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Full state name
    #[serde(rename = "state_full", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,

    /// City served; the join key for weather enrichment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Ownership class ("PU" public, "PR" private)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership: Option<String>,

    /// Use class ("PU" public, "PR" private)
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub facility_use: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_phone: Option<String>,

    /// Latitude in DD-MM-SS.sssN/S form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,

    /// Longitude in DDD-MM-SS.sssE/W form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,

    /// Reconciliation status
    #[serde(default)]
    pub status: SyncStatus,
}

impl Airport {
    /// Create a bare record holding only its natural key
    pub fn new(icao: impl Into<String>) -> Self {
        Self {
            icao: icao.into(),
            ..Default::default()
        }
    }

    /// Return the record with a different status
    pub fn with_status(mut self, status: SyncStatus) -> Self {
        self.status = status;
        self
    }

    /// Descriptive attributes in declaration order, paired with their names
    pub fn attributes(&self) -> [(&'static str, Option<&str>); 13] {
        [
            ("type", self.facility_type.as_deref()),
            ("facility_name", self.facility_name.as_deref()),
            ("faa", self.faa.as_deref()),
            ("region", self.region.as_deref()),
            ("state", self.state.as_deref()),
            ("county", self.county.as_deref()),
            ("city", self.city.as_deref()),
            ("ownership", self.ownership.as_deref()),
            ("use", self.facility_use.as_deref()),
            ("manager", self.manager.as_deref()),
            ("manager_phone", self.manager_phone.as_deref()),
            ("latitude", self.latitude.as_deref()),
            ("longitude", self.longitude.as_deref()),
        ]
    }

    /// City to join weather on, if present and non-blank
    pub fn weather_city(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Replace every attribute with the authoritative record, keeping identity
    ///
    /// The surrogate id and natural key of `self` survive; everything else,
    /// status included, comes from `authoritative`.
    pub fn replace_attributes(&mut self, authoritative: Airport) {
        let id = self.id;
        let icao = std::mem::take(&mut self.icao);
        *self = Airport {
            id,
            icao,
            ..authoritative
        };
    }
}

/// External airport API response: ICAO code to matching records
pub type AirportDataResponse = HashMap<String, Vec<Airport>>;

// =============================================================================
// Query Parameters
// =============================================================================

/// Convert 1-based paging into `(limit, offset)`
///
/// Page and page size below one fall back to the defaults. The offset
/// saturates, so an absurd page lands past the end instead of overflowing.
pub fn page_window(page: usize, page_size: usize) -> (usize, usize) {
    let page = if page < 1 {
        crate::constants::DEFAULT_PAGE
    } else {
        page
    };
    let page_size = if page_size < 1 {
        crate::constants::DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    (page_size, (page - 1).saturating_mul(page_size))
}

/// Search parameters for the airport read path
///
/// An empty `icao` makes the query broad: it lists airports rather than
/// identifying one, and is never forwarded to the external source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AirportQuery {
    /// Exact ICAO identifier, empty for listing queries
    pub icao: String,
    /// Case-insensitive facility name fragment, empty to match any
    pub facility_name: String,
    pub limit: usize,
    pub offset: usize,
}

impl AirportQuery {
    /// Create a query from raw parameters
    pub fn new(
        icao: impl Into<String>,
        facility_name: impl Into<String>,
        limit: usize,
        offset: usize,
    ) -> Self {
        Self {
            icao: icao.into().trim().to_string(),
            facility_name: facility_name.into().trim().to_string(),
            limit,
            offset,
        }
    }

    /// Create a query identifying a single airport
    pub fn by_icao(icao: impl Into<String>) -> Self {
        Self::new(icao, "", 1, 0)
    }

    /// Create a query from 1-based page numbering
    ///
    /// Page and page size below one fall back to the first page and the
    /// default page size.
    pub fn paged(
        icao: impl Into<String>,
        facility_name: impl Into<String>,
        page: usize,
        page_size: usize,
    ) -> Self {
        let (limit, offset) = page_window(page, page_size);
        Self::new(icao, facility_name, limit, offset)
    }

    /// Whether the query lacks an identifying key
    pub fn is_broad(&self) -> bool {
        self.icao.is_empty()
    }

    /// Cache key built from every parameter in a fixed order
    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            cache_keys::AIRPORT_PREFIX,
            self.icao,
            self.facility_name,
            self.limit,
            self.offset
        )
    }

    /// Check whether an airport satisfies the query filters (ignores paging)
    pub fn matches(&self, airport: &Airport) -> bool {
        if !self.icao.is_empty() && airport.icao != self.icao {
            return false;
        }
        if self.facility_name.is_empty() {
            return true;
        }
        let pattern = self.facility_name.to_lowercase();
        airport
            .facility_name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(&pattern))
    }
}
