//! Airport attribute validation
//!
//! Completeness decides the initial status of directly created records;
//! format validation guards the create and update paths.

use crate::app::models::Airport;
use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static LATITUDE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}-\d{2}-\d{2}(\.\d+)?[NS]$").expect("latitude pattern is valid")
});

static LONGITUDE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{3}-\d{2}-\d{2}(\.\d+)?[EW]$").expect("longitude pattern is valid")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9\-\(\)\s]{7,20}$").expect("phone pattern is valid")
});

const OWNERSHIP_CODES: [&str; 2] = ["PU", "PR"];

/// Whether every descriptive attribute and the natural key are present and non-blank
pub fn is_complete(airport: &Airport) -> bool {
    !airport.icao.trim().is_empty()
        && airport
            .attributes()
            .iter()
            .all(|(_, value)| value.is_some_and(|v| !v.trim().is_empty()))
}

/// Validate attribute formats, reporting the first failure found
///
/// Absent or empty optional attributes are accepted; only values that are
/// present must match their format.
pub fn validate(airport: &Airport) -> Result<()> {
    if airport.icao.trim().is_empty() {
        return Err(Error::validation("ICAO is required"));
    }

    if let Some(ownership) = present(&airport.ownership) {
        if !OWNERSHIP_CODES.contains(&ownership) {
            return Err(Error::validation("Ownership must be PU or PR"));
        }
    }

    if let Some(facility_use) = present(&airport.facility_use) {
        if !OWNERSHIP_CODES.contains(&facility_use) {
            return Err(Error::validation("Use must be PU or PR"));
        }
    }

    if let Some(latitude) = present(&airport.latitude) {
        if !LATITUDE_PATTERN.is_match(latitude) {
            return Err(Error::validation(
                "Invalid latitude format (expected DD-MM-SS.sssN/S)",
            ));
        }
    }

    if let Some(longitude) = present(&airport.longitude) {
        if !LONGITUDE_PATTERN.is_match(longitude) {
            return Err(Error::validation(
                "Invalid longitude format (expected DDD-MM-SS.sssE/W)",
            ));
        }
    }

    if let Some(phone) = present(&airport.manager_phone) {
        if !PHONE_PATTERN.is_match(phone) {
            return Err(Error::validation("Invalid manager phone format"));
        }
    }

    Ok(())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
