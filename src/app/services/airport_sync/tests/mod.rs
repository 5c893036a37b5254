//! Shared test utilities and fixtures for synchronization tests

use crate::app::models::Airport;
use crate::app::services::test_support::complete_airport;


/// Pending airports with sequential identifiers (`P000`, `P001`, ...)
pub fn pending_airports(count: usize) -> Vec<Airport> {
    (0..count)
        .map(|i| Airport::new(format!("P{:03}", i)))
        .collect()
}

/// Authoritative record the source would return for `icao`
pub fn authoritative(icao: &str) -> Airport {
    let mut airport = complete_airport(icao);
    airport.id = 9_999;
    airport
}
