//! Shared fixtures for record store tests

use crate::app::models::{Airport, SyncStatus};

pub mod memory_tests;

/// Create a named airport in the given status
pub fn create_test_airport(icao: &str, name: &str, status: SyncStatus) -> Airport {
    Airport {
        facility_name: Some(name.to_string()),
        ..Airport::new(icao)
    }
    .with_status(status)
}
