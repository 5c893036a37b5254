//! Shared fixtures for airport service tests

use crate::app::services::airport_repository::InMemoryAirportRepository;
use crate::app::services::airport_service::AirportService;
use crate::app::services::cache_store::InMemoryCache;
use crate::app::services::test_support::{FakeSource, FlakyRepository};
use std::sync::Arc;

pub mod resolver_tests;

/// Service wired to inspectable fakes
pub struct Harness {
    pub service: AirportService,
    pub repository: Arc<FlakyRepository>,
    pub cache: Arc<InMemoryCache>,
    pub source: Arc<FakeSource>,
}

pub fn create_harness(store: InMemoryAirportRepository, source: FakeSource) -> Harness {
    let repository = Arc::new(FlakyRepository::new(store));
    let cache = Arc::new(InMemoryCache::new());
    let source = Arc::new(source);
    let service = AirportService::new(repository.clone(), cache.clone(), source.clone());

    Harness {
        service,
        repository,
        cache,
        source,
    }
}
