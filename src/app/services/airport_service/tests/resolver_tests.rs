//! Tests for the three-tier airport resolver

use super::*;
use crate::Error;
use crate::app::models::{Airport, AirportQuery, SyncStatus};
use crate::app::services::airport_repository::AirportRepository;
use crate::app::services::cache_store::CacheStore;
use crate::app::services::test_support::{FailingCache, complete_airport};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_unknown_key_is_fetched_stored_and_cached() {
    let harness = create_harness(
        InMemoryAirportRepository::new(),
        FakeSource::new().with_airports("AAA", vec![complete_airport("AAA")]),
    );
    let cancel = CancellationToken::new();
    let query = AirportQuery::by_icao("AAA");

    let result = harness.service.search_airport(&query, &cancel).await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].icao, "AAA");
    assert_eq!(result[0].status, SyncStatus::Done);
    assert_eq!(result[0].id, 1);
    assert_eq!(harness.source.airport_calls(), 1);

    let stored = harness.repository.get_by_icao("AAA").await.unwrap().unwrap();
    assert_eq!(stored.status, SyncStatus::Done);
    assert!(harness.cache.get(&query.cache_key()).await.unwrap().is_some());
}

#[tokio::test]
async fn test_cache_hit_skips_store_and_source() {
    let harness = create_harness(
        InMemoryAirportRepository::new(),
        FakeSource::new().with_airports("AAA", vec![complete_airport("AAA")]),
    );
    let cancel = CancellationToken::new();
    let query = AirportQuery::by_icao("AAA");

    let first = harness.service.search_airport(&query, &cancel).await.unwrap();
    let searches = harness.repository.search_calls();
    let second = harness.service.search_airport(&query, &cancel).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.repository.search_calls(), searches);
    assert_eq!(harness.source.airport_calls(), 1);
}

#[tokio::test]
async fn test_cold_cache_after_write_through_hits_store() {
    let harness = create_harness(
        InMemoryAirportRepository::new(),
        FakeSource::new().with_airports("AAA", vec![complete_airport("AAA")]),
    );
    let cancel = CancellationToken::new();

    harness
        .service
        .search_airport(&AirportQuery::by_icao("AAA"), &cancel)
        .await
        .unwrap();

    // Different paging means a different cache key, so the cache is cold
    let cold = AirportQuery::new("AAA", "", 5, 0);
    let result = harness.service.search_airport(&cold, &cancel).await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].status, SyncStatus::Done);
    assert_eq!(harness.source.airport_calls(), 1);
}

#[tokio::test]
async fn test_broad_query_never_reaches_source() {
    let harness = create_harness(InMemoryAirportRepository::new(), FakeSource::new());
    let query = AirportQuery::new("", "nothing matches", 10, 0);

    let result = harness
        .service
        .search_airport(&query, &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(harness.source.airport_calls(), 0);
    // Empty broad results are still cached
    let cached = harness.cache.get(&query.cache_key()).await.unwrap();
    assert_eq!(cached.as_deref(), Some(b"[]".as_slice()));
}

#[tokio::test]
async fn test_local_rows_are_returned_and_cached() {
    let store = InMemoryAirportRepository::with_airports([complete_airport("KAVL")]);
    let harness = create_harness(store, FakeSource::new());
    let query = AirportQuery::by_icao("KAVL");

    let result = harness
        .service
        .search_airport(&query, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(harness.source.airport_calls(), 0);
    assert!(harness.cache.time_to_live(&query.cache_key()).unwrap() > Duration::from_secs(3600));
}

#[tokio::test]
async fn test_source_without_data_yields_empty_uncached_result() {
    let harness = create_harness(
        InMemoryAirportRepository::new(),
        FakeSource::new().with_airports("ZZZZ", Vec::new()),
    );
    let query = AirportQuery::by_icao("ZZZZ");

    let result = harness
        .service
        .search_airport(&query, &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.is_empty());
    assert!(harness.cache.is_empty());
    assert!(harness.repository.inner.is_empty().await);
}

#[tokio::test]
async fn test_first_candidate_wins_and_takes_queried_key() {
    let first = Airport {
        facility_name: Some("FIRST".to_string()),
        ..Airport::new("aaa")
    };
    let second = Airport {
        facility_name: Some("SECOND".to_string()),
        ..Airport::new("AAA")
    };
    let harness = create_harness(
        InMemoryAirportRepository::new(),
        FakeSource::new().with_airports("AAA", vec![first, second]),
    );

    let result = harness
        .service
        .search_airport(&AirportQuery::by_icao("AAA"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result[0].icao, "AAA");
    assert_eq!(result[0].facility_name.as_deref(), Some("FIRST"));
}

#[tokio::test]
async fn test_source_failure_propagates() {
    let harness = create_harness(
        InMemoryAirportRepository::new(),
        FakeSource::new().failing_all_airports(),
    );

    let result = harness
        .service
        .search_airport(&AirportQuery::by_icao("AAA"), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(Error::ExternalSource { .. })));
    assert!(harness.cache.is_empty());
}

#[tokio::test]
async fn test_failing_cache_does_not_fail_lookup() {
    let repository = Arc::new(FlakyRepository::new(
        InMemoryAirportRepository::with_airports([complete_airport("KAVL")]),
    ));
    let cache = Arc::new(FailingCache::default());
    let service = AirportService::new(repository.clone(), cache.clone(), Arc::new(FakeSource::new()));

    let result = service
        .search_airport(&AirportQuery::by_icao("KAVL"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(cache.writes.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_search_fails_before_any_tier() {
    let harness = create_harness(InMemoryAirportRepository::new(), FakeSource::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = harness
        .service
        .search_airport(&AirportQuery::by_icao("AAA"), &cancel)
        .await;

    assert!(matches!(result, Err(Error::Cancelled { .. })));
    assert_eq!(harness.repository.search_calls(), 0);
    assert_eq!(harness.source.airport_calls(), 0);
}

#[tokio::test]
async fn test_stored_key_outside_page_is_empty_without_source_call() {
    let store = InMemoryAirportRepository::with_airports([complete_airport("KAVL")]);
    let harness = create_harness(
        store,
        FakeSource::new().with_airports("KAVL", vec![complete_airport("KAVL")]),
    );
    let cancel = CancellationToken::new();

    let second_page = AirportQuery::new("KAVL", "", 10, 10);
    let result = harness.service.search_airport(&second_page, &cancel).await.unwrap();
    assert!(result.is_empty());

    let other_name = AirportQuery::new("KAVL", "no such field", 10, 0);
    let result = harness.service.search_airport(&other_name, &cancel).await.unwrap();
    assert!(result.is_empty());

    assert_eq!(harness.source.airport_calls(), 0);
    assert_eq!(harness.repository.inner.len().await, 1);
}
