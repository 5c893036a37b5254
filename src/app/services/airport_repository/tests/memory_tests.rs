//! Tests for the in-memory record store

use super::*;
use crate::Error;
use crate::app::models::AirportQuery;
use crate::app::services::airport_repository::{AirportRepository, InMemoryAirportRepository};

fn create_test_repository() -> InMemoryAirportRepository {
    InMemoryAirportRepository::with_airports([
        create_test_airport("KLAX", "LOS ANGELES INTL", SyncStatus::Done),
        create_test_airport("KAVL", "ASHEVILLE RGNL", SyncStatus::Pending),
        create_test_airport("KSFO", "SAN FRANCISCO INTL", SyncStatus::Pending),
        create_test_airport("KJFK", "JOHN F KENNEDY INTL", SyncStatus::Failed),
    ])
}

#[tokio::test]
async fn test_scan_returns_status_in_id_order() {
    let repo = create_test_repository();

    let pending = repo.scan(SyncStatus::Pending).await.unwrap();
    let icaos: Vec<_> = pending.iter().map(|a| a.icao.as_str()).collect();
    assert_eq!(icaos, vec!["KAVL", "KSFO"]);

    assert_eq!(repo.scan(SyncStatus::Failed).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_by_icao() {
    let repo = create_test_repository();

    let airport = repo.get_by_icao("KLAX").await.unwrap().unwrap();
    assert_eq!(airport.id, 1);
    assert!(repo.get_by_icao("EGLL").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_all_pages() {
    let repo = create_test_repository();

    let page = repo.get_all(2, 1).await.unwrap();
    let icaos: Vec<_> = page.iter().map(|a| a.icao.as_str()).collect();
    assert_eq!(icaos, vec!["KAVL", "KSFO"]);

    assert_eq!(repo.get_all(0, 0).await.unwrap().len(), 4);
    assert!(repo.get_all(10, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_filters_by_icao_and_name() {
    let repo = create_test_repository();

    let by_icao = repo.search(&AirportQuery::by_icao("KSFO")).await.unwrap();
    assert_eq!(by_icao.len(), 1);
    assert_eq!(by_icao[0].icao, "KSFO");

    let by_name = repo
        .search(&AirportQuery::new("", "intl", 10, 0))
        .await
        .unwrap();
    assert_eq!(by_name.len(), 3);

    let none = repo
        .search(&AirportQuery::new("KLAX", "asheville", 10, 0))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_insert_assigns_id_and_rejects_duplicates() {
    let repo = create_test_repository();

    let inserted = repo
        .insert(create_test_airport("EGLL", "HEATHROW", SyncStatus::Done))
        .await
        .unwrap();
    assert_eq!(inserted.id, 5);

    let duplicate = repo
        .insert(create_test_airport("EGLL", "HEATHROW", SyncStatus::Done))
        .await;
    assert!(matches!(duplicate, Err(Error::RecordStore { .. })));
}

#[tokio::test]
async fn test_update_by_icao_keeps_id() {
    let repo = create_test_repository();

    let updated = repo
        .update_by_icao(create_test_airport("KAVL", "ASHEVILLE", SyncStatus::Done))
        .await
        .unwrap();
    assert_eq!(updated.id, 2);

    let stored = repo.get_by_icao("KAVL").await.unwrap().unwrap();
    assert_eq!(stored.facility_name.as_deref(), Some("ASHEVILLE"));
    assert_eq!(stored.status, SyncStatus::Done);

    let missing = repo
        .update_by_icao(create_test_airport("EGLL", "HEATHROW", SyncStatus::Done))
        .await;
    assert!(matches!(missing, Err(Error::AirportNotFound { .. })));
}

#[tokio::test]
async fn test_batch_upsert_inserts_and_replaces() {
    let repo = create_test_repository();

    repo.batch_upsert(&[
        create_test_airport("KAVL", "ASHEVILLE RGNL", SyncStatus::Done),
        create_test_airport("EGLL", "HEATHROW", SyncStatus::Done),
    ])
    .await
    .unwrap();

    assert_eq!(repo.len().await, 5);
    let kavl = repo.get_by_icao("KAVL").await.unwrap().unwrap();
    assert_eq!(kavl.id, 2);
    assert_eq!(kavl.status, SyncStatus::Done);
    assert!(repo.get_by_icao("EGLL").await.unwrap().is_some());
    assert_eq!(repo.scan(SyncStatus::Pending).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_by_icao() {
    let repo = create_test_repository();

    repo.delete_by_icao("KJFK").await.unwrap();
    assert_eq!(repo.len().await, 3);

    let again = repo.delete_by_icao("KJFK").await;
    assert!(matches!(again, Err(Error::AirportNotFound { icao }) if icao == "KJFK"));
}
