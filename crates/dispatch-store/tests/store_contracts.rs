//! Trait contract tests for DeliveryStore.
//!
//! These tests verify the behavioral contract of the store trait against
//! both the in-memory fake and the JSON file backend. Any conforming
//! implementation must pass these.

use dispatch_store::fakes::MemoryStore;
use dispatch_store::{Delivery, DeliveryStore, JsonFileStore, PriorityLabel, StoreError};

fn delivery(id: &str, agent: &str) -> Delivery {
    Delivery {
        delivery_id: id.to_string(),
        item: format!("Package {id}"),
        location: "Salt Lake".to_string(),
        lat: 22.57,
        lon: 88.36,
        assigned_agent: agent.to_string(),
        priority_label: PriorityLabel::Medium,
        urgency_score: 5,
        reason: "seed".to_string(),
    }
}

// ===========================================================================
// MemoryStore contract
// ===========================================================================

#[tokio::test]
async fn memory_load_empty_when_unsaved() {
    let store = MemoryStore::new();
    assert!(store.load().await.unwrap().is_empty());
    assert_eq!(store.version().await.unwrap(), 0);
}

#[tokio::test]
async fn memory_save_replaces_whole_set() {
    let store = MemoryStore::new();
    store.save(&[delivery("D1", "Ravi")]).await.unwrap();
    store
        .save(&[delivery("D2", "Amit"), delivery("D3", "Suman")])
        .await
        .unwrap();

    let set = store.load().await.unwrap();
    let ids: Vec<&str> = set.iter().map(|d| d.delivery_id.as_str()).collect();
    assert_eq!(ids, vec!["D2", "D3"]);
}

#[tokio::test]
async fn memory_versioned_save_detects_conflict() {
    let store = MemoryStore::new();
    let v1 = store.save(&[delivery("D1", "Ravi")]).await.unwrap();

    // Writer A saves on top of v1; writer B's stale save must fail.
    let v2 = store
        .save_versioned(&[delivery("D1", "Amit")], v1)
        .await
        .unwrap();
    assert_eq!(v2, v1 + 1);

    let err = store
        .save_versioned(&[delivery("D1", "Suman")], v1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionConflict { expected, actual } if expected == v1 && actual == v2
    ));
}

// ===========================================================================
// JsonFileStore contract
// ===========================================================================

#[tokio::test]
async fn file_load_empty_when_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("deliveries.json"));
    assert!(store.load().await.unwrap().is_empty());
    assert_eq!(store.version().await.unwrap(), 0);
}

#[tokio::test]
async fn file_save_load_round_trip_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("deliveries.json"));

    let set = vec![
        delivery("D3", "Suman"),
        delivery("D1", "Ravi"),
        delivery("D2", "Amit"),
    ];
    let version = store.save(&set).await.unwrap();
    assert_eq!(version, 1);

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, set);
}

#[tokio::test]
async fn file_version_increments_per_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("deliveries.json"));

    assert_eq!(store.save(&[delivery("D1", "Ravi")]).await.unwrap(), 1);
    assert_eq!(store.save(&[delivery("D1", "Amit")]).await.unwrap(), 2);
    assert_eq!(store.version().await.unwrap(), 2);
}

#[tokio::test]
async fn file_loads_legacy_bare_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deliveries.json");

    let legacy = serde_json::to_vec_pretty(&vec![delivery("D1", "Ravi")]).unwrap();
    std::fs::write(&path, legacy).unwrap();

    let store = JsonFileStore::new(&path);
    let set = store.load().await.unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].delivery_id, "D1");
    // Legacy files carry no version counter.
    assert_eq!(store.version().await.unwrap(), 0);
}

#[tokio::test]
async fn file_versioned_save_detects_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("deliveries.json"));

    let v1 = store.save(&[delivery("D1", "Ravi")]).await.unwrap();
    store
        .save_versioned(&[delivery("D1", "Amit")], v1)
        .await
        .unwrap();

    let err = store
        .save_versioned(&[delivery("D1", "Suman")], v1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::VersionConflict { .. }));
}
