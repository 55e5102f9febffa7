use stockwatch_core::models::{Availability, StatusRecord};
use stockwatch_core::traits::StatusStore;
use stockwatch_store::{FileStatusStore, StoreConfig};

use crate::common::setup_test_store;

const URL: &str = "https://www.bangerhead.pl/curated-by-bangerhead-advent-calender-2025";

#[tokio::test]
async fn missing_file_is_no_record() {
    let (store, path, _dir) = setup_test_store("last_status.json");

    assert!(!path.exists());
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn save_and_load_round_trip() {
    let (store, _path, _dir) = setup_test_store("last_status.json");
    let record = StatusRecord::new(URL, Availability::OutOfStock);

    store.save(&record).await.unwrap();
    let loaded = store.load().await.unwrap().expect("Should find the record");

    assert_eq!(loaded, record);
}

#[tokio::test]
async fn save_overwrites_previous_snapshot() {
    let (store, path, _dir) = setup_test_store("last_status.json");

    store
        .save(&StatusRecord::new(URL, Availability::OutOfStock))
        .await
        .unwrap();
    store
        .save(&StatusRecord::new(URL, Availability::Unknown))
        .await
        .unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.status, Availability::Unknown);

    // Single snapshot object, not a history
    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json.is_object());
    assert_eq!(json["status"], "unknown");
    assert_eq!(json["url"], URL);
    assert!(json["checked_at"].is_string());
}

#[tokio::test]
async fn unparsable_file_is_store_error() {
    let (store, path, _dir) = setup_test_store("last_status.json");
    std::fs::write(&path, "{\"status\": \"in_sto").unwrap();

    let err = store.load().await.unwrap_err();
    assert!(err.to_string().contains("Unparsable"));
}

#[tokio::test]
async fn unknown_status_value_is_store_error() {
    let (store, path, _dir) = setup_test_store("last_status.json");
    std::fs::write(
        &path,
        r#"{"status": "maybe", "checked_at": "2025-11-30T08:00:00Z"}"#,
    )
    .unwrap();

    assert!(store.load().await.is_err());
}

#[tokio::test]
async fn creates_missing_parent_directory() {
    let (store, path, _dir) = setup_test_store("state/nested/status.json");

    store
        .save(&StatusRecord::new(URL, Availability::InStock))
        .await
        .unwrap();

    assert!(path.exists());
}

#[tokio::test]
async fn write_failure_is_store_error() {
    let dir = tempfile::tempdir().unwrap();
    // The target path is an existing directory, so the write must fail.
    let store = FileStatusStore::new(dir.path());

    let err = StatusStore::save(&store, &StatusRecord::new(URL, Availability::InStock))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to write"));
}

#[tokio::test]
async fn from_config_uses_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::from_path(dir.path().join("custom.json")).unwrap();
    let store = FileStatusStore::from_config(&config);

    assert_eq!(store.path(), config.path.as_path());
}
