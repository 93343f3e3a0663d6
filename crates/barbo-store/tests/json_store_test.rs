//! Metadata store over the JSON file backend, reopened between steps.

use std::sync::Arc;

use barbo_core::defaults::{KEY_BOOKMARK_METADATA, KEY_DISMISSED_GROUPS, KEY_SETTINGS};
use barbo_core::{KeyValueBackend, Settings, Theme};
use barbo_store::{JsonFileBackend, MetadataStore};
use serde_json::Value;
use tempfile::TempDir;

fn open(path: &std::path::Path) -> MetadataStore {
    MetadataStore::new(Arc::new(JsonFileBackend::new(path)))
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");

    {
        let store = open(&path);
        store.add_tags("10", &["rust", "docs"]).await.unwrap();
        store.record_access("10").await.unwrap();
        store.dismiss_group(&["3", "1"]).await.unwrap();
        store
            .save_settings(&Settings {
                theme: Theme::Dark,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let store = open(&path);
    let meta = store.metadata("10").await.unwrap();
    assert_eq!(meta.tags, vec!["rust", "docs"]);
    assert_eq!(meta.access_count, 1);
    assert!(store.is_group_dismissed(&["1", "3"]).await.unwrap());
    assert_eq!(store.settings().await.unwrap().theme, Theme::Dark);
}

#[tokio::test]
async fn test_document_uses_three_top_level_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");

    let store = open(&path);
    store.add_tags("1", &["a"]).await.unwrap();
    store.dismiss_group(&["1", "2"]).await.unwrap();
    store.save_settings(&Settings::default()).await.unwrap();

    let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let keys: Vec<&str> = raw.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 3);
    for key in [KEY_BOOKMARK_METADATA, KEY_DISMISSED_GROUPS, KEY_SETTINGS] {
        assert!(keys.contains(&key), "missing {key}");
    }

    assert_eq!(raw["bookmarkMetadata"]["1"]["tags"][0], "a");
    assert_eq!(raw["bookmarkMetadata"]["1"]["archived"], false);
    assert_eq!(raw["dismissedSimilarGroups"][0], "1,2");
    assert_eq!(raw["settings"]["reviewInterval"], 180);
}

#[tokio::test]
async fn test_loads_document_written_by_browser_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(
        &path,
        r#"{
            "bookmarkMetadata": {
                "abc": {
                    "tags": ["news"],
                    "lastAccessed": null,
                    "accessCount": 0,
                    "dateAdded": 1600000000000,
                    "lastReviewed": null,
                    "reviewCount": 0,
                    "archived": false,
                    "archivedDate": null,
                    "originalParentId": null
                }
            },
            "settings": { "oldBookmarkThreshold": 30, "theme": "auto" }
        }"#,
    )
    .unwrap();

    let store = open(&path);
    assert_eq!(store.all_tags().await.unwrap(), vec!["news"]);
    let settings = store.settings().await.unwrap();
    assert_eq!(settings.old_bookmark_threshold, 30);
    assert_eq!(settings.theme, Theme::Auto);
    assert!(store.dismissed_groups().await.unwrap().is_empty());

    let backend = JsonFileBackend::new(&path);
    assert!(backend.get(KEY_DISMISSED_GROUPS).await.unwrap().is_none());
}
