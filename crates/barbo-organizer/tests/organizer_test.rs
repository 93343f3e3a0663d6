//! Organizer services over an in-memory tree and metadata store.

use std::sync::Arc;

use barbo_core::defaults::ARCHIVE_FOLDER_NAME;
use barbo_core::{
    ArchiveState, BookmarkMetadata, BookmarkNode, BookmarkStore, ImportBundle, MetadataPatch,
    Settings,
};
use barbo_organizer::Organizer;
use barbo_store::{InMemoryBookmarkStore, JsonFileBackend, MetadataStore};
use chrono::{Duration, Utc};
use tempfile::TempDir;

fn sample_tree() -> Vec<BookmarkNode> {
    vec![BookmarkNode::folder(
        "root",
        None,
        "",
        vec![
            BookmarkNode::folder(
                "toolbar",
                Some("root"),
                "Bookmarks Toolbar",
                vec![
                    BookmarkNode::bookmark("1", "toolbar", "Rust", "https://www.rust-lang.org/"),
                    BookmarkNode::bookmark("2", "toolbar", "Rust repo", "https://github.com/rust-lang/rust"),
                ],
            ),
            BookmarkNode::folder(
                "unfiled_____",
                Some("root"),
                "Other Bookmarks",
                vec![
                    BookmarkNode::folder(
                        "recipes",
                        Some("unfiled_____"),
                        "Recipes",
                        vec![BookmarkNode::bookmark(
                            "3",
                            "recipes",
                            "Bread",
                            "https://cooking.example.net/bread",
                        )],
                    ),
                    BookmarkNode::bookmark(
                        "4",
                        "unfiled_____",
                        "Rust (newsletter)",
                        "http://rust-lang.org?utm_source=mail",
                    ),
                ],
            ),
        ],
    )]
}

fn organizer() -> (Arc<InMemoryBookmarkStore>, Organizer) {
    let tree = Arc::new(InMemoryBookmarkStore::new(sample_tree()));
    let metadata = Arc::new(MetadataStore::in_memory());
    let organizer = Organizer::new(tree.clone(), metadata, 70.0);
    (tree, organizer)
}

#[tokio::test]
async fn test_archive_round_trip_restores_parent() {
    let (tree, organizer) = organizer();
    let archive = organizer.archive();

    let outcome = archive.archive("3").await.unwrap();
    assert!(outcome.success, "{:?}", outcome.error);
    let folder_id = outcome.folder_id.clone().unwrap();

    let folder = tree.get(&folder_id).await.unwrap();
    assert_eq!(folder.title, ARCHIVE_FOLDER_NAME);
    assert_eq!(folder.parent_id.as_deref(), Some("unfiled_____"));
    assert_eq!(tree.get("3").await.unwrap().parent_id.as_deref(), Some(folder_id.as_str()));

    let meta = organizer.metadata_store().metadata("3").await.unwrap();
    assert_eq!(meta.original_parent_id(), Some("recipes"));

    let listed = archive.archived_bookmarks().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].days_since_archived, 0);

    let restored = archive.unarchive("3").await.unwrap();
    assert!(restored.success);
    assert_eq!(restored.folder_id.as_deref(), Some("recipes"));
    assert_eq!(tree.get("3").await.unwrap().parent_id.as_deref(), Some("recipes"));
    let meta = organizer.metadata_store().metadata("3").await.unwrap();
    assert_eq!(meta.archive, ArchiveState::Active);
}

#[tokio::test]
async fn test_archive_reuses_existing_folder() {
    let (_, organizer) = organizer();
    let archive = organizer.archive();

    let first = archive.archive("1").await.unwrap();
    let second = archive.archive("2").await.unwrap();
    assert_eq!(first.folder_id, second.folder_id);
}

#[tokio::test]
async fn test_archive_failures_are_outcomes() {
    let (_, organizer) = organizer();
    let archive = organizer.archive();

    let missing = archive.archive("nope").await.unwrap();
    assert!(!missing.success);
    assert!(missing.error.unwrap().contains("nope"));

    let folder = archive.archive("recipes").await.unwrap();
    assert!(!folder.success);

    assert!(archive.archive("1").await.unwrap().success);
    let again = archive.archive("1").await.unwrap();
    assert!(!again.success);
    assert!(again.error.unwrap().contains("already archived"));

    let not_archived = archive.unarchive("2").await.unwrap();
    assert!(!not_archived.success);
    assert!(not_archived.error.unwrap().starts_with("Invalid state"));
}

#[tokio::test]
async fn test_unarchive_falls_back_when_parent_gone() {
    let (tree, organizer) = organizer();
    let archive = organizer.archive();

    assert!(archive.archive("3").await.unwrap().success);
    tree.remove("recipes").await.unwrap();

    let outcome = archive.unarchive("3").await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.folder_id.as_deref(), Some("unfiled_____"));
}

#[tokio::test]
async fn test_purge_expired_respects_opt_in() {
    let (tree, organizer) = organizer();
    let store = organizer.metadata_store();
    store
        .set_metadata(
            "2",
            MetadataPatch::archive(ArchiveState::Archived {
                archived_date: Utc::now() - Duration::days(120),
                original_parent_id: Some("toolbar".into()),
            }),
        )
        .await
        .unwrap();

    let disabled = Settings {
        auto_delete_archived: false,
        ..Settings::default()
    };
    assert!(organizer.archive().purge_expired(&disabled).await.unwrap().is_empty());
    assert!(tree.get("2").await.is_ok());

    let outcomes = organizer
        .archive()
        .purge_expired(&Settings::default())
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].success);
    assert!(tree.get("2").await.is_err());
    assert!(!store.has_metadata("2").await.unwrap());
}

#[tokio::test]
async fn test_review_queue_skip_keep_and_load_more() {
    let (_, organizer) = organizer();
    let store = organizer.metadata_store();
    store
        .save_settings(&Settings {
            review_count: 2,
            ..Settings::default()
        })
        .await
        .unwrap();

    let mut queue = organizer.review().start_queue().await.unwrap();
    assert_eq!(queue.len(), 2);

    let first = queue.items()[0].id.clone();
    let second = queue.items()[1].id.clone();
    assert!(queue.skip(&first));
    assert!(!store.has_metadata(&first).await.unwrap());

    let meta = queue.keep(&second).await.unwrap();
    assert_eq!(meta.review_count, 1);
    assert!(queue.is_empty());

    // The kept bookmark is no longer due; the skipped one still is.
    let added = queue.load_more().await.unwrap();
    assert_eq!(added, 2);
    assert!(queue.items().iter().all(|b| b.id != second));
}

#[tokio::test]
async fn test_archived_bookmarks_never_reviewed() {
    let (_, organizer) = organizer();
    for id in ["1", "2", "3"] {
        assert!(organizer.archive().archive(id).await.unwrap().success);
    }
    let batch = organizer.review().bookmarks_for_review(10, 30).await.unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, "4");
}

#[tokio::test]
async fn test_apply_suggestions_is_idempotent() {
    let (_, organizer) = organizer();
    let tagger = organizer.tagger();

    let suggestions = tagger.auto_tag_untagged().await.unwrap();
    assert!(suggestions.iter().any(|s| s.bookmark_id == "2"));
    let outcomes = tagger.apply_all_suggestions(&suggestions).await.unwrap();
    assert!(outcomes.iter().all(|o| o.success));

    let tags = organizer.metadata_store().metadata("2").await.unwrap().tags;
    assert!(tags.contains(&"github".to_string()));

    tagger.apply_tags("2", &tags).await.unwrap();
    assert_eq!(organizer.metadata_store().metadata("2").await.unwrap().tags, tags);
    assert!(tagger.auto_tag_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_smart_suggestions_prefer_user_patterns() {
    let (_, organizer) = organizer();
    organizer
        .metadata_store()
        .add_tags("2", &["work"])
        .await
        .unwrap();
    let record = barbo_core::BookmarkRecord::new("9", "https://github.com/tokio-rs/tokio", "tokio", "toolbar");

    let smart = organizer.tagger().smart_suggestions(&record).await.unwrap();
    assert_eq!(smart.from_user_patterns, vec!["work"]);
    assert_eq!(smart.recommended[0], "work");
    assert_eq!(smart.recommended.len(), 5);
}

#[tokio::test]
async fn test_maintenance_initializes_and_cleans_up() {
    let (tree, organizer) = organizer();
    let store = organizer.metadata_store();
    store
        .put_metadata("gone", BookmarkMetadata::new(Utc::now()))
        .await
        .unwrap();
    store
        .save_settings(&Settings {
            auto_scan_on_startup: true,
            ..Settings::default()
        })
        .await
        .unwrap();

    let report = organizer.maintenance().on_startup().await.unwrap();
    assert_eq!(report.initialized, 4);
    assert_eq!(report.cleaned, Some(1));
    assert!(report.purged.is_empty());

    let hits = organizer
        .maintenance()
        .record_access_for_url("https://www.rust-lang.org/")
        .await
        .unwrap();
    assert_eq!(hits, vec!["1"]);
    assert_eq!(store.metadata("1").await.unwrap().access_count, 1);
    assert!(tree.get("1").await.is_ok());
}

#[tokio::test]
async fn test_initialize_metadata_large_tree_keeps_existing() {
    let dir = TempDir::new().unwrap();
    let children = (0..200)
        .map(|i| {
            BookmarkNode::bookmark(
                i.to_string(),
                "toolbar",
                format!("Page {i}"),
                format!("https://example.com/{i}"),
            )
        })
        .collect();
    let tree = Arc::new(InMemoryBookmarkStore::new(vec![BookmarkNode::folder(
        "toolbar", None, "Bookmarks Toolbar", children,
    )]));
    let metadata = Arc::new(MetadataStore::new(Arc::new(JsonFileBackend::new(
        dir.path().join("storage.json"),
    ))));
    metadata.add_tags("7", &["kept"]).await.unwrap();
    let organizer = Organizer::new(tree, metadata.clone(), 70.0);

    assert_eq!(organizer.maintenance().initialize_metadata().await.unwrap(), 199);
    assert_eq!(organizer.maintenance().initialize_metadata().await.unwrap(), 0);

    let all = metadata.all_metadata().await.unwrap();
    assert_eq!(all.len(), 200);
    assert_eq!(all["7"].tags, vec!["kept"]);
}

#[tokio::test]
async fn test_sync_follows_tree_events() {
    let (tree, organizer) = organizer();
    let sync = organizer.sync();
    let mut rx = tree.events().subscribe();

    let node = tree
        .create_bookmark("toolbar", "Tokio", "https://tokio.rs")
        .await
        .unwrap();
    sync.handle(&rx.recv().await.unwrap()).await.unwrap();
    assert!(organizer.metadata_store().has_metadata(&node.id).await.unwrap());

    tree.remove(&node.id).await.unwrap();
    sync.handle(&rx.recv().await.unwrap()).await.unwrap();
    assert!(!organizer.metadata_store().has_metadata(&node.id).await.unwrap());
}

#[tokio::test]
async fn test_bookmark_operations() {
    let (_, organizer) = organizer();
    let ops = organizer.operations();

    assert_eq!(ops.bookmark_path("recipes").await, "Other Bookmarks > Recipes");
    assert_eq!(ops.bookmark_path("missing").await, "Unknown");

    let found = ops.search("RUST").await.unwrap();
    assert_eq!(found.len(), 3);

    let moved = ops.move_bookmark("3", "toolbar").await.unwrap();
    assert!(moved.success);
    assert_eq!(ops.bookmark_path("3").await, "Bookmarks Toolbar > Bread");

    let outcomes = ops.remove_bookmarks(&["1", "nope"]).await.unwrap();
    assert!(outcomes[0].success);
    assert!(!outcomes[1].success);
}

#[tokio::test]
async fn test_duplicates_similar_and_dismiss() {
    let (_, organizer) = organizer();

    let duplicates = organizer.duplicates().await.unwrap();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].normalized_url, "rust-lang.org");

    let overview = organizer.overview().await.unwrap();
    assert_eq!(overview.total_bookmarks, 4);
    assert_eq!(overview.duplicate_count, 1);
    assert_eq!(overview.due_for_review, 4);

    let groups = organizer.similar_groups().await.unwrap();
    for group in &groups {
        organizer.dismiss_similar_group(&group.bookmark_ids).await.unwrap();
    }
    assert!(organizer.similar_groups().await.unwrap().is_empty());
    assert!(organizer.dismiss_similar_group(&["1"]).await.is_err());
}

#[tokio::test]
async fn test_export_import_through_json_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");
    let tree = Arc::new(InMemoryBookmarkStore::new(sample_tree()));
    let backend = Arc::new(JsonFileBackend::new(&path));
    let organizer = Organizer::new(tree.clone(), Arc::new(MetadataStore::new(backend)), 70.0);

    organizer.metadata_store().add_tags("1", &["rust"]).await.unwrap();
    let bundle = organizer.export(true).await.unwrap();
    assert_eq!(bundle.bookmarks.as_ref().map(Vec::len), Some(4));

    organizer.metadata_store().reset().await.unwrap();
    let json = serde_json::to_value(&bundle).unwrap();
    let import: ImportBundle = serde_json::from_value(json).unwrap();
    organizer.import(import).await.unwrap();

    let reopened = MetadataStore::new(Arc::new(JsonFileBackend::new(&path)));
    assert_eq!(reopened.find_by_tag("rust").await.unwrap(), vec!["1"]);

    let bad = ImportBundle {
        metadata: None,
        settings: Some(Settings {
            review_count: 50,
            ..Settings::default()
        }),
    };
    assert!(organizer.import(bad).await.is_err());
}
