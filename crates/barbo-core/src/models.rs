//! Core data models for barbo.
//!
//! Bookmark nodes and records are owned by the host bookmark store and are
//! read-only here. [`BookmarkMetadata`] and [`Settings`] are owned by the
//! metadata store. Persisted shapes keep the camelCase layout with epoch
//! millisecond timestamps so existing exports load unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// BOOKMARK TREE
// =============================================================================

/// A node of the host bookmark tree: a folder when `url` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    /// Build a folder node.
    pub fn folder(
        id: impl Into<String>,
        parent_id: Option<&str>,
        title: impl Into<String>,
        children: Vec<BookmarkNode>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            title: title.into(),
            url: None,
            date_added: None,
            children,
        }
    }

    /// Build a leaf bookmark node.
    pub fn bookmark(
        id: impl Into<String>,
        parent_id: &str,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.to_string()),
            title: title.into(),
            url: Some(url.into()),
            date_added: None,
            children: Vec::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }

    /// Leaf bookmark with a non-empty URL.
    pub fn is_bookmark(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// Flat record view of this node (children are not included).
    pub fn to_record(&self) -> BookmarkRecord {
        BookmarkRecord {
            id: self.id.clone(),
            url: self.url.clone(),
            title: self.title.clone(),
            parent_id: self.parent_id.clone(),
        }
    }
}

/// Flattened, read-only view of a bookmark.
///
/// A record with a URL is a leaf bookmark; folders are excluded from every
/// analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    pub id: String,
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    pub parent_id: Option<String>,
}

impl BookmarkRecord {
    /// Convenience constructor for a leaf bookmark.
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        title: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: Some(url.into()),
            title: title.into(),
            parent_id: Some(parent_id.into()),
        }
    }

    /// Leaf bookmark with a non-empty URL.
    pub fn is_leaf(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// The raw URL, or `""` for folders.
    pub fn url_str(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }
}

// =============================================================================
// METADATA
// =============================================================================

/// Archival lifecycle of a bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArchiveState {
    #[default]
    Active,
    Archived {
        archived_date: DateTime<Utc>,
        /// Folder to restore into; unknown for records imported without it.
        original_parent_id: Option<String>,
    },
}

/// Derived metadata kept for every leaf bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MetadataRecord", into = "MetadataRecord")]
pub struct BookmarkMetadata {
    /// Tag set in insertion order, without duplicates.
    pub tags: Vec<String>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub access_count: u64,
    pub date_added: DateTime<Utc>,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub review_count: u32,
    pub archive: ArchiveState,
}

impl BookmarkMetadata {
    /// Fresh record with no tags, counters at zero, and the given creation time.
    pub fn new(date_added: DateTime<Utc>) -> Self {
        Self {
            tags: Vec::new(),
            last_accessed: None,
            access_count: 0,
            date_added,
            last_reviewed: None,
            review_count: 0,
            archive: ArchiveState::Active,
        }
    }

    pub fn is_archived(&self) -> bool {
        matches!(self.archive, ArchiveState::Archived { .. })
    }

    pub fn archived_date(&self) -> Option<DateTime<Utc>> {
        match &self.archive {
            ArchiveState::Archived { archived_date, .. } => Some(*archived_date),
            ArchiveState::Active => None,
        }
    }

    pub fn original_parent_id(&self) -> Option<&str> {
        match &self.archive {
            ArchiveState::Archived {
                original_parent_id, ..
            } => original_parent_id.as_deref(),
            ArchiveState::Active => None,
        }
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Last time the bookmark was opened, falling back to when it was added.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_accessed.unwrap_or(self.date_added)
    }

    /// Union `tags` into the tag set, keeping existing order.
    ///
    /// Returns the number of tags that were not present before.
    pub fn add_tags<S: AsRef<str>>(&mut self, tags: &[S]) -> usize {
        let mut added = 0;
        for tag in tags {
            let tag = tag.as_ref();
            if !self.tags.iter().any(|t| t == tag) {
                self.tags.push(tag.to_string());
                added += 1;
            }
        }
        added
    }

    /// Remove every tag in `tags`. Returns the number removed.
    pub fn remove_tags<S: AsRef<str>>(&mut self, tags: &[S]) -> usize {
        let before = self.tags.len();
        self.tags
            .retain(|t| !tags.iter().any(|r| r.as_ref() == t.as_str()));
        before - self.tags.len()
    }
}

/// Wire shape of [`BookmarkMetadata`] (flat, camelCase, epoch millis).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    tags: Vec<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    last_accessed: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    access_count: u64,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    date_added: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    last_reviewed: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    review_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    archived: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    archived_date: Option<DateTime<Utc>>,
    #[serde(default)]
    original_parent_id: Option<String>,
}

/// Read an explicit `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<MetadataRecord> for BookmarkMetadata {
    fn from(r: MetadataRecord) -> Self {
        let mut tags: Vec<String> = Vec::with_capacity(r.tags.len());
        for tag in r.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        // An archived flag without a date restarts retention from now rather
        // than making the bookmark immediately eligible for purge.
        let archive = if r.archived {
            ArchiveState::Archived {
                archived_date: r.archived_date.unwrap_or_else(Utc::now),
                original_parent_id: r.original_parent_id,
            }
        } else {
            ArchiveState::Active
        };

        Self {
            tags,
            last_accessed: r.last_accessed,
            access_count: r.access_count,
            date_added: r.date_added.unwrap_or_default(),
            last_reviewed: r.last_reviewed,
            review_count: r.review_count,
            archive,
        }
    }
}

impl From<BookmarkMetadata> for MetadataRecord {
    fn from(m: BookmarkMetadata) -> Self {
        let (archived, archived_date, original_parent_id) = match m.archive {
            ArchiveState::Active => (false, None, None),
            ArchiveState::Archived {
                archived_date,
                original_parent_id,
            } => (true, Some(archived_date), original_parent_id),
        };
        Self {
            tags: m.tags,
            last_accessed: m.last_accessed,
            access_count: m.access_count,
            date_added: Some(m.date_added),
            last_reviewed: m.last_reviewed,
            review_count: m.review_count,
            archived,
            archived_date,
            original_parent_id,
        }
    }
}

/// Partial update merged into an existing (or default) metadata record.
///
/// `None` leaves a field untouched. Nullable fields use a nested option so a
/// patch can explicitly clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    pub tags: Option<Vec<String>>,
    pub last_accessed: Option<Option<DateTime<Utc>>>,
    pub access_count: Option<u64>,
    pub date_added: Option<DateTime<Utc>>,
    pub last_reviewed: Option<Option<DateTime<Utc>>>,
    pub review_count: Option<u32>,
    pub archive: Option<ArchiveState>,
}

impl MetadataPatch {
    /// Patch that only replaces the archive state.
    pub fn archive(state: ArchiveState) -> Self {
        Self {
            archive: Some(state),
            ..Default::default()
        }
    }

    /// Patch that only replaces the tag list.
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Default::default()
        }
    }

    /// Merge this patch into `target`.
    pub fn apply_to(self, target: &mut BookmarkMetadata) {
        if let Some(tags) = self.tags {
            target.tags.clear();
            target.add_tags(&tags);
        }
        if let Some(v) = self.last_accessed {
            target.last_accessed = v;
        }
        if let Some(v) = self.access_count {
            target.access_count = v;
        }
        if let Some(v) = self.date_added {
            target.date_added = v;
        }
        if let Some(v) = self.last_reviewed {
            target.last_reviewed = v;
        }
        if let Some(v) = self.review_count {
            target.review_count = v;
        }
        if let Some(v) = self.archive {
            target.archive = v;
        }
    }
}

/// Metadata map keyed by bookmark id, in id order.
pub type MetadataMap = BTreeMap<String, BookmarkMetadata>;

/// Dismissal key of a set of bookmark ids: sorted lexicographically and
/// joined by `,`. Order of `ids` does not matter.
pub fn group_key<S: AsRef<str>>(ids: &[S]) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
    sorted.sort_unstable();
    sorted.join(defaults::GROUP_KEY_DELIMITER)
}

// =============================================================================
// SETTINGS
// =============================================================================

/// UI colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

/// Process-wide user settings, persisted under the `settings` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Days without access before a bookmark counts as stale.
    pub old_bookmark_threshold: u32,
    pub auto_scan_on_startup: bool,
    pub confirm_before_delete: bool,
    pub theme: Theme,
    /// Bookmarks per review batch.
    pub review_count: u32,
    /// Days before a reviewed bookmark is eligible again.
    pub review_interval: u32,
    /// Days an archived bookmark survives before the startup purge.
    pub archive_retention_days: u32,
    pub auto_delete_archived: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            old_bookmark_threshold: defaults::OLD_BOOKMARK_THRESHOLD_DAYS,
            auto_scan_on_startup: false,
            confirm_before_delete: true,
            theme: Theme::Light,
            review_count: defaults::REVIEW_COUNT,
            review_interval: defaults::REVIEW_INTERVAL_DAYS,
            archive_retention_days: defaults::ARCHIVE_RETENTION_DAYS,
            auto_delete_archived: true,
        }
    }
}

impl Settings {
    /// Check the ranges accepted by the settings form.
    pub fn validate(&self) -> Result<()> {
        fn check(value: u32, (lo, hi): (u32, u32), what: &str) -> Result<()> {
            if value < lo || value > hi {
                return Err(Error::InvalidInput(format!(
                    "{} must be between {} and {}, got {}",
                    what, lo, hi, value
                )));
            }
            Ok(())
        }

        check(
            self.old_bookmark_threshold,
            defaults::OLD_BOOKMARK_THRESHOLD_RANGE,
            "old bookmark threshold (days)",
        )?;
        check(self.review_count, defaults::REVIEW_COUNT_RANGE, "review count")?;
        check(
            self.review_interval,
            defaults::REVIEW_INTERVAL_RANGE,
            "review interval (days)",
        )?;
        check(
            self.archive_retention_days,
            defaults::ARCHIVE_RETENTION_RANGE,
            "archive retention (days)",
        )?;
        Ok(())
    }
}

// =============================================================================
// OUTCOMES AND TRANSFER
// =============================================================================

/// Per-item result of a mutating operation; failures are reported, not thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Destination folder, for moves and archives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

impl OperationOutcome {
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            error: None,
            folder_id: None,
        }
    }

    pub fn failed(id: impl Into<String>, error: &Error) -> Self {
        Self {
            id: id.into(),
            success: false,
            error: Some(error.to_string()),
            folder_id: None,
        }
    }

    pub fn with_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }
}

/// Aggregate success/failure counts over a bulk operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkSummary {
    pub fn from_outcomes(outcomes: &[OperationOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        Self {
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}

/// Exported snapshot of metadata and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub export_date: DateTime<Utc>,
    pub metadata: MetadataMap,
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarks: Option<Vec<BookmarkRecord>>,
}

/// Import payload. Only the presence of each section is checked; present
/// sections overwrite the stored ones wholesale.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBundle {
    #[serde(default)]
    pub metadata: Option<MetadataMap>,
    #[serde(default)]
    pub settings: Option<Settings>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_metadata_deserializes_original_layout() {
        let value = json!({
            "tags": ["rust", "docs", "rust"],
            "lastAccessed": 1_700_000_000_000i64,
            "accessCount": 3,
            "dateAdded": 1_600_000_000_000i64,
            "lastReviewed": null,
            "reviewCount": 0,
            "archived": true,
            "archivedDate": 1_710_000_000_000i64,
            "originalParentId": "toolbar_____"
        });

        let meta: BookmarkMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(meta.tags, vec!["rust", "docs"]);
        assert_eq!(meta.access_count, 3);
        assert_eq!(meta.last_accessed, Some(ts(1_700_000_000_000)));
        assert_eq!(
            meta.archive,
            ArchiveState::Archived {
                archived_date: ts(1_710_000_000_000),
                original_parent_id: Some("toolbar_____".to_string()),
            }
        );
    }

    #[test]
    fn test_metadata_serializes_flat_fields() {
        let mut meta = BookmarkMetadata::new(ts(1_000));
        meta.archive = ArchiveState::Archived {
            archived_date: ts(2_000),
            original_parent_id: Some("menu".to_string()),
        };

        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["archived"], true);
        assert_eq!(value["archivedDate"], 2_000);
        assert_eq!(value["originalParentId"], "menu");
        assert_eq!(value["dateAdded"], 1_000);
    }

    #[test]
    fn test_active_metadata_drops_stale_archive_fields() {
        let value = json!({
            "dateAdded": 5,
            "archived": false,
            "archivedDate": 10,
            "originalParentId": "x"
        });
        let meta: BookmarkMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(meta.archive, ArchiveState::Active);

        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back["archivedDate"], serde_json::Value::Null);
        assert_eq!(back["originalParentId"], serde_json::Value::Null);
    }

    #[test]
    fn test_null_fields_use_defaults() {
        let value = json!({
            "tags": null,
            "lastAccessed": null,
            "accessCount": null,
            "dateAdded": null,
            "reviewCount": null,
            "archived": null
        });
        let meta: BookmarkMetadata = serde_json::from_value(value).unwrap();
        assert!(meta.tags.is_empty());
        assert_eq!(meta.access_count, 0);
        assert_eq!(meta.review_count, 0);
        assert_eq!(meta.date_added, ts(0));
        assert_eq!(meta.archive, ArchiveState::Active);

        let map: MetadataMap = serde_json::from_value(json!({
            "1": { "tags": null, "dateAdded": 1_000 },
            "2": { "tags": ["rust"], "accessCount": 2, "dateAdded": 2_000 }
        }))
        .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["2"].tags, vec!["rust"]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let meta: BookmarkMetadata = serde_json::from_value(json!({})).unwrap();
        assert!(meta.tags.is_empty());
        assert_eq!(meta.access_count, 0);
        assert_eq!(meta.date_added, DateTime::<Utc>::default());
        assert!(!meta.is_archived());
    }

    #[test]
    fn test_add_tags_is_a_union() {
        let mut meta = BookmarkMetadata::new(ts(0));
        assert_eq!(meta.add_tags(&["b", "a"]), 2);
        assert_eq!(meta.add_tags(&["a", "c", "b"]), 1);
        assert_eq!(meta.tags, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_remove_tags() {
        let mut meta = BookmarkMetadata::new(ts(0));
        meta.add_tags(&["a", "b", "c"]);
        assert_eq!(meta.remove_tags(&["b", "zzz"]), 1);
        assert_eq!(meta.tags, vec!["a", "c"]);
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut meta = BookmarkMetadata::new(ts(0));
        meta.add_tags(&["keep"]);
        meta.access_count = 4;

        MetadataPatch {
            last_reviewed: Some(Some(ts(99))),
            review_count: Some(1),
            ..Default::default()
        }
        .apply_to(&mut meta);

        assert_eq!(meta.tags, vec!["keep"]);
        assert_eq!(meta.access_count, 4);
        assert_eq!(meta.last_reviewed, Some(ts(99)));
        assert_eq!(meta.review_count, 1);
    }

    #[test]
    fn test_last_activity_falls_back_to_date_added() {
        let mut meta = BookmarkMetadata::new(ts(10));
        assert_eq!(meta.last_activity(), ts(10));
        meta.last_accessed = Some(ts(20));
        assert_eq!(meta.last_activity(), ts(20));
    }

    #[test]
    fn test_settings_defaults_from_partial_json() {
        let settings: Settings = serde_json::from_value(json!({ "reviewCount": 8 })).unwrap();
        assert_eq!(settings.review_count, 8);
        assert_eq!(settings.review_interval, 180);
        assert_eq!(settings.archive_retention_days, 90);
        assert!(settings.auto_delete_archived);
        assert_eq!(settings.theme, Theme::Light);
    }

    #[test]
    fn test_settings_validate_ranges() {
        assert!(Settings::default().validate().is_ok());

        let bad = Settings {
            review_count: 21,
            ..Default::default()
        };
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("review count"));

        let bad = Settings {
            archive_retention_days: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_group_key_is_order_independent() {
        assert_eq!(group_key(&["3", "1", "2"]), "1,2,3");
        assert_eq!(group_key(&["2", "1"]), group_key(&["1", "2"]));
        // Lexicographic, not numeric.
        assert_eq!(group_key(&["10", "9"]), "10,9");
    }

    #[test]
    fn test_bulk_summary_counts() {
        let outcomes = vec![
            OperationOutcome::ok("1"),
            OperationOutcome::failed("2", &Error::BookmarkNotFound("2".into())),
            OperationOutcome::ok("3"),
        ];
        let summary = BulkSummary::from_outcomes(&outcomes);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_import_bundle_presence_only() {
        let bundle: ImportBundle =
            serde_json::from_value(json!({ "settings": { "theme": "dark" }, "extra": 1 }))
                .unwrap();
        assert!(bundle.metadata.is_none());
        assert_eq!(bundle.settings.unwrap().theme, Theme::Dark);
    }
}
