//! Typed metadata store over a [`KeyValueBackend`].
//!
//! Persisted layout uses three top-level keys:
//!
//! - `bookmarkMetadata`: map of bookmark id to metadata record
//! - `settings`: the user settings object
//! - `dismissedSimilarGroups`: array of dismissal keys
//!
//! Every read-modify-write cycle holds the store's write lock, so concurrent
//! calls through one store never lose updates.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use barbo_core::defaults::{
    EXPORT_VERSION, KEY_BOOKMARK_METADATA, KEY_DISMISSED_GROUPS, KEY_SETTINGS,
};
use barbo_core::{
    group_key, BookmarkMetadata, BookmarkRecord, ExportBundle, ImportBundle, KeyValueBackend,
    MetadataMap, MetadataPatch, Result, Settings,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::MemoryBackend;

/// Metadata, settings, and dismissal memory for the organizer.
pub struct MetadataStore {
    backend: Arc<dyn KeyValueBackend>,
    write_lock: Mutex<()>,
}

impl MetadataStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    // =========================================================================
    // RAW ACCESS
    // =========================================================================

    async fn load_map(&self) -> Result<MetadataMap> {
        match self.backend.get(KEY_BOOKMARK_METADATA).await? {
            None | Some(Value::Null) => Ok(MetadataMap::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    async fn save_map(&self, map: &MetadataMap) -> Result<()> {
        self.backend
            .set(KEY_BOOKMARK_METADATA, serde_json::to_value(map)?)
            .await
    }

    async fn load_dismissed(&self) -> Result<Vec<String>> {
        match self.backend.get(KEY_DISMISSED_GROUPS).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    // =========================================================================
    // METADATA
    // =========================================================================

    /// Every stored metadata record, keyed by bookmark id.
    pub async fn all_metadata(&self) -> Result<MetadataMap> {
        self.load_map().await
    }

    /// Metadata for `id`, or a fresh default record (not persisted) when absent.
    pub async fn metadata(&self, id: &str) -> Result<BookmarkMetadata> {
        let mut map = self.load_map().await?;
        Ok(map
            .remove(id)
            .unwrap_or_else(|| BookmarkMetadata::new(Utc::now())))
    }

    /// Whether a record exists for `id`.
    pub async fn has_metadata(&self, id: &str) -> Result<bool> {
        Ok(self.load_map().await?.contains_key(id))
    }

    /// Merge `patch` into the record for `id` (or a default one) and persist it.
    pub async fn set_metadata(&self, id: &str, patch: MetadataPatch) -> Result<BookmarkMetadata> {
        self.update(id, |meta| patch.apply_to(meta)).await
    }

    /// Replace the record for `id` wholesale.
    pub async fn put_metadata(&self, id: &str, metadata: BookmarkMetadata) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_map().await?;
        map.insert(id.to_string(), metadata);
        self.save_map(&map).await
    }

    /// Create default records for the ids among `entries` that have none,
    /// leaving existing records untouched. Persists once; returns how many
    /// were created.
    pub async fn initialize_missing(&self, entries: &[(&str, DateTime<Utc>)]) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_map().await?;
        let mut created = 0;
        for (id, date_added) in entries {
            if !map.contains_key(*id) {
                map.insert(id.to_string(), BookmarkMetadata::new(*date_added));
                created += 1;
            }
        }
        if created > 0 {
            self.save_map(&map).await?;
        }
        Ok(created)
    }

    /// Delete the record for `id`. Returns whether one existed.
    pub async fn remove_metadata(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_map().await?;
        let existed = map.remove(id).is_some();
        if existed {
            self.save_map(&map).await?;
            debug!(bookmark_id = %id, "Removed bookmark metadata");
        }
        Ok(existed)
    }

    /// Apply `f` to the record for `id` under the write lock and persist it.
    async fn update<F>(&self, id: &str, f: F) -> Result<BookmarkMetadata>
    where
        F: FnOnce(&mut BookmarkMetadata),
    {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_map().await?;
        let meta = map
            .entry(id.to_string())
            .or_insert_with(|| BookmarkMetadata::new(Utc::now()));
        f(meta);
        let updated = meta.clone();
        self.save_map(&map).await?;
        Ok(updated)
    }

    // =========================================================================
    // TAGS
    // =========================================================================

    /// Union `tags` into the bookmark's tag set. Returns the resulting tags.
    pub async fn add_tags<S: AsRef<str> + Sync>(&self, id: &str, tags: &[S]) -> Result<Vec<String>> {
        let meta = self
            .update(id, |meta| {
                meta.add_tags(tags);
            })
            .await?;
        Ok(meta.tags)
    }

    /// Remove `tags` from the bookmark. Returns the remaining tags.
    pub async fn remove_tags<S: AsRef<str> + Sync>(
        &self,
        id: &str,
        tags: &[S],
    ) -> Result<Vec<String>> {
        let meta = self
            .update(id, |meta| {
                meta.remove_tags(tags);
            })
            .await?;
        Ok(meta.tags)
    }

    /// Every tag in use, sorted and unique.
    pub async fn all_tags(&self) -> Result<Vec<String>> {
        let map = self.load_map().await?;
        let tags: BTreeSet<String> = map.into_values().flat_map(|m| m.tags).collect();
        Ok(tags.into_iter().collect())
    }

    /// Ids of bookmarks carrying `tag`.
    pub async fn find_by_tag(&self, tag: &str) -> Result<Vec<String>> {
        let map = self.load_map().await?;
        Ok(map
            .into_iter()
            .filter(|(_, m)| m.tags.iter().any(|t| t == tag))
            .map(|(id, _)| id)
            .collect())
    }

    // =========================================================================
    // ACTIVITY
    // =========================================================================

    /// Count one visit: `last_accessed = now`, `access_count += 1`.
    pub async fn record_access(&self, id: &str) -> Result<BookmarkMetadata> {
        self.update(id, |meta| {
            meta.last_accessed = Some(Utc::now());
            meta.access_count += 1;
        })
        .await
    }

    /// Stamp a review: `last_reviewed = now`, `review_count += 1`.
    pub async fn mark_as_reviewed(&self, id: &str) -> Result<BookmarkMetadata> {
        self.update(id, |meta| {
            meta.last_reviewed = Some(Utc::now());
            meta.review_count += 1;
        })
        .await
    }

    // =========================================================================
    // SETTINGS
    // =========================================================================

    /// Stored settings, or the defaults when none have been saved.
    pub async fn settings(&self) -> Result<Settings> {
        match self.backend.get(KEY_SETTINGS).await? {
            None | Some(Value::Null) => Ok(Settings::default()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.backend
            .set(KEY_SETTINGS, serde_json::to_value(settings)?)
            .await?;
        info!(
            review_count = settings.review_count,
            review_interval = settings.review_interval,
            "Settings saved"
        );
        Ok(())
    }

    // =========================================================================
    // DISMISSED SIMILAR GROUPS
    // =========================================================================

    /// Dismissal keys in the order they were added.
    pub async fn dismissed_groups(&self) -> Result<Vec<String>> {
        self.load_dismissed().await
    }

    /// Remember the exact id set as dismissed. Repeat dismissals are no-ops.
    pub async fn dismiss_group<S: AsRef<str>>(&self, ids: &[S]) -> Result<()> {
        let key = group_key(ids);
        let _guard = self.write_lock.lock().await;
        let mut dismissed = self.load_dismissed().await?;
        if dismissed.contains(&key) {
            return Ok(());
        }
        dismissed.push(key.clone());
        self.backend
            .set(KEY_DISMISSED_GROUPS, serde_json::to_value(&dismissed)?)
            .await?;
        info!(group_key = %key, "Similar group dismissed");
        Ok(())
    }

    pub async fn is_group_dismissed<S: AsRef<str>>(&self, ids: &[S]) -> Result<bool> {
        let key = group_key(ids);
        Ok(self.load_dismissed().await?.contains(&key))
    }

    pub async fn clear_dismissed_groups(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.backend
            .set(KEY_DISMISSED_GROUPS, Value::Array(Vec::new()))
            .await
    }

    // =========================================================================
    // MAINTENANCE AND TRANSFER
    // =========================================================================

    /// Drop every record whose id is not in `existing_ids`. Returns the number
    /// of records removed.
    pub async fn cleanup(&self, existing_ids: &HashSet<String>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_map().await?;
        let before = map.len();
        map.retain(|id, _| existing_ids.contains(id));
        let removed = before - map.len();
        if removed > 0 {
            self.save_map(&map).await?;
        }
        info!(removed, remaining = map.len(), "Metadata cleanup complete");
        Ok(removed)
    }

    /// Snapshot metadata and settings, optionally with the flattened bookmarks.
    pub async fn export(&self, bookmarks: Option<Vec<BookmarkRecord>>) -> Result<ExportBundle> {
        Ok(ExportBundle {
            version: EXPORT_VERSION.to_string(),
            export_date: Utc::now(),
            metadata: self.load_map().await?,
            settings: self.settings().await?,
            bookmarks,
        })
    }

    /// Overwrite metadata and settings with whichever sections `bundle` carries.
    pub async fn import(&self, bundle: ImportBundle) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if bundle.metadata.is_none() && bundle.settings.is_none() {
            warn!("Import bundle carries neither metadata nor settings");
        }
        if let Some(metadata) = bundle.metadata {
            let count = metadata.len();
            self.save_map(&metadata).await?;
            info!(result_count = count, "Imported bookmark metadata");
        }
        if let Some(settings) = bundle.settings {
            self.backend
                .set(KEY_SETTINGS, serde_json::to_value(&settings)?)
                .await?;
            info!("Imported settings");
        }
        Ok(())
    }

    /// Wipe all persisted state.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.backend.clear().await?;
        warn!("Metadata store reset");
        Ok(())
    }
}
