//! Archive lifecycle: moving bookmarks into the archive folder and back.
//!
//! An archived bookmark lives in the `📁 Bookmark Archive` folder and its
//! metadata remembers where it came from. Archives older than the
//! retention period are purged at startup when the user opted in.

use std::sync::Arc;

use barbo_core::defaults::ARCHIVE_FOLDER_NAME;
use barbo_core::{
    default_root_id, ArchiveState, BookmarkRecord, BookmarkStore, Error, MetadataMap,
    MetadataPatch, OperationOutcome, Result, Settings,
};
use barbo_store::MetadataStore;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::outcome::settle;

/// An archived bookmark that still exists in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedBookmark {
    #[serde(flatten)]
    pub record: BookmarkRecord,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub archived_date: DateTime<Utc>,
    pub original_parent_id: Option<String>,
    pub days_since_archived: i64,
}

/// An archive record past its retention period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredArchive {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub archived_date: DateTime<Utc>,
    pub days_since_archived: i64,
}

/// Archive records whose archive date is strictly older than
/// `now - retention_days`, in id order.
pub fn find_expired_archives(
    metadata: &MetadataMap,
    retention_days: u32,
    now: DateTime<Utc>,
) -> Vec<ExpiredArchive> {
    let threshold = now - Duration::days(i64::from(retention_days));
    metadata
        .iter()
        .filter_map(|(id, meta)| {
            let archived_date = meta.archived_date()?;
            (archived_date < threshold).then(|| ExpiredArchive {
                id: id.clone(),
                archived_date,
                days_since_archived: (now - archived_date).num_days(),
            })
        })
        .collect()
}

/// Moves bookmarks in and out of the archive folder.
#[derive(Clone)]
pub struct ArchiveManager {
    bookmarks: Arc<dyn BookmarkStore>,
    metadata: Arc<MetadataStore>,
}

impl ArchiveManager {
    pub fn new(bookmarks: Arc<dyn BookmarkStore>, metadata: Arc<MetadataStore>) -> Self {
        Self {
            bookmarks,
            metadata,
        }
    }

    /// Id of the archive folder, creating it under the default root when
    /// it does not exist yet.
    pub async fn archive_folder(&self) -> Result<String> {
        if let Some(folder) = self.bookmarks.find_folder(ARCHIVE_FOLDER_NAME).await? {
            return Ok(folder.id);
        }
        let tree = self.bookmarks.tree().await?;
        let root = default_root_id(&tree)?;
        let folder = self
            .bookmarks
            .create_folder(&root, ARCHIVE_FOLDER_NAME)
            .await?;
        info!(folder_id = %folder.id, parent_id = %root, "Created archive folder");
        Ok(folder.id)
    }

    /// Archive one bookmark. Missing bookmarks, folders and bookmarks that
    /// are already archived yield a failed outcome.
    #[instrument(skip(self))]
    pub async fn archive(&self, id: &str) -> Result<OperationOutcome> {
        let result = self.try_archive(id).await.map(Some);
        settle("archive", id, result)
    }

    /// Archive each bookmark in turn; failures do not stop the batch.
    pub async fn archive_many<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<OperationOutcome>> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            outcomes.push(self.archive(id.as_ref()).await?);
        }
        info!(
            op = "archive",
            input_count = ids.len(),
            success = outcomes.iter().filter(|o| o.success).count(),
            "Bulk archive finished"
        );
        Ok(outcomes)
    }

    async fn try_archive(&self, id: &str) -> Result<String> {
        let node = self.bookmarks.get(id).await?;
        if !node.is_bookmark() {
            return Err(Error::InvalidInput(format!("{} is a folder", id)));
        }
        let meta = self.metadata.metadata(id).await?;
        if meta.is_archived() {
            return Err(Error::InvalidState(format!("bookmark {} is already archived", id)));
        }

        let folder_id = self.archive_folder().await?;
        self.bookmarks.move_to(id, &folder_id).await?;
        self.metadata
            .set_metadata(
                id,
                MetadataPatch::archive(ArchiveState::Archived {
                    archived_date: Utc::now(),
                    original_parent_id: node.parent_id.clone(),
                }),
            )
            .await?;

        info!(
            bookmark_id = %id,
            folder_id = %folder_id,
            original_parent_id = ?node.parent_id,
            "Bookmark archived"
        );
        Ok(folder_id)
    }

    /// Restore an archived bookmark to its original folder, or to the
    /// default root when that folder is gone.
    #[instrument(skip(self))]
    pub async fn unarchive(&self, id: &str) -> Result<OperationOutcome> {
        let result = self.try_unarchive(id).await.map(Some);
        settle("unarchive", id, result)
    }

    async fn try_unarchive(&self, id: &str) -> Result<String> {
        let meta = self.metadata.metadata(id).await?;
        let ArchiveState::Archived {
            original_parent_id, ..
        } = meta.archive
        else {
            return Err(Error::InvalidState(format!("bookmark {} is not archived", id)));
        };
        self.bookmarks.get(id).await?;

        let target = match original_parent_id {
            Some(parent_id) => match self.bookmarks.move_to(id, &parent_id).await {
                Ok(()) => parent_id,
                Err(e) if e.is_store_failure() => return Err(e),
                Err(e) => {
                    warn!(
                        bookmark_id = %id,
                        parent_id = %parent_id,
                        error = %e,
                        "Original folder unavailable, restoring to default root"
                    );
                    self.move_to_default_root(id).await?
                }
            },
            None => {
                debug!(bookmark_id = %id, "No original folder recorded");
                self.move_to_default_root(id).await?
            }
        };

        self.metadata
            .set_metadata(id, MetadataPatch::archive(ArchiveState::Active))
            .await?;
        info!(bookmark_id = %id, folder_id = %target, "Bookmark unarchived");
        Ok(target)
    }

    async fn move_to_default_root(&self, id: &str) -> Result<String> {
        let tree = self.bookmarks.tree().await?;
        let root = default_root_id(&tree)?;
        self.bookmarks.move_to(id, &root).await?;
        Ok(root)
    }

    /// Archived bookmarks that still exist, oldest archive first.
    pub async fn archived_bookmarks(&self) -> Result<Vec<ArchivedBookmark>> {
        let now = Utc::now();
        let metadata = self.metadata.all_metadata().await?;
        let mut archived = Vec::new();

        for (id, meta) in &metadata {
            let Some(archived_date) = meta.archived_date() else {
                continue;
            };
            let node = match self.bookmarks.get(id).await {
                Ok(node) => node,
                Err(e) if e.is_not_found() => {
                    debug!(bookmark_id = %id, "Archived bookmark no longer exists");
                    continue;
                }
                Err(e) => return Err(e),
            };
            archived.push(ArchivedBookmark {
                record: node.to_record(),
                archived_date,
                original_parent_id: meta.original_parent_id().map(str::to_string),
                days_since_archived: (now - archived_date).num_days(),
            });
        }

        archived.sort_by_key(|a| a.archived_date);
        debug!(result_count = archived.len(), "Listed archived bookmarks");
        Ok(archived)
    }

    /// Archive records older than `retention_days`.
    pub async fn find_expired_archived_bookmarks(
        &self,
        retention_days: u32,
    ) -> Result<Vec<ExpiredArchive>> {
        let metadata = self.metadata.all_metadata().await?;
        Ok(find_expired_archives(&metadata, retention_days, Utc::now()))
    }

    /// Delete expired archived bookmarks when `auto_delete_archived` is on.
    ///
    /// Each bookmark is removed independently; its metadata goes with it.
    /// Returns one outcome per expired bookmark.
    #[instrument(skip(self, settings))]
    pub async fn purge_expired(&self, settings: &Settings) -> Result<Vec<OperationOutcome>> {
        if !settings.auto_delete_archived {
            debug!("Automatic archive deletion disabled");
            return Ok(Vec::new());
        }

        let expired = self
            .find_expired_archived_bookmarks(settings.archive_retention_days)
            .await?;
        let mut outcomes = Vec::with_capacity(expired.len());
        for archive in &expired {
            let result = match self.bookmarks.remove(&archive.id).await {
                Ok(()) => self.metadata.remove_metadata(&archive.id).await.map(|_| None),
                Err(e) => Err(e),
            };
            outcomes.push(settle("purge", &archive.id, result)?);
        }

        let deleted = outcomes.iter().filter(|o| o.success).count();
        if deleted > 0 {
            info!(
                result_count = deleted,
                retention_days = settings.archive_retention_days,
                "Purged expired archived bookmarks"
            );
        }
        Ok(outcomes)
    }
}
