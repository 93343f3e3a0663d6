//! Keeping metadata in step with the bookmark tree.

use std::collections::HashSet;
use std::sync::Arc;

use barbo_core::{BookmarkNode, BookmarkStore, OperationOutcome, Result};
use barbo_store::MetadataStore;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::archive::ArchiveManager;

/// What a startup pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupReport {
    pub initialized: usize,
    /// `None` when the startup scan is disabled.
    pub cleaned: Option<usize>,
    pub purged: Vec<OperationOutcome>,
}

#[derive(Clone)]
pub struct Maintenance {
    bookmarks: Arc<dyn BookmarkStore>,
    metadata: Arc<MetadataStore>,
    archive: ArchiveManager,
}

impl Maintenance {
    pub fn new(bookmarks: Arc<dyn BookmarkStore>, metadata: Arc<MetadataStore>) -> Self {
        let archive = ArchiveManager::new(bookmarks.clone(), metadata.clone());
        Self {
            bookmarks,
            metadata,
            archive,
        }
    }

    /// Create records for bookmarks that have none, dated from the
    /// bookmark's own creation time when known. Returns how many were added.
    #[instrument(skip(self))]
    pub async fn initialize_metadata(&self) -> Result<usize> {
        let tree = self.bookmarks.tree().await?;

        let mut entries = Vec::new();
        let mut stack: Vec<&BookmarkNode> = tree.iter().collect();
        while let Some(node) = stack.pop() {
            if node.is_bookmark() {
                entries.push((node.id.as_str(), node.date_added.unwrap_or_else(Utc::now)));
            }
            stack.extend(node.children.iter());
        }

        let created = self.metadata.initialize_missing(&entries).await?;
        info!(result_count = created, "Bookmark metadata initialized");
        Ok(created)
    }

    /// Drop records of bookmarks that no longer exist.
    #[instrument(skip(self))]
    pub async fn cleanup_deleted(&self) -> Result<usize> {
        let tree = self.bookmarks.tree().await?;
        let existing: HashSet<String> = barbo_core::flatten(&tree)
            .into_iter()
            .map(|b| b.id)
            .collect();
        self.metadata.cleanup(&existing).await
    }

    /// Count a visit for every bookmark whose URL equals `url` exactly.
    /// Returns the ids that were updated.
    pub async fn record_access_for_url(&self, url: &str) -> Result<Vec<String>> {
        let matches = self.bookmarks.search_url(url).await?;
        let mut ids = Vec::with_capacity(matches.len());
        for node in matches {
            self.metadata.record_access(&node.id).await?;
            ids.push(node.id);
        }
        debug!(result_count = ids.len(), "Recorded bookmark access");
        Ok(ids)
    }

    /// Startup pass: initialise missing records, clean up deleted ones when
    /// `auto_scan_on_startup` is on, then purge expired archives.
    pub async fn on_startup(&self) -> Result<StartupReport> {
        let initialized = self.initialize_metadata().await?;
        let settings = self.metadata.settings().await?;

        let cleaned = if settings.auto_scan_on_startup {
            Some(self.cleanup_deleted().await?)
        } else {
            None
        };
        let purged = self.archive.purge_expired(&settings).await?;

        info!(
            initialized,
            cleaned = cleaned.unwrap_or(0),
            purged = purged.len(),
            "Startup maintenance complete"
        );
        Ok(StartupReport {
            initialized,
            cleaned,
            purged,
        })
    }
}
