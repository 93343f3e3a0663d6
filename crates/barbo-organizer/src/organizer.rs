//! The organizer context: one bookmark tree, one metadata store, and the
//! services built on them.

use std::collections::HashSet;
use std::sync::Arc;

use barbo_analysis::{
    due_for_review, find_duplicates, find_similar_bookmarks, find_stale_bookmarks,
    redundant_count, suggest_tags, DuplicateGroup, SimilarGroup,
};
use barbo_core::{load_bookmarks, BookmarkStore, Error, ExportBundle, ImportBundle, Result};
use barbo_store::MetadataStore;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::archive::ArchiveManager;
use crate::auto_tag::AutoTagger;
use crate::bookmarks::BookmarkOperations;
use crate::maintenance::Maintenance;
use crate::review::ReviewScheduler;
use crate::sync::MetadataSync;

/// Headline numbers for the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOverview {
    pub total_bookmarks: usize,
    /// Bookmarks due for review under the current interval.
    pub due_for_review: usize,
    /// Redundant copies across all duplicate groups.
    pub duplicate_count: usize,
    pub similar_groups: usize,
    pub stale_bookmarks: usize,
    pub tag_count: usize,
    pub archived_bookmarks: usize,
    /// Untagged bookmarks with at least one tag suggestion.
    pub auto_taggable: usize,
}

/// Shared handles plus the similarity threshold used for clustering.
#[derive(Clone)]
pub struct Organizer {
    bookmarks: Arc<dyn BookmarkStore>,
    metadata: Arc<MetadataStore>,
    similarity_threshold: f64,
}

impl Organizer {
    pub fn new(
        bookmarks: Arc<dyn BookmarkStore>,
        metadata: Arc<MetadataStore>,
        similarity_threshold: f64,
    ) -> Self {
        Self {
            bookmarks,
            metadata,
            similarity_threshold,
        }
    }

    pub fn bookmark_store(&self) -> &Arc<dyn BookmarkStore> {
        &self.bookmarks
    }

    pub fn metadata_store(&self) -> &Arc<MetadataStore> {
        &self.metadata
    }

    pub fn archive(&self) -> ArchiveManager {
        ArchiveManager::new(self.bookmarks.clone(), self.metadata.clone())
    }

    pub fn review(&self) -> ReviewScheduler {
        ReviewScheduler::new(self.bookmarks.clone(), self.metadata.clone())
    }

    pub fn tagger(&self) -> AutoTagger {
        AutoTagger::new(self.bookmarks.clone(), self.metadata.clone())
    }

    pub fn maintenance(&self) -> Maintenance {
        Maintenance::new(self.bookmarks.clone(), self.metadata.clone())
    }

    pub fn operations(&self) -> BookmarkOperations {
        BookmarkOperations::new(self.bookmarks.clone(), self.metadata.clone())
    }

    pub fn sync(&self) -> MetadataSync {
        MetadataSync::new(self.metadata.clone())
    }

    // =========================================================================
    // DUPLICATES AND SIMILAR GROUPS
    // =========================================================================

    pub async fn duplicates(&self) -> Result<Vec<DuplicateGroup>> {
        let bookmarks = load_bookmarks(self.bookmarks.as_ref()).await?;
        Ok(find_duplicates(&bookmarks))
    }

    /// Near-duplicate clusters that the user has not dismissed.
    pub async fn similar_groups(&self) -> Result<Vec<SimilarGroup>> {
        let bookmarks = load_bookmarks(self.bookmarks.as_ref()).await?;
        let dismissed: HashSet<String> =
            self.metadata.dismissed_groups().await?.into_iter().collect();
        Ok(find_similar_bookmarks(
            &bookmarks,
            self.similarity_threshold,
            &dismissed,
        ))
    }

    /// Hide the cluster with exactly these members from future results.
    pub async fn dismiss_similar_group<S: AsRef<str>>(&self, ids: &[S]) -> Result<()> {
        if ids.len() < 2 {
            return Err(Error::InvalidInput(
                "a similar group has at least two bookmarks".to_string(),
            ));
        }
        self.metadata.dismiss_group(ids).await
    }

    // =========================================================================
    // OVERVIEW AND TRANSFER
    // =========================================================================

    pub async fn overview(&self) -> Result<CollectionOverview> {
        let bookmarks = load_bookmarks(self.bookmarks.as_ref()).await?;
        let metadata = self.metadata.all_metadata().await?;
        let settings = self.metadata.settings().await?;
        let dismissed: HashSet<String> =
            self.metadata.dismissed_groups().await?.into_iter().collect();
        let now = Utc::now();

        let overview = CollectionOverview {
            total_bookmarks: bookmarks.len(),
            due_for_review: due_for_review(&bookmarks, &metadata, settings.review_interval, now)
                .len(),
            duplicate_count: redundant_count(&find_duplicates(&bookmarks)),
            similar_groups: find_similar_bookmarks(&bookmarks, self.similarity_threshold, &dismissed)
                .len(),
            stale_bookmarks: find_stale_bookmarks(&metadata, settings.old_bookmark_threshold, now)
                .len(),
            tag_count: self.metadata.all_tags().await?.len(),
            archived_bookmarks: metadata.values().filter(|m| m.is_archived()).count(),
            auto_taggable: bookmarks
                .iter()
                .filter(|b| !metadata.get(&b.id).is_some_and(|m| m.has_tags()))
                .filter(|b| !suggest_tags(b).is_empty())
                .count(),
        };
        debug!(?overview, "Collection overview computed");
        Ok(overview)
    }

    /// Snapshot metadata and settings, with the flattened tree when
    /// `include_bookmarks` is set.
    pub async fn export(&self, include_bookmarks: bool) -> Result<ExportBundle> {
        let bookmarks = if include_bookmarks {
            Some(load_bookmarks(self.bookmarks.as_ref()).await?)
        } else {
            None
        };
        let bundle = self.metadata.export(bookmarks).await?;
        info!(
            result_count = bundle.metadata.len(),
            include_bookmarks, "Exported organizer data"
        );
        Ok(bundle)
    }

    /// Overwrite metadata and settings from an exported bundle. Imported
    /// settings must pass validation.
    pub async fn import(&self, bundle: ImportBundle) -> Result<()> {
        if let Some(settings) = &bundle.settings {
            settings.validate()?;
        }
        self.metadata.import(bundle).await
    }
}
