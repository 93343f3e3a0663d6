//! Periodic review of random bookmarks.
//!
//! [`ReviewScheduler`] picks bookmarks that are due for review and stamps
//! them when the user keeps them. [`ReviewQueue`] is the working batch the
//! user walks through: skip, keep, or load more.

use std::collections::HashSet;
use std::sync::Arc;

use barbo_analysis::{find_stale_bookmarks, select_for_review, StaleBookmark};
use barbo_core::{load_bookmarks, BookmarkMetadata, BookmarkRecord, BookmarkStore, Result};
use barbo_store::MetadataStore;
use chrono::Utc;
use tracing::{debug, info};

/// Selects review batches and records completed reviews.
#[derive(Clone)]
pub struct ReviewScheduler {
    bookmarks: Arc<dyn BookmarkStore>,
    metadata: Arc<MetadataStore>,
}

impl ReviewScheduler {
    pub fn new(bookmarks: Arc<dyn BookmarkStore>, metadata: Arc<MetadataStore>) -> Self {
        Self {
            bookmarks,
            metadata,
        }
    }

    /// Up to `count` random, non-archived bookmarks not reviewed within the
    /// last `interval_days`.
    pub async fn bookmarks_for_review(
        &self,
        count: usize,
        interval_days: u32,
    ) -> Result<Vec<BookmarkRecord>> {
        let bookmarks = load_bookmarks(self.bookmarks.as_ref()).await?;
        let metadata = self.metadata.all_metadata().await?;
        let mut rng = rand::thread_rng();
        Ok(select_for_review(
            &bookmarks,
            &metadata,
            count,
            interval_days,
            Utc::now(),
            &mut rng,
        ))
    }

    /// Stamp a review: `last_reviewed = now`, `review_count += 1`.
    pub async fn mark_as_reviewed(&self, id: &str) -> Result<BookmarkMetadata> {
        let meta = self.metadata.mark_as_reviewed(id).await?;
        debug!(bookmark_id = %id, review_count = meta.review_count, "Bookmark reviewed");
        Ok(meta)
    }

    /// Bookmarks not opened within `threshold_days`, oldest activity first.
    pub async fn stale_bookmarks(&self, threshold_days: u32) -> Result<Vec<StaleBookmark>> {
        let metadata = self.metadata.all_metadata().await?;
        let mut stale = find_stale_bookmarks(&metadata, threshold_days, Utc::now());
        stale.sort_by_key(|s| s.last_accessed);
        Ok(stale)
    }

    /// Start a working batch sized by the persisted settings.
    pub async fn start_queue(&self) -> Result<ReviewQueue> {
        let mut queue = ReviewQueue {
            scheduler: self.clone(),
            items: Vec::new(),
        };
        queue.load_more().await?;
        Ok(queue)
    }
}

/// The batch of bookmarks currently under review.
pub struct ReviewQueue {
    scheduler: ReviewScheduler,
    items: Vec<BookmarkRecord>,
}

impl ReviewQueue {
    /// Bookmarks still waiting for a decision, in presentation order.
    pub fn items(&self) -> &[BookmarkRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop `id` from the batch without touching its metadata.
    pub fn skip(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|b| b.id != id);
        before != self.items.len()
    }

    /// Mark `id` as reviewed and drop it from the batch.
    pub async fn keep(&mut self, id: &str) -> Result<BookmarkMetadata> {
        let meta = self.scheduler.mark_as_reviewed(id).await?;
        self.items.retain(|b| b.id != id);
        Ok(meta)
    }

    /// Append a fresh batch using the persisted review settings. Bookmarks
    /// already queued are not added twice. Returns how many were added.
    pub async fn load_more(&mut self) -> Result<usize> {
        let settings = self.scheduler.metadata.settings().await?;
        let batch = self
            .scheduler
            .bookmarks_for_review(settings.review_count as usize, settings.review_interval)
            .await?;

        let queued: HashSet<String> = self.items.iter().map(|b| b.id.clone()).collect();
        let before = self.items.len();
        self.items
            .extend(batch.into_iter().filter(|b| !queued.contains(&b.id)));
        let added = self.items.len() - before;

        info!(
            result_count = added,
            queue_len = self.items.len(),
            "Review batch loaded"
        );
        Ok(added)
    }
}
