//! Tree operations exposed to the UI: remove, move, path and search.

use std::sync::Arc;

use barbo_core::defaults::{PATH_SEPARATOR, UNKNOWN_PATH};
use barbo_core::{load_bookmarks, BookmarkRecord, BookmarkStore, OperationOutcome, Result};
use barbo_store::MetadataStore;
use tracing::{debug, info, instrument, warn};

use crate::outcome::settle;

#[derive(Clone)]
pub struct BookmarkOperations {
    bookmarks: Arc<dyn BookmarkStore>,
    metadata: Arc<MetadataStore>,
}

impl BookmarkOperations {
    pub fn new(bookmarks: Arc<dyn BookmarkStore>, metadata: Arc<MetadataStore>) -> Self {
        Self {
            bookmarks,
            metadata,
        }
    }

    /// Delete a bookmark (or folder) and its metadata record.
    #[instrument(skip(self))]
    pub async fn remove_bookmark(&self, id: &str) -> Result<OperationOutcome> {
        let result = match self.bookmarks.remove(id).await {
            Ok(()) => self.metadata.remove_metadata(id).await.map(|_| None),
            Err(e) => Err(e),
        };
        settle("remove", id, result)
    }

    /// Delete each bookmark in turn; one failure does not stop the rest.
    pub async fn remove_bookmarks<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<OperationOutcome>> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            outcomes.push(self.remove_bookmark(id.as_ref()).await?);
        }
        info!(
            op = "remove",
            input_count = ids.len(),
            success = outcomes.iter().filter(|o| o.success).count(),
            "Bulk remove finished"
        );
        Ok(outcomes)
    }

    #[instrument(skip(self))]
    pub async fn move_bookmark(&self, id: &str, parent_id: &str) -> Result<OperationOutcome> {
        let result = self
            .bookmarks
            .move_to(id, parent_id)
            .await
            .map(|()| Some(parent_id.to_string()));
        settle("move", id, result)
    }

    /// Titles from the root down to `id`, joined by ` > `. Untitled nodes
    /// are skipped. Any lookup failure yields `"Unknown"`.
    ///
    /// Pass a bookmark's parent id to get the folder it lives in.
    pub async fn bookmark_path(&self, id: &str) -> String {
        match self.try_path(id).await {
            Ok(path) => path,
            Err(e) => {
                warn!(bookmark_id = %id, error = %e, "Bookmark path lookup failed");
                UNKNOWN_PATH.to_string()
            }
        }
    }

    async fn try_path(&self, id: &str) -> Result<String> {
        let mut titles = Vec::new();
        let mut current = Some(id.to_string());
        while let Some(node_id) = current {
            let node = self.bookmarks.get(&node_id).await?;
            if !node.title.is_empty() {
                titles.push(node.title);
            }
            current = node.parent_id;
        }
        titles.reverse();
        Ok(titles.join(PATH_SEPARATOR))
    }

    /// Bookmarks whose title or URL contains `query`, ignoring case.
    pub async fn search(&self, query: &str) -> Result<Vec<BookmarkRecord>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let matches: Vec<BookmarkRecord> = load_bookmarks(self.bookmarks.as_ref())
            .await?
            .into_iter()
            .filter(|b| {
                b.title.to_lowercase().contains(&needle)
                    || b.url_str().to_lowercase().contains(&needle)
            })
            .collect();
        debug!(result_count = matches.len(), "Bookmark search");
        Ok(matches)
    }
}
