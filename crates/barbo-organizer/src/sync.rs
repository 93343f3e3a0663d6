//! Metadata updates driven by bookmark change events.

use std::sync::Arc;

use barbo_core::{BookmarkEvent, BookmarkMetadata, Result};
use barbo_store::MetadataStore;
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Creates and deletes metadata records as bookmarks come and go.
#[derive(Clone)]
pub struct MetadataSync {
    metadata: Arc<MetadataStore>,
}

impl MetadataSync {
    pub fn new(metadata: Arc<MetadataStore>) -> Self {
        Self { metadata }
    }

    /// Apply one event. Folders are ignored on creation.
    pub async fn handle(&self, event: &BookmarkEvent) -> Result<()> {
        match event {
            BookmarkEvent::Created { node } if node.is_bookmark() => {
                let created = node.date_added.unwrap_or_else(Utc::now);
                self.metadata
                    .put_metadata(&node.id, BookmarkMetadata::new(created))
                    .await?;
                debug!(bookmark_id = %node.id, "Metadata created for new bookmark");
            }
            BookmarkEvent::Created { node } => {
                debug!(bookmark_id = %node.id, "Folder created, no metadata");
            }
            BookmarkEvent::Removed { id } => {
                if self.metadata.remove_metadata(id).await? {
                    debug!(bookmark_id = %id, "Metadata removed with bookmark");
                }
            }
        }
        Ok(())
    }

    /// Process events until the channel closes. Returns how many events
    /// were handled. Handler errors are logged and do not stop the loop.
    pub async fn run(&self, mut rx: broadcast::Receiver<BookmarkEvent>) -> usize {
        let mut handled = 0usize;
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event).await {
                        error!(
                            event_type = event.event_type(),
                            bookmark_id = %event.bookmark_id(),
                            error = %e,
                            "Metadata sync failed"
                        );
                    }
                    handled += 1;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Metadata sync lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        info!(handled, "Metadata sync stopped");
        handled
    }
}
