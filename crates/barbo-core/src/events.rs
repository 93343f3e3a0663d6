//! Bookmark change notifications.
//!
//! The host bookmark store publishes creation and removal events on a
//! broadcast channel. Metadata sync subscribes to keep per-bookmark records
//! in step with the tree.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::defaults::EVENT_BUS_CAPACITY;
use crate::models::BookmarkNode;

/// Change notification emitted by a bookmark store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookmarkEvent {
    /// A node was created; folders are delivered too and filtered by consumers.
    Created { node: BookmarkNode },
    /// A node was removed from the tree.
    Removed { id: String },
}

impl BookmarkEvent {
    /// Short event type name for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            BookmarkEvent::Created { .. } => "created",
            BookmarkEvent::Removed { .. } => "removed",
        }
    }

    /// Id of the affected node.
    pub fn bookmark_id(&self) -> &str {
        match self {
            BookmarkEvent::Created { node } => &node.id,
            BookmarkEvent::Removed { id } => id,
        }
    }
}

/// Broadcast bus for [`BookmarkEvent`]s.
///
/// Events sent with no active subscribers are dropped.
#[derive(Debug, Clone)]
pub struct BookmarkEventBus {
    tx: broadcast::Sender<BookmarkEvent>,
}

impl BookmarkEventBus {
    /// Create a bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish `event` to every current subscriber.
    pub fn emit(&self, event: BookmarkEvent) {
        let subscriber_count = self.tx.receiver_count();
        tracing::debug!(
            event_type = event.event_type(),
            bookmark_id = %event.bookmark_id(),
            subscriber_count,
            "BookmarkEventBus emit"
        );
        let _ = self.tx.send(event);
    }

    /// Subscribe to the event stream. Each subscriber gets its own receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<BookmarkEvent> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BookmarkEventBus {
    fn default() -> Self {
        Self::new(EVENT_BUS_CAPACITY)
    }
}
