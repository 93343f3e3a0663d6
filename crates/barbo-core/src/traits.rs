//! Core traits for barbo abstractions.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::BookmarkNode;

// =============================================================================
// BOOKMARK STORE
// =============================================================================

/// The host bookmark tree (browser bookmarks or an equivalent).
///
/// The engine only reads the tree and mutates it through explicit move,
/// create-folder and remove calls.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Full tree; the returned roots are the top-level containers.
    async fn tree(&self) -> Result<Vec<BookmarkNode>>;

    /// Fetch one node (without children). `BookmarkNotFound` if absent.
    async fn get(&self, id: &str) -> Result<BookmarkNode>;

    /// First folder whose title equals `title` exactly.
    async fn find_folder(&self, title: &str) -> Result<Option<BookmarkNode>>;

    /// Create a folder under `parent_id` and return it.
    async fn create_folder(&self, parent_id: &str, title: &str) -> Result<BookmarkNode>;

    /// Move a node under a new parent.
    async fn move_to(&self, id: &str, parent_id: &str) -> Result<()>;

    /// Remove a node (and its subtree).
    async fn remove(&self, id: &str) -> Result<()>;

    /// Leaf bookmarks whose URL equals `url` exactly.
    async fn search_url(&self, url: &str) -> Result<Vec<BookmarkNode>>;
}

// =============================================================================
// KEY-VALUE BACKEND
// =============================================================================

/// Persistence seam under the metadata store: JSON values by string key.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Delete every key.
    async fn clear(&self) -> Result<()>;
}
