//! In-memory host bookmark tree.
//!
//! [`InMemoryBookmarkStore`] implements [`BookmarkStore`] over an owned tree
//! and publishes [`BookmarkEvent`]s on creation and removal. The CLI loads
//! it from (and saves it back to) a JSON tree file.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use barbo_core::{
    find_node, BookmarkEvent, BookmarkEventBus, BookmarkNode, BookmarkStore, Error, Result,
};
use chrono::Utc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::backend::write_atomic;

/// Bookmark tree held in memory.
pub struct InMemoryBookmarkStore {
    roots: RwLock<Vec<BookmarkNode>>,
    events: BookmarkEventBus,
    next_id: AtomicU64,
}

impl InMemoryBookmarkStore {
    pub fn new(roots: Vec<BookmarkNode>) -> Self {
        Self {
            roots: RwLock::new(roots),
            events: BookmarkEventBus::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Load a tree from a JSON file holding either an array of roots or a
    /// single root node.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).await.map_err(|e| {
            Error::Store(format!("read bookmark tree {}: {}", path.display(), e))
        })?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        let roots = if value.is_array() {
            serde_json::from_value(value)?
        } else {
            vec![serde_json::from_value(value)?]
        };
        let store = Self::new(roots);
        info!(path = %path.display(), "Loaded bookmark tree");
        Ok(store)
    }

    /// Write the current tree to `path` as a JSON array of roots.
    pub async fn save_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_vec_pretty(&*self.roots.read().await)?;
        write_atomic(path, &data).await?;
        debug!(path = %path.display(), "Saved bookmark tree");
        Ok(())
    }

    /// Event bus carrying creation and removal notifications.
    pub fn events(&self) -> &BookmarkEventBus {
        &self.events
    }

    /// Add a leaf bookmark under `parent_id`.
    pub async fn create_bookmark(
        &self,
        parent_id: &str,
        title: &str,
        url: &str,
    ) -> Result<BookmarkNode> {
        let mut node = BookmarkNode::bookmark(self.fresh_id().await, parent_id, title, url);
        node.date_added = Some(Utc::now());
        self.insert(node).await
    }

    async fn fresh_id(&self) -> String {
        let roots = self.roots.read().await;
        loop {
            let id = format!("barbo{}", self.next_id.fetch_add(1, Ordering::Relaxed));
            if find_node(&roots, &id).is_none() {
                return id;
            }
        }
    }

    async fn insert(&self, node: BookmarkNode) -> Result<BookmarkNode> {
        let parent_id = node
            .parent_id
            .clone()
            .ok_or_else(|| Error::InvalidInput("new node needs a parent".to_string()))?;
        {
            let mut roots = self.roots.write().await;
            let parent = find_node_mut(&mut roots, &parent_id)
                .ok_or_else(|| Error::BookmarkNotFound(parent_id.clone()))?;
            if !parent.is_folder() {
                return Err(Error::InvalidInput(format!("{} is not a folder", parent_id)));
            }
            parent.children.push(node.clone());
        }
        debug!(bookmark_id = %node.id, folder_id = %parent_id, "Created bookmark node");
        self.events.emit(BookmarkEvent::Created { node: node.clone() });
        Ok(node)
    }
}

fn find_node_mut<'a>(nodes: &'a mut [BookmarkNode], id: &str) -> Option<&'a mut BookmarkNode> {
    for node in nodes.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Remove the node with `id` (and its subtree) from wherever it sits.
fn detach(nodes: &mut Vec<BookmarkNode>, id: &str) -> Option<BookmarkNode> {
    if let Some(pos) = nodes.iter().position(|n| n.id == id) {
        return Some(nodes.remove(pos));
    }
    nodes.iter_mut().find_map(|n| detach(&mut n.children, id))
}

fn collect_ids(node: &BookmarkNode, out: &mut Vec<String>) {
    out.push(node.id.clone());
    for child in &node.children {
        collect_ids(child, out);
    }
}

fn find_folder_by_title<'a>(nodes: &'a [BookmarkNode], title: &str) -> Option<&'a BookmarkNode> {
    for node in nodes {
        if node.is_folder() && node.title == title {
            return Some(node);
        }
        if let Some(found) = find_folder_by_title(&node.children, title) {
            return Some(found);
        }
    }
    None
}

fn collect_by_url(nodes: &[BookmarkNode], url: &str, out: &mut Vec<BookmarkNode>) {
    for node in nodes {
        if node.url.as_deref() == Some(url) {
            out.push(without_children(node));
        }
        collect_by_url(&node.children, url, out);
    }
}

fn without_children(node: &BookmarkNode) -> BookmarkNode {
    BookmarkNode {
        children: Vec::new(),
        ..node.clone()
    }
}

#[async_trait]
impl BookmarkStore for InMemoryBookmarkStore {
    async fn tree(&self) -> Result<Vec<BookmarkNode>> {
        Ok(self.roots.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<BookmarkNode> {
        let roots = self.roots.read().await;
        find_node(&roots, id)
            .map(without_children)
            .ok_or_else(|| Error::BookmarkNotFound(id.to_string()))
    }

    async fn find_folder(&self, title: &str) -> Result<Option<BookmarkNode>> {
        let roots = self.roots.read().await;
        Ok(find_folder_by_title(&roots, title).map(without_children))
    }

    async fn create_folder(&self, parent_id: &str, title: &str) -> Result<BookmarkNode> {
        let mut node = BookmarkNode::folder(self.fresh_id().await, Some(parent_id), title, vec![]);
        node.date_added = Some(Utc::now());
        self.insert(node).await
    }

    async fn move_to(&self, id: &str, parent_id: &str) -> Result<()> {
        let mut roots = self.roots.write().await;

        let node = find_node(&roots, id).ok_or_else(|| Error::BookmarkNotFound(id.to_string()))?;
        if node.parent_id.is_none() {
            return Err(Error::InvalidInput(format!("cannot move root {}", id)));
        }
        if find_node(std::slice::from_ref(node), parent_id).is_some() {
            return Err(Error::InvalidInput(format!(
                "cannot move {} into its own subtree",
                id
            )));
        }
        match find_node(&roots, parent_id) {
            None => return Err(Error::BookmarkNotFound(parent_id.to_string())),
            Some(parent) if !parent.is_folder() => {
                return Err(Error::InvalidInput(format!("{} is not a folder", parent_id)))
            }
            Some(_) => {}
        }

        let mut node =
            detach(&mut roots, id).ok_or_else(|| Error::BookmarkNotFound(id.to_string()))?;
        node.parent_id = Some(parent_id.to_string());
        let parent = find_node_mut(&mut roots, parent_id)
            .ok_or_else(|| Error::BookmarkNotFound(parent_id.to_string()))?;
        parent.children.push(node);

        debug!(bookmark_id = %id, folder_id = %parent_id, "Moved bookmark node");
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let removed = {
            let mut roots = self.roots.write().await;
            detach(&mut roots, id).ok_or_else(|| Error::BookmarkNotFound(id.to_string()))?
        };

        let mut ids = Vec::new();
        collect_ids(&removed, &mut ids);
        debug!(bookmark_id = %id, removed = ids.len(), "Removed bookmark node");
        for removed_id in ids {
            self.events.emit(BookmarkEvent::Removed { id: removed_id });
        }
        Ok(())
    }

    async fn search_url(&self, url: &str) -> Result<Vec<BookmarkNode>> {
        let roots = self.roots.read().await;
        let mut out = Vec::new();
        collect_by_url(&roots, url, &mut out);
        Ok(out)
    }
}
