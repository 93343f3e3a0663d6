//! Bookmark tree helpers.

use crate::defaults::{OTHER_BOOKMARKS_TITLE, UNFILED_ROOT_ID};
use crate::error::{Error, Result};
use crate::models::{BookmarkNode, BookmarkRecord};
use crate::traits::BookmarkStore;

/// Flatten a tree into leaf records in depth-first, pre-order.
///
/// Folders and nodes with an empty URL are skipped; descendants are still
/// visited.
pub fn flatten(tree: &[BookmarkNode]) -> Vec<BookmarkRecord> {
    let mut out = Vec::new();
    let mut stack: Vec<&BookmarkNode> = tree.iter().rev().collect();

    while let Some(node) = stack.pop() {
        if node.is_bookmark() {
            out.push(node.to_record());
        }
        stack.extend(node.children.iter().rev());
    }
    out
}

/// Read the store's tree and flatten it.
pub async fn load_bookmarks(store: &dyn BookmarkStore) -> Result<Vec<BookmarkRecord>> {
    let tree = store.tree().await?;
    let records = flatten(&tree);
    tracing::trace!(result_count = records.len(), "Flattened bookmark tree");
    Ok(records)
}

/// Id of the unsorted bookmarks container: a top-level child titled
/// "Other Bookmarks" or with the `unfiled_____` id, otherwise the root.
pub fn default_root_id(tree: &[BookmarkNode]) -> Result<String> {
    let root = tree
        .first()
        .ok_or_else(|| Error::NotFound("bookmark tree is empty".to_string()))?;

    let unsorted = root
        .children
        .iter()
        .find(|n| n.title == OTHER_BOOKMARKS_TITLE || n.id == UNFILED_ROOT_ID);

    Ok(unsorted.map(|n| n.id.clone()).unwrap_or_else(|| root.id.clone()))
}

/// Depth-first search for a node by id.
pub fn find_node<'a>(tree: &'a [BookmarkNode], id: &str) -> Option<&'a BookmarkNode> {
    for node in tree {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}
