//! Exact-duplicate detection by normalized URL.

use std::collections::HashMap;

use barbo_core::{normalize_url, BookmarkRecord};
use serde::Serialize;

/// Bookmarks sharing one normalized URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub normalized_url: String,
    /// Raw URL of the first bookmark seen with this normalized form.
    pub original_url: String,
    pub count: usize,
    /// Members in discovery order.
    pub bookmarks: Vec<BookmarkRecord>,
}

/// Group leaf bookmarks by normalized URL and keep groups of two or more.
///
/// Groups come back in the order their first member was seen.
pub fn find_duplicates(bookmarks: &[BookmarkRecord]) -> Vec<DuplicateGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, Vec<BookmarkRecord>)> = Vec::new();

    for bookmark in bookmarks.iter().filter(|b| b.is_leaf()) {
        let key = normalize_url(bookmark.url_str());
        match index.get(&key) {
            Some(&pos) => buckets[pos].1.push(bookmark.clone()),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push((key, vec![bookmark.clone()]));
            }
        }
    }

    let groups: Vec<DuplicateGroup> = buckets
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(normalized_url, members)| DuplicateGroup {
            original_url: members[0].url_str().to_string(),
            count: members.len(),
            normalized_url,
            bookmarks: members,
        })
        .collect();

    tracing::debug!(
        input_count = bookmarks.len(),
        group_count = groups.len(),
        "Duplicate scan complete"
    );
    groups
}

/// Number of bookmarks that could be deleted while keeping one per group.
pub fn redundant_count(groups: &[DuplicateGroup]) -> usize {
    groups.iter().map(|g| g.count.saturating_sub(1)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, url: &str) -> BookmarkRecord {
        BookmarkRecord::new(id, url, id, "root")
    }

    #[test]
    fn test_groups_by_normalized_url() {
        let bookmarks = vec![
            rec("1", "https://example.com/"),
            rec("2", "https://rust-lang.org"),
            rec("3", "http://www.example.com"),
            rec("4", "https://EXAMPLE.com/?utm_source=feed"),
        ];

        let groups = find_duplicates(&bookmarks);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.normalized_url, "example.com");
        assert_eq!(group.original_url, "https://example.com/");
        assert_eq!(group.count, 3);
        let ids: Vec<&str> = group.bookmarks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let bookmarks = vec![
            rec("1", "https://b.example"),
            rec("2", "https://a.example"),
            rec("3", "https://a.example/"),
            rec("4", "https://b.example/"),
        ];
        let groups = find_duplicates(&bookmarks);
        let urls: Vec<&str> = groups.iter().map(|g| g.normalized_url.as_str()).collect();
        assert_eq!(urls, vec!["b.example", "a.example"]);
    }

    #[test]
    fn test_every_group_has_two_members_and_one_key() {
        let bookmarks = vec![
            rec("1", "https://x.example/a"),
            rec("2", "https://x.example/b"),
            rec("3", "https://x.example/a/"),
            rec("4", "https://x.example/c"),
        ];
        for group in find_duplicates(&bookmarks) {
            assert!(group.count >= 2);
            assert_eq!(group.count, group.bookmarks.len());
            assert!(group
                .bookmarks
                .iter()
                .all(|b| normalize_url(b.url_str()) == group.normalized_url));
        }
    }

    #[test]
    fn test_folders_are_ignored() {
        let folder = BookmarkRecord {
            id: "f".into(),
            url: None,
            title: "Folder".into(),
            parent_id: None,
        };
        let bookmarks = vec![folder.clone(), folder, rec("1", "https://a.example")];
        assert!(find_duplicates(&bookmarks).is_empty());
    }

    #[test]
    fn test_redundant_count() {
        let bookmarks = vec![
            rec("1", "https://a.example"),
            rec("2", "https://a.example/"),
            rec("3", "http://a.example"),
            rec("4", "https://b.example"),
            rec("5", "https://www.b.example"),
        ];
        let groups = find_duplicates(&bookmarks);
        assert_eq!(redundant_count(&groups), 3);
        assert_eq!(redundant_count(&[]), 0);
    }
}
