//! Near-duplicate detection by edit distance over normalized URLs.
//!
//! Clustering is greedy and single-pass: each unassigned bookmark becomes the
//! base of a cluster and absorbs every later unassigned bookmark whose
//! normalized URL is similar enough to the base's. Bookmarks with an
//! identical normalized URL are left to duplicate detection.

use std::cmp::Ordering;
use std::collections::HashSet;

use barbo_core::{normalize_url, BookmarkRecord};
use serde::{Deserialize, Serialize};

pub use barbo_core::group_key;

/// A cluster member and its similarity to the cluster base.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarBookmark {
    #[serde(flatten)]
    pub record: BookmarkRecord,
    /// Percentage in `[0, 100]`; the base reports 100.
    pub similarity: f64,
}

/// A cluster of near-duplicate bookmarks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarGroup {
    /// Normalized URL of the base bookmark.
    pub base_url: String,
    pub base_bookmark: BookmarkRecord,
    /// Members sorted by similarity, highest first.
    pub bookmarks: Vec<SimilarBookmark>,
    /// Member ids in the same order as `bookmarks`.
    pub bookmark_ids: Vec<String>,
    /// Mean member similarity rounded to an integer.
    pub average_similarity: u32,
    pub count: usize,
}

impl SimilarGroup {
    /// Dismissal key of this cluster.
    pub fn key(&self) -> String {
        group_key(&self.bookmark_ids)
    }
}

/// Field to order similar groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarSortKey {
    #[default]
    Similarity,
    Count,
    Title,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Percentage similarity of two strings from their Levenshtein distance.
///
/// `100 * (max_len - distance) / max_len`, rounded to two decimals, with
/// lengths counted in characters. Identical strings score 100 and an empty
/// input scores 0.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 100.0;
    }

    let distance = strsim::levenshtein(a, b);
    let max_len = a.chars().count().max(b.chars().count());
    let score = (max_len - distance) as f64 / max_len as f64 * 100.0;
    (score * 100.0).round() / 100.0
}

/// Cluster leaf bookmarks whose normalized URLs are at least `threshold`
/// percent similar to a cluster base.
///
/// No bookmark appears in two clusters. Clusters whose exact id set is in
/// `dismissed` are dropped; their members stay assigned. Clusters are
/// ordered by average similarity, highest first.
pub fn find_similar_bookmarks(
    bookmarks: &[BookmarkRecord],
    threshold: f64,
    dismissed: &HashSet<String>,
) -> Vec<SimilarGroup> {
    let leaves: Vec<&BookmarkRecord> = bookmarks.iter().filter(|b| b.is_leaf()).collect();
    let normalized: Vec<String> = leaves.iter().map(|b| normalize_url(b.url_str())).collect();
    let mut assigned = vec![false; leaves.len()];
    let mut groups = Vec::new();
    let mut dismissed_count = 0usize;

    for i in 0..leaves.len() {
        if assigned[i] {
            continue;
        }

        let mut members: Vec<(usize, f64)> = vec![(i, 100.0)];
        for j in (i + 1)..leaves.len() {
            if assigned[j] || normalized[i] == normalized[j] {
                continue;
            }
            let score = similarity(&normalized[i], &normalized[j]);
            if score >= threshold {
                tracing::trace!(
                    base_id = %leaves[i].id,
                    bookmark_id = %leaves[j].id,
                    similarity = score,
                    "Bookmark joins similar cluster"
                );
                members.push((j, score));
                assigned[j] = true;
            }
        }

        if members.len() < 2 {
            continue;
        }
        assigned[i] = true;

        members.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let members: Vec<SimilarBookmark> = members
            .into_iter()
            .map(|(idx, score)| SimilarBookmark {
                record: leaves[idx].clone(),
                similarity: score,
            })
            .collect();
        let bookmark_ids: Vec<String> = members.iter().map(|m| m.record.id.clone()).collect();

        if dismissed.contains(&group_key(&bookmark_ids)) {
            dismissed_count += 1;
            continue;
        }

        let total: f64 = members.iter().map(|m| m.similarity).sum();
        let average = (total / members.len() as f64).round() as u32;

        groups.push(SimilarGroup {
            base_url: normalized[i].clone(),
            base_bookmark: leaves[i].clone(),
            count: members.len(),
            bookmarks: members,
            bookmark_ids,
            average_similarity: average,
        });
    }

    groups.sort_by(|a, b| b.average_similarity.cmp(&a.average_similarity));

    tracing::debug!(
        input_count = leaves.len(),
        group_count = groups.len(),
        dismissed_count,
        threshold,
        "Similarity scan complete"
    );
    groups
}

/// Reorder groups for display. The sort is stable.
pub fn sort_similar_groups(groups: &mut [SimilarGroup], key: SimilarSortKey, order: SortOrder) {
    groups.sort_by(|a, b| {
        let ordering = match key {
            SimilarSortKey::Similarity => a.average_similarity.cmp(&b.average_similarity),
            SimilarSortKey::Count => a.count.cmp(&b.count),
            SimilarSortKey::Title => compare_text(&a.base_bookmark.title, &b.base_bookmark.title),
            SimilarSortKey::Url => compare_text(&a.base_url, &b.base_url),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, url: &str) -> BookmarkRecord {
        BookmarkRecord::new(id, url, format!("Title {id}"), "root")
    }

    fn no_dismissed() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn test_similarity_basics() {
        assert_eq!(similarity("abc", "abc"), 100.0);
        assert_eq!(similarity("", "abc"), 0.0);
        assert_eq!(similarity("abc", ""), 0.0);
        assert_eq!(similarity("", ""), 0.0);
        // kitten -> sitting: distance 3 over 7 characters
        assert_eq!(similarity("kitten", "sitting"), 57.14);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let pairs = [
            ("example.com/a", "example.com/b"),
            ("github.com/rust-lang/rust", "github.com/rust-lang/cargo"),
            ("x", "yyyy"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn test_similarity_counts_characters() {
        // One substitution over four characters.
        assert_eq!(similarity("café", "cafe"), 75.0);
    }

    #[test]
    fn test_clusters_similar_urls() {
        let bookmarks = vec![
            rec("1", "https://example.com/docs/page1"),
            rec("2", "https://example.com/docs/page2"),
            rec("3", "https://totally-different.org"),
            rec("4", "https://example.com/docs/page3"),
        ];
        let groups = find_similar_bookmarks(&bookmarks, 70.0, &no_dismissed());
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(group.base_url, "example.com/docs/page1");
        assert_eq!(group.base_bookmark.id, "1");
        assert_eq!(group.count, 3);
        assert_eq!(group.bookmarks[0].similarity, 100.0);
        assert_eq!(group.bookmark_ids, vec!["1", "2", "4"]);
    }

    #[test]
    fn test_exact_duplicates_are_skipped() {
        let bookmarks = vec![
            rec("1", "https://example.com/a"),
            rec("2", "http://www.example.com/a/"),
        ];
        assert!(find_similar_bookmarks(&bookmarks, 50.0, &no_dismissed()).is_empty());
    }

    #[test]
    fn test_no_bookmark_in_two_clusters() {
        let bookmarks = vec![
            rec("1", "https://aaaa.example/1"),
            rec("2", "https://aaaa.example/2"),
            rec("3", "https://aaaa.example/3"),
            rec("4", "https://bbbb.example/1"),
            rec("5", "https://bbbb.example/2"),
        ];
        let groups = find_similar_bookmarks(&bookmarks, 80.0, &no_dismissed());
        let mut seen = HashSet::new();
        for group in &groups {
            for id in &group.bookmark_ids {
                assert!(seen.insert(id.clone()), "{id} appears twice");
            }
        }
    }

    #[test]
    fn test_dismissed_exact_set_is_hidden() {
        let bookmarks = vec![
            rec("1", "https://example.com/docs/page1"),
            rec("2", "https://example.com/docs/page2"),
        ];
        let groups = find_similar_bookmarks(&bookmarks, 70.0, &no_dismissed());
        assert_eq!(groups.len(), 1);

        let dismissed: HashSet<String> = [groups[0].key()].into_iter().collect();
        assert!(find_similar_bookmarks(&bookmarks, 70.0, &dismissed).is_empty());

        // A new member changes the id set, so the cluster resurfaces.
        let mut grown = bookmarks.clone();
        grown.push(rec("3", "https://example.com/docs/page3"));
        let groups = find_similar_bookmarks(&grown, 70.0, &dismissed);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 3);
    }

    #[test]
    fn test_groups_sorted_by_average_desc() {
        let bookmarks = vec![
            rec("1", "https://short.example/ab"),
            rec("2", "https://short.example/cd"),
            rec("3", "https://a-very-long-domain-name.example/path/one"),
            rec("4", "https://a-very-long-domain-name.example/path/two"),
        ];
        let groups = find_similar_bookmarks(&bookmarks, 60.0, &no_dismissed());
        assert_eq!(groups.len(), 2);
        assert!(groups[0].average_similarity >= groups[1].average_similarity);
        assert_eq!(groups[0].base_bookmark.id, "3");
    }

    #[test]
    fn test_sort_similar_groups() {
        let bookmarks = vec![
            rec("1", "https://zeta.example/page/1"),
            rec("2", "https://zeta.example/page/2"),
            rec("3", "https://alpha.example/x/1"),
            rec("4", "https://alpha.example/x/2"),
            rec("5", "https://alpha.example/x/3"),
        ];
        let mut groups = find_similar_bookmarks(&bookmarks, 70.0, &no_dismissed());
        assert_eq!(groups.len(), 2);

        sort_similar_groups(&mut groups, SimilarSortKey::Url, SortOrder::Asc);
        assert_eq!(groups[0].base_url, "alpha.example/x/1");

        sort_similar_groups(&mut groups, SimilarSortKey::Count, SortOrder::Asc);
        assert_eq!(groups[0].count, 2);

        sort_similar_groups(&mut groups, SimilarSortKey::Title, SortOrder::Desc);
        assert_eq!(groups[0].base_bookmark.title, "Title 3");
    }
}
