//! Learning from the user's own tags.
//!
//! Tags the user has applied to bookmarks on a domain are suggested for
//! other bookmarks on the same domain, most frequent first.

use std::collections::{BTreeMap, HashMap};

use barbo_core::{extract_domain, BookmarkRecord, MetadataMap};
use serde::Serialize;

/// How often a tag was used on one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagFrequency {
    pub tag: String,
    pub count: usize,
}

/// Per-domain tag usage learned from tagged bookmarks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserTagPatterns {
    /// Domain to tag frequencies, tags in first-seen order.
    domains: BTreeMap<String, Vec<TagFrequency>>,
}

impl UserTagPatterns {
    /// Count tags per domain over every tagged bookmark that still exists.
    pub fn analyze(bookmarks: &[BookmarkRecord], metadata: &MetadataMap) -> Self {
        let by_id: HashMap<&str, &BookmarkRecord> =
            bookmarks.iter().map(|b| (b.id.as_str(), b)).collect();
        let mut domains: BTreeMap<String, Vec<TagFrequency>> = BTreeMap::new();

        for (id, meta) in metadata {
            if !meta.has_tags() {
                continue;
            }
            let Some(bookmark) = by_id.get(id.as_str()) else {
                continue;
            };
            let Some(domain) = extract_domain(bookmark.url_str()) else {
                continue;
            };

            let counts = domains.entry(domain).or_default();
            for tag in &meta.tags {
                match counts.iter_mut().find(|f| &f.tag == tag) {
                    Some(freq) => freq.count += 1,
                    None => counts.push(TagFrequency {
                        tag: tag.clone(),
                        count: 1,
                    }),
                }
            }
        }

        tracing::debug!(domain_count = domains.len(), "User tagging patterns analyzed");
        Self { domains }
    }

    /// Tag frequencies recorded for `domain`.
    pub fn for_domain(&self, domain: &str) -> &[TagFrequency] {
        self.domains.get(domain).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    /// Tags used on the bookmark's domain, most frequent first. Ties keep
    /// the order in which the tags were first seen.
    pub fn suggest_for(&self, bookmark: &BookmarkRecord) -> Vec<String> {
        let Some(domain) = extract_domain(bookmark.url_str()) else {
            return Vec::new();
        };
        let mut ranked: Vec<&TagFrequency> = self.for_domain(&domain).iter().collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.into_iter().map(|f| f.tag.clone()).collect()
    }
}
