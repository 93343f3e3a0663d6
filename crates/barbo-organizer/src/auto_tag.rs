//! Tag suggestions over the stored collection.
//!
//! Wraps the rule-based and user-pattern engines from `barbo-analysis` with
//! access to the bookmark tree and the metadata store.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use barbo_analysis::{suggest_folder, suggest_tags, UserTagPatterns};
use barbo_core::defaults::RECOMMENDED_TAG_LIMIT;
use barbo_core::{
    extract_domain, load_bookmarks, BookmarkRecord, BookmarkStore, MetadataMap, OperationOutcome,
    Result,
};
use barbo_store::MetadataStore;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::outcome::settle;

/// Suggested tags for one bookmark, next to the tags it already has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSuggestion {
    pub bookmark_id: String,
    pub bookmark: BookmarkRecord,
    pub suggested_tags: Vec<String>,
    pub existing_tags: Vec<String>,
    /// Suggested tags the bookmark does not carry yet.
    pub new_tags: Vec<String>,
    pub folder_suggestion: Option<&'static str>,
}

impl TagSuggestion {
    fn build(bookmark: &BookmarkRecord, existing_tags: Vec<String>) -> Self {
        let suggested_tags = suggest_tags(bookmark);
        let new_tags = suggested_tags
            .iter()
            .filter(|t| !existing_tags.contains(t))
            .cloned()
            .collect();
        let folder_suggestion = suggest_folder(&suggested_tags);
        Self {
            bookmark_id: bookmark.id.clone(),
            bookmark: bookmark.clone(),
            suggested_tags,
            existing_tags,
            new_tags,
            folder_suggestion,
        }
    }
}

/// How much of the collection could be tagged automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoTagStats {
    pub total_bookmarks: usize,
    pub tagged_bookmarks: usize,
    pub untagged_bookmarks: usize,
    pub can_suggest_tags: usize,
    pub potential_new_tags: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: usize,
}

/// Knowledge-base and user-pattern suggestions combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSuggestions {
    /// User-pattern tags first, then knowledge-base tags, without repeats.
    pub all: Vec<String>,
    pub from_knowledge_base: Vec<String>,
    pub from_user_patterns: Vec<String>,
    pub recommended: Vec<String>,
}

impl SmartSuggestions {
    pub fn combine(from_user_patterns: Vec<String>, from_knowledge_base: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let all: Vec<String> = from_user_patterns
            .iter()
            .chain(from_knowledge_base.iter())
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();
        let recommended = all.iter().take(RECOMMENDED_TAG_LIMIT).cloned().collect();
        Self {
            all,
            from_knowledge_base,
            from_user_patterns,
            recommended,
        }
    }
}

/// Count bookmarks per domain, most common first. Ties are ordered by domain.
pub fn count_domains(bookmarks: &[BookmarkRecord]) -> Vec<DomainCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for bookmark in bookmarks {
        if let Some(domain) = extract_domain(bookmark.url_str()) {
            *counts.entry(domain).or_default() += 1;
        }
    }
    let mut domains: Vec<DomainCount> = counts
        .into_iter()
        .map(|(domain, count)| DomainCount { domain, count })
        .collect();
    domains.sort_by(|a, b| b.count.cmp(&a.count));
    domains
}

/// Suggests and applies tags across the collection.
#[derive(Clone)]
pub struct AutoTagger {
    bookmarks: Arc<dyn BookmarkStore>,
    metadata: Arc<MetadataStore>,
}

impl AutoTagger {
    pub fn new(bookmarks: Arc<dyn BookmarkStore>, metadata: Arc<MetadataStore>) -> Self {
        Self {
            bookmarks,
            metadata,
        }
    }

    pub async fn suggest_for_bookmark(&self, bookmark: &BookmarkRecord) -> Result<TagSuggestion> {
        let existing = self.metadata.metadata(&bookmark.id).await?.tags;
        Ok(TagSuggestion::build(bookmark, existing))
    }

    /// Suggestions for `bookmarks`, keeping only those that add a tag.
    pub async fn suggest_for_bookmarks(
        &self,
        bookmarks: &[BookmarkRecord],
    ) -> Result<Vec<TagSuggestion>> {
        let metadata = self.metadata.all_metadata().await?;
        Ok(suggestions_with_new_tags(bookmarks, &metadata))
    }

    /// Suggestions for every bookmark without tags.
    pub async fn auto_tag_untagged(&self) -> Result<Vec<TagSuggestion>> {
        let bookmarks = load_bookmarks(self.bookmarks.as_ref()).await?;
        let metadata = self.metadata.all_metadata().await?;
        let untagged: Vec<BookmarkRecord> = bookmarks
            .into_iter()
            .filter(|b| !metadata.get(&b.id).is_some_and(|m| m.has_tags()))
            .collect();
        let suggestions = suggestions_with_new_tags(&untagged, &metadata);
        debug!(
            input_count = untagged.len(),
            result_count = suggestions.len(),
            "Suggested tags for untagged bookmarks"
        );
        Ok(suggestions)
    }

    /// Suggestions for every bookmark, tagged or not.
    pub async fn auto_tag_all(&self) -> Result<Vec<TagSuggestion>> {
        let bookmarks = load_bookmarks(self.bookmarks.as_ref()).await?;
        let metadata = self.metadata.all_metadata().await?;
        Ok(suggestions_with_new_tags(&bookmarks, &metadata))
    }

    /// Union `tags` into the bookmark's tags. Applying twice changes nothing.
    pub async fn apply_tags<S: AsRef<str> + Sync>(&self, id: &str, tags: &[S]) -> Result<Vec<String>> {
        self.metadata.add_tags(id, tags).await
    }

    /// Apply tags to several bookmarks, one after the other.
    #[instrument(skip(self, assignments), fields(input_count = assignments.len()))]
    pub async fn apply_tags_to_bookmarks(
        &self,
        assignments: &[(String, Vec<String>)],
    ) -> Result<Vec<OperationOutcome>> {
        let mut outcomes = Vec::with_capacity(assignments.len());
        for (id, tags) in assignments {
            let result = self.apply_tags(id, tags.as_slice()).await.map(|_| None);
            outcomes.push(settle("apply_tags", id, result)?);
        }
        Ok(outcomes)
    }

    /// Apply the new tags of every suggestion.
    pub async fn apply_all_suggestions(
        &self,
        suggestions: &[TagSuggestion],
    ) -> Result<Vec<OperationOutcome>> {
        let assignments: Vec<(String, Vec<String>)> = suggestions
            .iter()
            .filter(|s| !s.new_tags.is_empty())
            .map(|s| (s.bookmark_id.clone(), s.new_tags.clone()))
            .collect();
        let outcomes = self.apply_tags_to_bookmarks(&assignments).await?;
        info!(
            op = "apply_suggestions",
            input_count = suggestions.len(),
            result_count = outcomes.iter().filter(|o| o.success).count(),
            "Applied tag suggestions"
        );
        Ok(outcomes)
    }

    pub async fn auto_tag_stats(&self) -> Result<AutoTagStats> {
        let bookmarks = load_bookmarks(self.bookmarks.as_ref()).await?;
        let metadata = self.metadata.all_metadata().await?;
        Ok(compute_stats(&bookmarks, &metadata))
    }

    /// Bookmark count per domain, most common first.
    pub async fn domain_stats(&self) -> Result<Vec<DomainCount>> {
        let bookmarks = load_bookmarks(self.bookmarks.as_ref()).await?;
        Ok(count_domains(&bookmarks))
    }

    pub async fn analyze_user_tagging_patterns(&self) -> Result<UserTagPatterns> {
        let bookmarks = load_bookmarks(self.bookmarks.as_ref()).await?;
        let metadata = self.metadata.all_metadata().await?;
        Ok(UserTagPatterns::analyze(&bookmarks, &metadata))
    }

    /// Tags the user already used on this bookmark's domain, most used first.
    pub async fn suggest_based_on_user_patterns(
        &self,
        bookmark: &BookmarkRecord,
    ) -> Result<Vec<String>> {
        if extract_domain(bookmark.url_str()).is_none() {
            return Ok(Vec::new());
        }
        let patterns = self.analyze_user_tagging_patterns().await?;
        Ok(patterns.suggest_for(bookmark))
    }

    pub async fn smart_suggestions(&self, bookmark: &BookmarkRecord) -> Result<SmartSuggestions> {
        let from_user_patterns = self.suggest_based_on_user_patterns(bookmark).await?;
        Ok(SmartSuggestions::combine(from_user_patterns, suggest_tags(bookmark)))
    }
}

fn suggestions_with_new_tags(
    bookmarks: &[BookmarkRecord],
    metadata: &MetadataMap,
) -> Vec<TagSuggestion> {
    bookmarks
        .iter()
        .filter(|b| b.is_leaf())
        .map(|b| {
            let existing = metadata.get(&b.id).map(|m| m.tags.clone()).unwrap_or_default();
            TagSuggestion::build(b, existing)
        })
        .filter(|s| !s.new_tags.is_empty())
        .collect()
}

fn compute_stats(bookmarks: &[BookmarkRecord], metadata: &MetadataMap) -> AutoTagStats {
    let mut stats = AutoTagStats {
        total_bookmarks: bookmarks.len(),
        ..AutoTagStats::default()
    };
    for bookmark in bookmarks {
        if metadata.get(&bookmark.id).is_some_and(|m| m.has_tags()) {
            stats.tagged_bookmarks += 1;
        } else {
            stats.untagged_bookmarks += 1;
        }
        if !suggest_tags(bookmark).is_empty() {
            stats.can_suggest_tags += 1;
        }
    }
    // Suggestable bookmarks beyond the tagged count, floored at zero.
    stats.potential_new_tags = stats.can_suggest_tags.saturating_sub(stats.tagged_bookmarks);
    stats
}
