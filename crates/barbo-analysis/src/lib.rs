//! # barbo-analysis
//!
//! Pure analysis engine for the barbo bookmark organizer.
//!
//! This crate provides:
//! - Exact-duplicate grouping by normalized URL
//! - Greedy near-duplicate clustering by Levenshtein similarity
//! - Random review selection and staleness detection
//! - Rule-based and user-pattern tag inference
//!
//! Every function here works on flattened [`barbo_core::BookmarkRecord`]s
//! and a metadata snapshot; nothing touches storage.
//!
//! ## Example
//!
//! ```ignore
//! use barbo_analysis::{find_duplicates, find_similar_bookmarks};
//!
//! let duplicates = find_duplicates(&records);
//! let similar = find_similar_bookmarks(&records, 70.0, &dismissed);
//! ```

pub mod duplicates;
pub mod review;
pub mod similarity;
pub mod tagging;

pub use duplicates::{find_duplicates, redundant_count, DuplicateGroup};
pub use review::{due_for_review, find_stale_bookmarks, select_for_review, StaleBookmark};
pub use similarity::{
    find_similar_bookmarks, group_key, similarity, sort_similar_groups, SimilarBookmark,
    SimilarGroup, SimilarSortKey, SortOrder,
};
pub use tagging::{suggest_folder, suggest_tags, UserTagPatterns};
