//! Review selection and staleness detection.

use barbo_core::{BookmarkRecord, MetadataMap};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// A bookmark that has not been opened within the staleness threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleBookmark {
    pub id: String,
    /// Last access, or the creation time for never-opened bookmarks.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    pub days_since_access: i64,
}

/// Leaf bookmarks due for review, in input order.
///
/// A bookmark is due when it is not archived and was never reviewed or was
/// last reviewed strictly before `now - interval_days`.
pub fn due_for_review(
    bookmarks: &[BookmarkRecord],
    metadata: &MetadataMap,
    interval_days: u32,
    now: DateTime<Utc>,
) -> Vec<BookmarkRecord> {
    let threshold = now - Duration::days(i64::from(interval_days));

    bookmarks
        .iter()
        .filter(|b| b.is_leaf())
        .filter(|b| match metadata.get(&b.id) {
            None => true,
            Some(meta) if meta.is_archived() => false,
            Some(meta) => meta.last_reviewed.map_or(true, |t| t < threshold),
        })
        .cloned()
        .collect()
}

/// Pick up to `count` random bookmarks that are due for review.
///
/// Eligible bookmarks (see [`due_for_review`]) are shuffled uniformly with
/// `rng` before truncation.
pub fn select_for_review<R: Rng + ?Sized>(
    bookmarks: &[BookmarkRecord],
    metadata: &MetadataMap,
    count: usize,
    interval_days: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<BookmarkRecord> {
    let mut eligible = due_for_review(bookmarks, metadata, interval_days, now);

    let eligible_count = eligible.len();
    eligible.shuffle(rng);
    eligible.truncate(count);

    tracing::debug!(
        input_count = bookmarks.len(),
        eligible_count,
        result_count = eligible.len(),
        interval_days,
        "Review batch selected"
    );
    eligible
}

/// Metadata records whose last activity is older than `threshold_days`.
///
/// Last activity is the last access time, falling back to the creation
/// time. Results are in bookmark id order.
pub fn find_stale_bookmarks(
    metadata: &MetadataMap,
    threshold_days: u32,
    now: DateTime<Utc>,
) -> Vec<StaleBookmark> {
    let threshold = now - Duration::days(i64::from(threshold_days));

    metadata
        .iter()
        .filter_map(|(id, meta)| {
            let last = meta.last_activity();
            (last < threshold).then(|| StaleBookmark {
                id: id.clone(),
                last_accessed: last,
                access_count: meta.access_count,
                days_since_access: (now - last).num_days(),
            })
        })
        .collect()
}
