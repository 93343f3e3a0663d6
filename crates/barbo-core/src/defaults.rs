//! Centralized default constants for barbo.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates and the CLI reference these constants instead of defining
//! their own magic numbers.

use std::path::PathBuf;

// =============================================================================
// SETTINGS
// =============================================================================

/// Days without access before a bookmark is reported as stale.
pub const OLD_BOOKMARK_THRESHOLD_DAYS: u32 = 365;

/// Number of bookmarks offered per review batch.
pub const REVIEW_COUNT: u32 = 5;

/// Days after a review before a bookmark becomes eligible again.
pub const REVIEW_INTERVAL_DAYS: u32 = 180;

/// Days an archived bookmark is kept before the startup purge deletes it.
pub const ARCHIVE_RETENTION_DAYS: u32 = 90;

/// Inclusive bounds accepted by the settings form.
pub const OLD_BOOKMARK_THRESHOLD_RANGE: (u32, u32) = (1, 3650);
pub const REVIEW_COUNT_RANGE: (u32, u32) = (1, 20);
pub const REVIEW_INTERVAL_RANGE: (u32, u32) = (1, 730);
pub const ARCHIVE_RETENTION_RANGE: (u32, u32) = (1, 365);

// =============================================================================
// ANALYSIS
// =============================================================================

/// Minimum URL similarity percentage for two bookmarks to share a cluster.
pub const SIMILARITY_THRESHOLD: f64 = 70.0;

/// Delimiter joining sorted bookmark ids into a dismissal key.
pub const GROUP_KEY_DELIMITER: &str = ",";

/// Number of combined tag suggestions surfaced as "recommended".
pub const RECOMMENDED_TAG_LIMIT: usize = 5;

// =============================================================================
// BOOKMARK TREE
// =============================================================================

/// Title of the folder that holds archived bookmarks.
pub const ARCHIVE_FOLDER_NAME: &str = "📁 Bookmark Archive";

/// Id of the unsorted root in Firefox-style trees.
pub const UNFILED_ROOT_ID: &str = "unfiled_____";

/// Title of the unsorted root in Chrome-style trees.
pub const OTHER_BOOKMARKS_TITLE: &str = "Other Bookmarks";

/// Separator used when rendering a bookmark's folder path.
pub const PATH_SEPARATOR: &str = " > ";

/// Path reported when a bookmark's ancestry cannot be resolved.
pub const UNKNOWN_PATH: &str = "Unknown";

// =============================================================================
// STORAGE
// =============================================================================

/// Storage key for the id → metadata map.
pub const KEY_BOOKMARK_METADATA: &str = "bookmarkMetadata";

/// Storage key for the settings object.
pub const KEY_SETTINGS: &str = "settings";

/// Storage key for the dismissed similar-group list.
pub const KEY_DISMISSED_GROUPS: &str = "dismissedSimilarGroups";

/// Format version written into exports.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Default data directory for the JSON file backend.
pub const DATA_DIR: &str = ".barbo";

/// File name of the JSON document inside the data directory.
pub const STORE_FILE_NAME: &str = "storage.json";

/// Buffer capacity of the bookmark event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// PROCESS CONFIGURATION
// =============================================================================

/// Process-level configuration, independent of the persisted user settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizerConfig {
    /// Directory holding the metadata store document.
    pub data_dir: PathBuf,
    /// Similarity threshold used by the similar-bookmark view.
    pub similarity_threshold: f64,
    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_DIR),
            similarity_threshold: SIMILARITY_THRESHOLD,
            json_logs: false,
        }
    }
}

impl OrganizerConfig {
    /// Load configuration from environment variables with fallback to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("BARBO_DATA_DIR") {
            if !val.trim().is_empty() {
                config.data_dir = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var("BARBO_SIMILARITY_THRESHOLD") {
            if let Ok(t) = val.parse::<f64>() {
                config.similarity_threshold = t.clamp(0.0, 100.0);
            } else {
                tracing::warn!(value = %val, "Invalid BARBO_SIMILARITY_THRESHOLD, using default");
            }
        }

        if let Ok(val) = std::env::var("LOG_FORMAT") {
            config.json_logs = val.eq_ignore_ascii_case("json");
        }

        config
    }

    /// Path of the JSON store document.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}
