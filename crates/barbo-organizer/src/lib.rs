//! # barbo-organizer
//!
//! Services of the barbo bookmark organizer.
//!
//! This crate provides:
//! - Archiving and restoring bookmarks, with retention-based purging
//! - Random review batches and a working review queue
//! - Collection-wide tag suggestions and bulk tag application
//! - Metadata maintenance and event-driven metadata sync
//! - Tree operations (remove, move, path, search) with per-item outcomes
//! - The `barbo` command-line tool
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use barbo_organizer::Organizer;
//! use barbo_store::{InMemoryBookmarkStore, MetadataStore};
//!
//! let tree = Arc::new(InMemoryBookmarkStore::from_json_file("bookmarks.json").await?);
//! let organizer = Organizer::new(tree, Arc::new(MetadataStore::in_memory()), 70.0);
//!
//! organizer.maintenance().on_startup().await?;
//! let outcome = organizer.archive().archive("42").await?;
//! let overview = organizer.overview().await?;
//! ```

pub mod archive;
pub mod auto_tag;
pub mod bookmarks;
pub mod maintenance;
pub mod organizer;
mod outcome;
pub mod review;
pub mod sync;

pub use archive::{find_expired_archives, ArchiveManager, ArchivedBookmark, ExpiredArchive};
pub use auto_tag::{AutoTagStats, AutoTagger, DomainCount, SmartSuggestions, TagSuggestion};
pub use bookmarks::BookmarkOperations;
pub use maintenance::{Maintenance, StartupReport};
pub use organizer::{CollectionOverview, Organizer};
pub use review::{ReviewQueue, ReviewScheduler};
pub use sync::MetadataSync;

pub use barbo_core::{Error, OperationOutcome, Result};
