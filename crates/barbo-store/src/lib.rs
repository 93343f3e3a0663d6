//! # barbo-store
//!
//! Persistence layer for the barbo bookmark organizer.
//!
//! This crate provides:
//! - Key-value backends (in-memory and a single JSON document on disk)
//! - [`MetadataStore`], the typed store for bookmark metadata, settings,
//!   and dismissed similar groups
//! - [`InMemoryBookmarkStore`], a host bookmark tree with change events
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use barbo_store::{JsonFileBackend, MetadataStore};
//!
//! let store = MetadataStore::new(Arc::new(JsonFileBackend::new(".barbo/storage.json")));
//! store.add_tags("42", &["rust", "docs"]).await?;
//! ```

pub mod backend;
pub mod bookmarks;
pub mod metadata;

pub use backend::{JsonFileBackend, MemoryBackend};
pub use bookmarks::InMemoryBookmarkStore;
pub use metadata::MetadataStore;

// Re-export core types for convenience
pub use barbo_core::{Error, KeyValueBackend, Result};
