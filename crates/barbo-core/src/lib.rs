//! # barbo-core
//!
//! Core types, traits, and helpers for the barbo bookmark organizer.
//!
//! This crate provides the data model shared by the store, analysis, and
//! organizer crates, plus the URL normalizer and tree flattening.

pub mod defaults;
pub mod error;
pub mod events;
pub mod models;
pub mod traits;
pub mod tree;
pub mod urls;

// Re-export commonly used types at crate root
pub use defaults::OrganizerConfig;
pub use error::{Error, Result};
pub use events::{BookmarkEvent, BookmarkEventBus};
pub use models::*;
pub use traits::*;
pub use tree::{default_root_id, find_node, flatten, load_bookmarks};
pub use urls::{extract_domain, normalize_url};
