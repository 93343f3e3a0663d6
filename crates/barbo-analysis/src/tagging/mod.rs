//! Heuristic tag inference.
//!
//! - [`knowledge`]: curated domain, path, subdomain, TLD and keyword tables
//! - [`inference`]: rule-based tag and folder suggestions
//! - [`patterns`]: suggestions learned from the user's existing tags

pub mod inference;
pub mod knowledge;
pub mod patterns;

pub use inference::{clean_domain, suggest_folder, suggest_tags};
pub use patterns::{TagFrequency, UserTagPatterns};
