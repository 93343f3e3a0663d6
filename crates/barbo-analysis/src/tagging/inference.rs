//! Rule-based tag and folder suggestions from URL and title signals.

use std::collections::BTreeSet;

use barbo_core::BookmarkRecord;
use url::Url;

use super::knowledge::{
    FOLDER_PRIORITY, KEYWORD_PATTERNS, KNOWN_DOMAINS, PATH_PATTERNS, SUBDOMAIN_PATTERNS,
    TLD_PATTERNS,
};

/// Suggested tags for a bookmark, sorted and unique.
///
/// Signals are unioned from the curated domain table, the subdomain table
/// (hosts with more than two labels), the TLD table, path substrings, title
/// keywords, and a bare domain tag. An unparsable URL contributes nothing,
/// so only title keywords apply.
pub fn suggest_tags(bookmark: &BookmarkRecord) -> Vec<String> {
    let mut tags: BTreeSet<&str> = BTreeSet::new();
    let mut domain_tag: Option<String> = None;

    match Url::parse(bookmark.url_str()) {
        Ok(url) => {
            let path = url.path().to_lowercase();

            if let Some(host) = url.host_str().filter(|h| !h.is_empty()) {
                let host = host.to_lowercase();
                tags.extend(domain_signals(&host, &path));
                domain_tag = clean_domain(&host);
            }

            for (pattern, pattern_tags) in PATH_PATTERNS {
                if path.contains(pattern) {
                    tags.extend(pattern_tags.iter());
                }
            }
        }
        Err(e) => {
            tracing::trace!(bookmark_id = %bookmark.id, error = %e, "URL not parsable, title signals only");
        }
    }

    tags.extend(title_signals(&bookmark.title));

    let mut out: BTreeSet<String> = tags.into_iter().map(str::to_string).collect();
    if let Some(domain) = domain_tag {
        out.insert(domain);
    }
    out.into_iter().collect()
}

/// Tags from the domain, subdomain and TLD tables.
fn domain_signals(host: &str, path: &str) -> Vec<&'static str> {
    let mut tags: Vec<&'static str> = Vec::new();

    if let Some(known) = KNOWN_DOMAINS.get(host) {
        tags.extend(known.iter());
    }
    if let Some(segment) = path.trim_start_matches('/').split('/').next() {
        if !segment.is_empty() {
            let key = format!("{}/{}", host, segment);
            if let Some(known) = KNOWN_DOMAINS.get(key.as_str()) {
                tags.extend(known.iter());
            }
        }
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() > 2 {
        if let Some(sub) = SUBDOMAIN_PATTERNS.get(labels[0]) {
            tags.extend(sub.iter());
        }
    }
    if labels.len() >= 2 {
        if let Some(last) = labels.last() {
            let tld = format!(".{}", last);
            if let Some(tld_tags) = TLD_PATTERNS.get(tld.as_str()) {
                tags.extend(tld_tags.iter());
            }
        }
    }

    tags
}

fn title_signals(title: &str) -> Vec<&'static str> {
    if title.is_empty() {
        return Vec::new();
    }
    let lower = title.to_lowercase();
    KEYWORD_PATTERNS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .flat_map(|(_, tags)| tags.iter().copied())
        .collect()
}

/// Host with a leading `www.` and the final label removed
/// (`www.github.com` becomes `github`).
pub fn clean_domain(host: &str) -> Option<String> {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let clean = match host.rfind('.') {
        Some(pos) => &host[..pos],
        None => host,
    };
    (!clean.is_empty()).then(|| clean.to_string())
}

/// Folder for the first tag that has one in the priority table.
pub fn suggest_folder<S: AsRef<str>>(tags: &[S]) -> Option<&'static str> {
    tags.iter()
        .find_map(|tag| FOLDER_PRIORITY.get(tag.as_ref()).copied())
}
