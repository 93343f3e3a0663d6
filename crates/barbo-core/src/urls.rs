//! URL canonicalization used by duplicate detection and similarity.
//!
//! [`normalize_url`] produces a comparison key, not a valid URL: scheme and
//! `www.` are dropped, case is folded, and tracking parameters are removed.

use url::Url;

/// Query parameters that never change what a page shows.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
];

/// Canonical comparison form of `url`.
///
/// Lower-cases and trims, strips a leading `http://`/`https://` and `www.`,
/// one trailing `/`, `utm_*` tracking parameters and a dangling `?`. The
/// steps are repeated until the result is stable, so
/// `normalize_url(&normalize_url(u)) == normalize_url(u)` for every input.
pub fn normalize_url(url: &str) -> String {
    let mut current = normalize_pass(url);
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_pass(url: &str) -> String {
    let lowered = url.to_lowercase();
    let mut s = lowered.trim();

    s = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .unwrap_or(s);
    s = s.strip_prefix("www.").unwrap_or(s);
    s = s.strip_suffix('/').unwrap_or(s);

    let stripped = strip_tracking_params(s);
    match stripped.strip_suffix('?') {
        Some(rest) => rest.to_string(),
        None => stripped,
    }
}

/// Drop tracking parameters from the query. When the first parameter is
/// dropped, the next kept one moves up behind the `?`.
fn strip_tracking_params(s: &str) -> String {
    let Some((base, query)) = s.split_once('?') else {
        return s.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|param| !is_tracking_param(param))
        .collect();

    if kept.is_empty() {
        return base.to_string();
    }
    format!("{}?{}", base, kept.join("&"))
}

fn is_tracking_param(param: &str) -> bool {
    param
        .split_once('=')
        .map(|(key, _)| TRACKING_PARAMS.contains(&key))
        .unwrap_or(false)
}

/// Lower-cased hostname of `url`, or `None` when it does not parse or has
/// no host.
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    parsed.host_str().map(|h| h.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_url(""), "");
        assert_eq!(normalize_url("   "), "");
    }

    #[test]
    fn test_normalize_scheme_www_and_slash() {
        assert_eq!(normalize_url("https://www.Example.com/"), "example.com");
        assert_eq!(normalize_url("http://example.com/docs"), "example.com/docs");
        assert_eq!(normalize_url("  HTTPS://example.com/A/  "), "example.com/a");
    }

    #[test]
    fn test_normalize_strips_tracking_only_query() {
        assert_eq!(
            normalize_url("http://www.example.com/page?utm_source=news"),
            "example.com/page"
        );
        assert_eq!(
            normalize_url("https://example.com/page?utm_source=a&utm_medium=b"),
            "example.com/page"
        );
    }

    #[test]
    fn test_normalize_keeps_meaningful_params() {
        assert_eq!(
            normalize_url("https://example.com/page?id=1&utm_campaign=x"),
            "example.com/page?id=1"
        );
        assert_eq!(
            normalize_url("https://example.com/page?utm_source=x&id=1"),
            "example.com/page?id=1"
        );
        assert_eq!(
            normalize_url("https://example.com/page?ref=utm_source"),
            "example.com/page?ref=utm_source"
        );
    }

    #[test]
    fn test_normalize_slash_before_tracking_query() {
        assert_eq!(
            normalize_url("https://example.com/?utm_term=rust"),
            "example.com"
        );
    }

    #[test]
    fn test_normalize_non_http_scheme_untouched() {
        assert_eq!(normalize_url("ftp://Files.Example.com/"), "ftp://files.example.com");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "https://www.www.example.com//",
            "http://https://example.com/",
            "https://example.com/?utm_source=x&utm_term=y/",
            "HTTP://WWW.Rust-Lang.org/learn?utm_medium=social",
            "example.com/?",
            "",
        ];
        for input in inputs {
            let once = normalize_url(input);
            assert_eq!(normalize_url(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://Docs.Rust-Lang.org/std/"),
            Some("docs.rust-lang.org".to_string())
        );
        assert_eq!(extract_domain("not a url"), None);
        assert_eq!(extract_domain("mailto:someone@example.com"), None);
    }
}
