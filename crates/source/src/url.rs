//! URL helpers shared by the gateway.

use regex::Regex;
use std::sync::LazyLock;

/// Scheme-qualified (`https://…`) or protocol-relative (`//…`) URLs.
static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.\-]*:)?//").unwrap());

/// Whether `path` already is an absolute URL and needs no resolution.
///
/// ```
/// use tome_source::is_absolute_url;
/// assert!(is_absolute_url("https://example.com/novel"));
/// assert!(is_absolute_url("//cdn.example.com/cover.jpg"));
/// assert!(!is_absolute_url("/novel/1"));
/// assert!(!is_absolute_url("novel/1"));
/// ```
pub fn is_absolute_url(path: &str) -> bool {
    ABSOLUTE_URL.is_match(path)
}

/// Fallback resolution for sources without a resolver: plain concatenation.
pub(crate) fn join_site(site: &str, path: &str) -> String {
    format!("{site}{path}")
}
