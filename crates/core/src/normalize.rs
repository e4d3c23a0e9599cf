//! Text normalisation shared by station, alias and line-name lookups.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("failed to compile whitespace regex"));

/// Canonical lookup key: trimmed, lower-cased, inner whitespace collapsed.
pub fn normalize_key(input: &str) -> String {
    WHITESPACE_RE
        .replace_all(input.trim(), " ")
        .to_lowercase()
}

/// Case-insensitive comparison using [`normalize_key`].
pub fn names_match(a: &str, b: &str) -> bool {
    normalize_key(a) == normalize_key(b)
}
