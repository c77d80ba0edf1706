//! Text normalisation shared by search and rule matching
//!
//! All free-text comparison in the crate is case-insensitive substring
//! matching. Both sides go through `fold` so the rules stay in one place.

/// Lower-case a string for comparison
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Normalise a user query: lower-cased, `None` only for the empty string
///
/// Whitespace is part of the query; `"tunggal "` needs the trailing space.
pub fn normalize_query(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(fold(raw))
    }
}

/// Case-insensitive substring test against an already-folded needle
pub fn contains_folded(haystack: &str, needle_folded: &str) -> bool {
    fold(haystack).contains(needle_folded)
}

/// True if the string has visible content
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
