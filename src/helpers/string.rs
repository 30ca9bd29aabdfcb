//! Text cleaning utilities for comparing human-typed sheet values.
//! Names copied between spreadsheets routinely pick up non-breaking spaces,
//! bidi marks and zero-width characters that are invisible on screen.

use regex::Regex;
use std::sync::LazyLock;

/// Invisible and formatting characters plus any whitespace.
static INVISIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{00A0}\u{200B}-\u{200F}\u{202A}-\u{202E}\u{2060}\u{2066}-\u{2069}\u{FEFF}\p{Cf}\s]+")
        .expect("Hardcode regex pattern")
});

/// Removes invisible characters, format control characters and all whitespace.
pub fn clean_text(value: &str) -> String {
    INVISIBLE.replace_all(value, "").into_owned()
}

/// Canonical comparison key for a person name.
/// No case or width folding is applied.
pub fn normalize_name(value: &str) -> String {
    clean_text(value)
}

/// Returns true if both names normalize to the same key.
pub fn names_match(left: &str, right: &str) -> bool {
    normalize_name(left) == normalize_name(right)
}

/// Returns true if the value holds nothing but invisible characters or whitespace.
pub fn is_blank(value: &str) -> bool {
    clean_text(value).is_empty()
}
