use itertools::Itertools;

/// Token returned for empty or absent input
pub const UNKNOWN: &str = "unknown";

/// Lowercase and join whitespace-separated words with `_`.
///
/// Total: blank input yields [`UNKNOWN`].
pub fn normalize(raw: &str) -> String {
    let joined = raw.split_whitespace().map(str::to_lowercase).join("_");
    if joined.is_empty() {
        UNKNOWN.to_string()
    } else {
        joined
    }
}

/// Lowercased letters only; may be empty
pub fn alpha_only(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// First and last whitespace-delimited tokens, lowercased.
/// The last token is empty for single-word names.
pub fn split_name(full_name: &str) -> (String, String) {
    let mut tokens = full_name.split_whitespace();
    let first = tokens.next().map(str::to_lowercase).unwrap_or_default();
    let last = tokens.last().map(str::to_lowercase).unwrap_or_default();
    (first, last)
}

/// Storage-safe filename: ASCII alphanumerics, `_`, `.` and `-` survive,
/// case is kept. Blank results yield [`UNKNOWN`].
pub fn clean_filename(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    if cleaned.is_empty() {
        UNKNOWN.to_string()
    } else {
        cleaned
    }
}
