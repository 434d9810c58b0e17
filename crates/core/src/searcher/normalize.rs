//! Query text normalization.

/// Longest query forwarded to the indexer, in characters.
pub const MAX_QUERY_TEXT_LENGTH: usize = 255;

/// Normalize user text into an indexer query: cap the length, lower-case, trim.
pub fn normalize_query(text: &str) -> String {
    let capped: String = text.chars().take(MAX_QUERY_TEXT_LENGTH).collect();
    capped.to_lowercase().trim().to_string()
}
