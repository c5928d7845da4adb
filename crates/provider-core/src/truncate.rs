//! Reply truncation to the platform message-size ceiling.

/// Truncate `text` to at most `limit` characters, appending an ellipsis
/// when anything was cut.
///
/// The cut is made on a character boundary, so multi-byte content is safe.
/// Chat platforms reject over-long messages outright; truncating client-side
/// keeps the reply deliverable.
pub fn truncate_reply(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(limit).collect();
    cut.push_str("...");
    cut
}
