//! Display text helpers shared by list and suggestion views.

/// Default truncation length for list descriptions.
pub const DEFAULT_TRUNCATE_CHARS: usize = 80;

/// Truncation length used by suggestion cards on small screens.
pub const SUGGESTION_TRUNCATE_CHARS: usize = 60;

/// Cuts `value` to `limit` characters and appends `...` when shortened.
///
/// Counts Unicode scalar values, so multi-byte text is never split.
pub fn truncate_text(value: &str, limit: usize) -> String {
    if value.is_empty() {
        return String::new();
    }
    let mut chars = value.char_indices();
    match chars.nth(limit) {
        None => value.to_string(),
        Some((cut, _)) => format!("{}...", &value[..cut]),
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_text;

    #[test]
    fn short_values_are_returned_unchanged() {
        assert_eq!(truncate_text("", 5), "");
        assert_eq!(truncate_text("abc", 3), "abc");
    }

    #[test]
    fn long_values_are_cut_on_char_boundaries() {
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("金閣寺と銀閣寺", 3), "金閣寺...");
    }
}
