//! Character-safe truncation helpers
//!
//! All limits count Unicode scalar values so multi-byte text never splits
//! inside a code point.

/// Return at most the first `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate `s` to `max` characters and append `suffix` if anything was cut.
pub fn truncate_with_suffix(s: &str, max: usize, suffix: &str) -> String {
    let head = truncate_chars(s, max);
    if head.len() < s.len() {
        format!("{}{}", head, suffix)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_short_input_untouched() {
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn truncate_chars_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("ééééé", 3), "ééé");
    }

    #[test]
    fn truncate_with_suffix_only_when_cut() {
        assert_eq!(truncate_with_suffix("hello", 5, "..."), "hello");
        assert_eq!(truncate_with_suffix("hello!", 5, "..."), "hello...");
    }
}
