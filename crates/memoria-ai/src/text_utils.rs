//! Shared text utility functions.

/// Truncate `s` to at most `max_chars` characters, appending an in-band note
/// with the number of characters cut.
///
/// `None` or `Some(0)` disables truncation. Lengths are counted in chars so a
/// cut never lands inside a multi-byte sequence.
pub fn truncate_with_note(s: &str, max_chars: Option<usize>) -> String {
    let Some(max) = max_chars.filter(|max| *max > 0) else {
        return s.to_string();
    };

    let total = s.chars().count();
    if total <= max {
        return s.to_string();
    }

    let end = s
        .char_indices()
        .nth(max)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    format!("{}\n... [truncated {} characters]", &s[..end], total - max)
}

/// Upper-case the first character of `s`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_with_omitted_count() {
        assert_eq!(
            truncate_with_note("0123456789ABCDE", Some(10)),
            "0123456789\n... [truncated 5 characters]"
        );
    }

    #[test]
    fn exact_length_unchanged() {
        assert_eq!(truncate_with_note("0123456789", Some(10)), "0123456789");
    }

    #[test]
    fn zero_or_none_disables() {
        assert_eq!(truncate_with_note("abcdef", Some(0)), "abcdef");
        assert_eq!(truncate_with_note("abcdef", None), "abcdef");
    }

    #[test]
    fn counts_chars_not_bytes() {
        assert_eq!(
            truncate_with_note("你好世界", Some(2)),
            "你好\n... [truncated 2 characters]"
        );
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("assistant"), "Assistant");
        assert_eq!(capitalize(""), "");
    }
}
