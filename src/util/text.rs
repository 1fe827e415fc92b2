use std::borrow::Cow;

/// Ellipsis appended whenever text or markup is cut short
pub const ELLIPSIS: &str = "...";

/// Collapses every run of whitespace into a single space and trims both ends.
///
/// # Examples
///
/// ```
/// use inkfeed::util::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  Hello \n\t world  "), "Hello world");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of whitespace-separated words in `s`.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Caps text at `max_words` words.
///
/// The result is always whitespace-collapsed. When words were dropped, the
/// first `max_words` words are joined with single spaces and [`ELLIPSIS`] is
/// appended directly after the last kept word.
///
/// # Examples
///
/// ```
/// use inkfeed::util::truncate_words;
///
/// assert_eq!(truncate_words("one two three", 5), "one two three");
/// assert_eq!(truncate_words("one two three", 2), "one two...");
/// ```
pub fn truncate_words(s: &str, max_words: usize) -> String {
    let mut words = s.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(max_words).collect();
    let mut out = kept.join(" ");
    if words.next().is_some() {
        out.push_str(ELLIPSIS);
    }
    out
}

/// Cuts `s` down to at most `max_chars` characters, never splitting a UTF-8
/// code point.
///
/// Returns `Cow::Borrowed` when the string already fits. No ellipsis is
/// added; callers decide how to mark the cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(s[..byte_idx].to_string()),
        None => Cow::Borrowed(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  b\n\nc"), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  one  "), 1);
        assert_eq!(word_count("one two\tthree\nfour"), 4);
    }

    #[test]
    fn test_truncate_words_exact_fit_has_no_ellipsis() {
        assert_eq!(truncate_words("a b c", 3), "a b c");
    }

    #[test]
    fn test_truncate_words_zero_cap() {
        assert_eq!(truncate_words("a b", 0), "...");
        assert_eq!(truncate_words("", 0), "");
    }

    #[test]
    fn test_truncate_chars_fits_is_borrowed() {
        let result = truncate_chars("short", 10);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "short");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        // Must count chars, not bytes
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    proptest! {
        #[test]
        fn prop_word_cap_keeps_exactly_first_words(
            words in prop::collection::vec("[a-zA-Z0-9]{1,8}", 61..200)
        ) {
            let input = words.join(" ");
            let out = truncate_words(&input, 60);
            prop_assert!(out.ends_with(ELLIPSIS));
            let body = &out[..out.len() - ELLIPSIS.len()];
            prop_assert_eq!(body, words[..60].join(" "));
        }

        #[test]
        fn prop_short_input_is_only_collapsed(
            words in prop::collection::vec("[a-z]{1,6}", 0..=60)
        ) {
            let input = words.join("  \n ");
            prop_assert_eq!(truncate_words(&input, 60), words.join(" "));
        }
    }
}
