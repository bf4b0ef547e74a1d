//! Text canonicalization shared by answer acceptance, find-list matching,
//! and free-text corpus search.

/// Reduces text to its canonical comparison form.
///
/// Lowercases ASCII letters, drops every character outside `[a-z0-9\s]`,
/// collapses runs of whitespace to a single space, and trims both ends.
///
/// # Examples
///
/// ```
/// use quizzard_evaluator::normalize;
///
/// assert_eq!(normalize("  The Great   Wall! "), "the great wall");
/// assert_eq!(normalize("O'Brien"), "obrien");
/// assert_eq!(normalize("---"), "");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            normalized.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() && !normalized.is_empty() && !normalized.ends_with(' ') {
            normalized.push(' ');
        }
    }
    if normalized.ends_with(' ') {
        normalized.pop();
    }
    normalized
}

/// Splits text into whitespace-separated tokens.
///
/// Intended for already-normalized text, where tokens are exactly the
/// space-separated words.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Who's Afraid of Virginia Woolf?"), "whos afraid of virginia woolf");
        assert_eq!(normalize("E=mc^2"), "emc2");
    }

    #[test]
    fn test_collapses_and_trims_whitespace() {
        assert_eq!(normalize("  a \t b\n  c  "), "a b c");
        assert_eq!(normalize("\n\t "), "");
    }

    #[test]
    fn test_punctuation_between_words_does_not_join_them() {
        // A separator that mixes punctuation and whitespace still yields one space.
        assert_eq!(normalize("salt - and - pepper"), "salt and pepper");
        // Punctuation alone joins adjacent letters.
        assert_eq!(normalize("mother-in-law"), "motherinlaw");
    }

    #[test]
    fn test_non_ascii_is_dropped() {
        assert_eq!(normalize("café"), "caf");
        assert_eq!(normalize("naïve"), "nave");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_tokens_split_on_whitespace() {
        let collected: Vec<_> = tokens("the great wall").collect();
        assert_eq!(collected, ["the", "great", "wall"]);
        assert_eq!(tokens("").count(), 0);
    }
}
