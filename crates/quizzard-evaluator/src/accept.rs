//! Layered acceptance rules for free-form answers.

use std::collections::HashSet;

use crate::{
    distance::{distance_threshold, levenshtein},
    normalize::{normalize, tokens},
};

/// Normalized submissions shorter than this never match anything.
const MIN_SUBMISSION_LEN: usize = 2;
/// A lone submission token must be at least this long for whole-token
/// containment to count.
const MIN_CONTAINMENT_TOKEN_LEN: usize = 3;
/// Both normalized strings must be at least this long before edit distance
/// is consulted.
const MIN_EDIT_DISTANCE_LEN: usize = 3;
/// Shared-token count required by the overlap fallback.
const TOKEN_OVERLAP_REQUIRED: usize = 2;

/// Decides whether a submitted answer should be accepted for a canonical one.
///
/// Rules are tried in order of increasing permissiveness, short-circuiting
/// on the first accept: exact normalized match, whole-token containment of
/// a single submission token, bounded Levenshtein distance, and multi-token
/// overlap. Each rule carries a length gate so that one- and two-character
/// inputs can never match by accident.
///
/// # Examples
///
/// ```
/// use quizzard_evaluator::is_acceptable_answer;
///
/// // Punctuation and casing never matter.
/// assert!(is_acceptable_answer("the louvre", "The Louvre"));
/// // A lone surname matches a full name.
/// assert!(is_acceptable_answer("Curie", "Marie Curie"));
/// // Close typos pass, unrelated words do not.
/// assert!(is_acceptable_answer("mississipi", "Mississippi"));
/// assert!(!is_acceptable_answer("cat", "dog"));
/// ```
#[must_use]
pub fn is_acceptable_answer(submitted: &str, canonical: &str) -> bool {
    let submission = normalize(submitted);
    if submission.len() < MIN_SUBMISSION_LEN {
        return false;
    }
    let canonical = normalize(canonical);

    if submission == canonical {
        return true;
    }

    let submission_tokens: Vec<&str> = tokens(&submission).collect();
    if let [only] = submission_tokens[..]
        && only.len() >= MIN_CONTAINMENT_TOKEN_LEN
        && tokens(&canonical).any(|t| t == only)
    {
        return true;
    }

    if submission.len() >= MIN_EDIT_DISTANCE_LEN && canonical.len() >= MIN_EDIT_DISTANCE_LEN {
        let threshold = distance_threshold(submission.len().max(canonical.len()));
        if levenshtein(&submission, &canonical) <= threshold {
            return true;
        }
    }

    if submission_tokens.len() >= TOKEN_OVERLAP_REQUIRED {
        let canonical_tokens: HashSet<&str> = tokens(&canonical).collect();
        let required = TOKEN_OVERLAP_REQUIRED.min(submission_tokens.len());
        let shared = submission_tokens
            .iter()
            .filter(|t| canonical_tokens.contains(**t))
            .count();
        if shared >= required {
            return true;
        }
    }

    false
}

/// Accepts a submission when any canonical candidate accepts it.
///
/// The candidate list is typically a clue's canonical answer followed by
/// its accepted alternates.
pub fn is_acceptable_against_any<'a, I>(submitted: &str, canonicals: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    canonicals
        .into_iter()
        .any(|canonical| is_acceptable_answer(submitted, canonical))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod rejection_gates {
        use super::*;

        #[test]
        fn test_empty_submission_is_rejected() {
            assert!(!is_acceptable_answer("", "anything"));
            assert!(!is_acceptable_answer("   ", "anything"));
        }

        #[test]
        fn test_single_character_is_rejected() {
            assert!(!is_acceptable_answer("a", "a"));
            assert!(!is_acceptable_answer("x", "xylophone"));
            // Punctuation that normalizes down to one character is rejected too.
            assert!(!is_acceptable_answer("!a!", "albatross"));
        }

        #[test]
        fn test_short_token_containment_is_not_accepted() {
            // "an" is a whole token of the canonical answer, but below the
            // three-character containment floor.
            assert!(!is_acceptable_answer("an", "an apple"));
        }

        #[test]
        fn test_short_strings_skip_edit_distance() {
            // Distance 1, but both sides are under the three-character floor.
            assert!(!is_acceptable_answer("ab", "ac"));
        }
    }

    mod exact_match {
        use super::*;

        #[test]
        fn test_normalized_equality_accepts() {
            assert!(is_acceptable_answer("Taj Mahal!", "taj   mahal"));
            assert!(is_acceptable_answer("  o'brien ", "OBrien"));
            assert!(is_acceptable_answer("route 66", "Route 66"));
        }
    }

    mod containment {
        use super::*;

        #[test]
        fn test_single_token_whole_word_accepts() {
            assert!(is_acceptable_answer("einstein", "Albert Einstein"));
            assert!(is_acceptable_answer("gatsby", "the great gatsby"));
        }

        #[test]
        fn test_substring_of_a_word_does_not_count() {
            // "ein" appears inside "einstein" but is not a whole token.
            assert!(!is_acceptable_answer("ein", "Albert Einstein"));
        }
    }

    mod edit_distance {
        use super::*;

        #[test]
        fn test_typos_within_threshold_accept() {
            assert!(is_acceptable_answer("mississipi", "Mississippi")); // 1 edit, long word
            assert!(is_acceptable_answer("einstien", "einstein")); // transposition, 2 edits
            assert!(is_acceptable_answer("pari", "paris")); // 1 edit at length 5
        }

        #[test]
        fn test_short_words_get_a_tight_threshold() {
            // Length 3-6 tolerates only one edit.
            assert!(is_acceptable_answer("cart", "card"));
            assert!(!is_acceptable_answer("cat", "dog"));
            assert!(!is_acceptable_answer("moon", "mars"));
        }
    }

    mod token_overlap {
        use super::*;

        #[test]
        fn test_two_shared_tokens_accept() {
            assert!(is_acceptable_answer(
                "theory relativity",
                "the theory of relativity"
            ));
        }

        #[test]
        fn test_leading_article_defeats_every_layer() {
            // Two tokens skip single-token containment, the article pushes
            // the edit distance past the threshold, and only one token is
            // shared against the required two.
            assert!(!is_acceptable_answer("The Mississippi!", "mississippi"));
        }

        #[test]
        fn test_one_shared_token_is_not_enough() {
            assert!(!is_acceptable_answer(
                "general theory",
                "the theory of relativity"
            ));
            assert!(!is_acceptable_answer("red balloon", "red october"));
        }
    }

    mod against_any {
        use super::*;

        #[test]
        fn test_accepts_when_any_alternate_matches() {
            let alternates = ["William Shakespeare", "Shakespeare", "the Bard"];
            assert!(is_acceptable_against_any("the bard", alternates));
            assert!(is_acceptable_against_any("shakespere", alternates));
            assert!(!is_acceptable_against_any("marlowe", alternates));
        }

        #[test]
        fn test_empty_candidate_list_rejects() {
            assert!(!is_acceptable_against_any("anything", []));
        }
    }
}
