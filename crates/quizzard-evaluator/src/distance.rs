//! Levenshtein edit distance with a length-scaled acceptance threshold.

/// Computes the Levenshtein distance between two strings.
///
/// Counted over characters with unit cost for insertions, deletions, and
/// substitutions, using the classic two-row dynamic program.
///
/// # Examples
///
/// ```
/// use quizzard_evaluator::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("", "abc"), 3);
/// assert_eq!(levenshtein("same", "same"), 0);
/// ```
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitute.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Maximum edit distance accepted for a comparison of the given length.
///
/// `len` is the longer of the two normalized strings being compared: short
/// answers tolerate a single edit, medium answers two, long answers three.
#[must_use]
pub const fn distance_threshold(len: usize) -> usize {
    match len {
        0..=6 => 1,
        7..=12 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_known_values() {
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("gumbo", "gambol"), 2);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("abc", "axc"), 1);
    }

    #[test]
    fn test_distance_empty_sides() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abcd", ""), 4);
        assert_eq!(levenshtein("", "xy"), 2);
    }

    #[test]
    fn test_distance_is_symmetric() {
        assert_eq!(levenshtein("paris", "pairs"), levenshtein("pairs", "paris"));
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(distance_threshold(0), 1);
        assert_eq!(distance_threshold(6), 1);
        assert_eq!(distance_threshold(7), 2);
        assert_eq!(distance_threshold(12), 2);
        assert_eq!(distance_threshold(13), 3);
        assert_eq!(distance_threshold(40), 3);
    }
}
