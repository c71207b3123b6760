//! Word-frequency ranking
//!
//! Pure ordering logic for the aggregate word counts produced by a crawl.
//! Ranking has no dependency on which crawl produced the counts.

use std::cmp::Ordering;
use std::collections::HashMap;

/// Orders a word-count map and truncates it to the most popular entries.
///
/// The ordering is a total order with three tiers, in descending priority:
///
/// 1. Higher occurrence count ranks first.
/// 2. Among equal counts, the longer word (in characters) ranks first.
/// 3. Among equal count and length, the lexicographically smaller word ranks
///    first.
///
/// The result contains at most `min(top_n, counts.len())` entries in rank
/// order; `top_n == 0` yields an empty result. Ranking an already ranked and
/// truncated map again with the same `top_n` returns the same entries in the
/// same order.
///
/// # Arguments
///
/// * `counts` - Cumulative per-word occurrence counts
/// * `top_n` - Maximum number of entries to keep
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use lexicrawl::ranking::rank;
///
/// let counts = HashMap::from([
///     ("the".to_string(), 4),
///     ("jumped".to_string(), 2),
///     ("brown".to_string(), 2),
///     ("fox".to_string(), 1),
/// ]);
///
/// let ranked = rank(&counts, 3);
/// assert_eq!(ranked[0], ("the".to_string(), 4));
/// assert_eq!(ranked[1], ("jumped".to_string(), 2));
/// assert_eq!(ranked[2], ("brown".to_string(), 2));
/// ```
pub fn rank(counts: &HashMap<String, usize>, top_n: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> =
        counts.iter().map(|(word, n)| (word.clone(), *n)).collect();
    ranked.sort_unstable_by(compare_entries);
    ranked.truncate(top_n);
    ranked
}

/// Comparison implementing the count / length / lexicographic tie-break tiers
fn compare_entries(a: &(String, usize), b: &(String, usize)) -> Ordering {
    b.1.cmp(&a.1)
        .then_with(|| b.0.chars().count().cmp(&a.0.chars().count()))
        .then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, usize)]) -> HashMap<String, usize> {
        entries
            .iter()
            .map(|(word, n)| (word.to_string(), *n))
            .collect()
    }

    fn words(ranked: &[(String, usize)]) -> Vec<&str> {
        ranked.iter().map(|(word, _)| word.as_str()).collect()
    }

    #[test]
    fn test_orders_by_count_descending() {
        let ranked = rank(&counts(&[("one", 1), ("three", 3), ("two", 2)]), 3);
        assert_eq!(words(&ranked), vec!["three", "two", "one"]);
    }

    #[test]
    fn test_equal_counts_longer_word_first() {
        let ranked = rank(&counts(&[("ox", 2), ("jumped", 2), ("brown", 2)]), 3);
        assert_eq!(words(&ranked), vec!["jumped", "brown", "ox"]);
    }

    #[test]
    fn test_equal_count_and_length_alphabetical() {
        let ranked = rank(&counts(&[("cherry", 1), ("banana", 1), ("apple", 2)]), 3);
        assert_eq!(words(&ranked), vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn test_length_tier_counts_characters_not_bytes() {
        // "héllo" is six bytes but five characters, the same length as "hello",
        // so the tie falls through to the lexicographic tier.
        let ranked = rank(&counts(&[("héllo", 1), ("hello", 1)]), 2);
        assert_eq!(words(&ranked), vec!["hello", "héllo"]);
    }

    #[test]
    fn test_truncates_to_top_n() {
        let ranked = rank(&counts(&[("a", 5), ("b", 4), ("c", 3), ("d", 2)]), 2);
        assert_eq!(words(&ranked), vec!["a", "b"]);
    }

    #[test]
    fn test_top_n_zero_yields_empty() {
        let ranked = rank(&counts(&[("a", 5), ("b", 4)]), 0);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_top_n_larger_than_map_keeps_everything() {
        let ranked = rank(&counts(&[("a", 5), ("b", 4)]), 10);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_empty_counts_yield_empty() {
        assert!(rank(&HashMap::new(), 5).is_empty());
    }

    #[test]
    fn test_idempotent_on_ranked_input() {
        let original = counts(&[
            ("the", 4),
            ("jumped", 2),
            ("brown", 2),
            ("quick", 1),
            ("fox", 1),
        ]);

        let first = rank(&original, 3);
        let reranked = rank(&first.iter().cloned().collect(), 3);
        assert_eq!(first, reranked);
    }

    #[test]
    fn test_three_most_popular_from_merged_pages() {
        let merged = counts(&[
            ("the", 4),
            ("quick", 1),
            ("brown", 2),
            ("fox", 1),
            ("jumped", 2),
            ("over", 1),
            ("lazy", 1),
            ("dog", 1),
        ]);

        let ranked = rank(&merged, 3);
        assert_eq!(
            ranked,
            vec![
                ("the".to_string(), 4),
                ("jumped".to_string(), 2),
                ("brown".to_string(), 2),
            ]
        );
    }
}
