//! Word-set similarity between an input message and a corpus pattern
//!
//! Used by the corpus-trained classifier to pick the canonical pattern
//! (and its argument template) among those sharing the predicted tool.

use ahash::AHashSet;

/// Jaccard similarity over lower-cased whitespace-tokenized word sets.
///
/// Returns |intersection| / |union| in 0.0-1.0; a pattern with no words
/// scores 0.0.
pub fn jaccard_words(input: &str, pattern: &str) -> f64 {
    let input_lower = input.to_lowercase();
    let pattern_lower = pattern.to_lowercase();

    let input_words: AHashSet<&str> = input_lower.split_whitespace().collect();
    let pattern_words: AHashSet<&str> = pattern_lower.split_whitespace().collect();

    if pattern_words.is_empty() {
        return 0.0;
    }

    let intersection = input_words.intersection(&pattern_words).count();
    let union = input_words.union(&pattern_words).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts() {
        assert!((jaccard_words("list all products", "list all products") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_overlap() {
        // {list, all, products} vs {list, products}: 2 shared of 3 total
        let score = jaccard_words("list all products", "list products");
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_case_insensitive() {
        assert!((jaccard_words("List Products", "list products") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_pattern_scores_zero() {
        assert_eq!(jaccard_words("list products", ""), 0.0);
        assert_eq!(jaccard_words("list products", "   "), 0.0);
    }

    #[test]
    fn test_disjoint_texts() {
        assert_eq!(jaccard_words("hello world", "delete product"), 0.0);
    }
}
