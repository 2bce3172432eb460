//! Term-weighted probabilistic model over the pattern corpus
//!
//! Tf-idf features (lower-cased unigrams and bigrams, stop-words removed,
//! capped vocabulary) feeding a multinomial naive Bayes classifier that
//! maps message text to a tool id. Read-only once trained.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{QueryPattern, ToolId};

/// Vocabulary cap, by total term frequency across the corpus.
const MAX_FEATURES: usize = 1000;
/// Laplace smoothing for the naive Bayes feature counts.
const SMOOTHING_ALPHA: f64 = 1.0;

/// Common English stop-words dropped before ngram formation.
const STOP_WORDS: [&str; 42] = [
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "do", "does", "for", "from",
    "had", "has", "have", "i", "if", "in", "into", "is", "it", "its", "me", "my", "of", "on",
    "or", "our", "so", "that", "the", "their", "then", "there", "these", "they", "this", "to",
    "was", "will",
];

/// Trained tf-idf + naive Bayes model. Serializable for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextModel {
    vocabulary: AHashMap<String, usize>,
    idf: Vec<f64>,
    /// Classes in first-seen corpus order; argmax ties resolve to the
    /// earliest class.
    classes: Vec<ToolId>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl TextModel {
    /// Train on the corpus. Zero patterns is a no-op returning nothing;
    /// the caller stays untrained and degrades to the default result.
    pub fn train(patterns: &[QueryPattern]) -> Option<TextModel> {
        if patterns.is_empty() {
            warn!("no patterns available for training");
            return None;
        }

        let documents: Vec<Vec<String>> = patterns
            .iter()
            .map(|p| ngrams(&p.pattern_text))
            .collect();

        let vocabulary = build_vocabulary(&documents);
        let n_features = vocabulary.len();
        let n_docs = documents.len();

        // Smoothed idf, as if one extra document contained every term.
        let mut document_frequency = vec![0usize; n_features];
        for doc in &documents {
            let mut seen = vec![false; n_features];
            for term in doc {
                if let Some(&index) = vocabulary.get(term) {
                    if !seen[index] {
                        seen[index] = true;
                        document_frequency[index] += 1;
                    }
                }
            }
        }
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1 + n_docs) as f64 / (1 + df) as f64).ln() + 1.0)
            .collect();

        // Classes in first-seen order for stable tie-breaking.
        let mut classes: Vec<ToolId> = Vec::new();
        for pattern in patterns {
            if !classes.contains(&pattern.tool_id) {
                classes.push(pattern.tool_id);
            }
        }

        let n_classes = classes.len();
        let mut class_counts = vec![0usize; n_classes];
        let mut feature_sums = vec![vec![0.0f64; n_features]; n_classes];

        for (pattern, doc) in patterns.iter().zip(&documents) {
            let class = classes
                .iter()
                .position(|c| *c == pattern.tool_id)
                .unwrap_or(0);
            class_counts[class] += 1;
            for (index, weight) in vectorize(doc, &vocabulary, &idf) {
                feature_sums[class][index] += weight;
            }
        }

        let class_log_prior: Vec<f64> = class_counts
            .iter()
            .map(|&count| (count as f64 / n_docs as f64).ln())
            .collect();

        let feature_log_prob: Vec<Vec<f64>> = feature_sums
            .iter()
            .map(|sums| {
                let total: f64 = sums.iter().sum::<f64>() + SMOOTHING_ALPHA * n_features as f64;
                sums.iter()
                    .map(|&sum| ((sum + SMOOTHING_ALPHA) / total).ln())
                    .collect()
            })
            .collect();

        info!(
            patterns = patterns.len(),
            features = n_features,
            classes = n_classes,
            "text model trained"
        );

        Some(TextModel {
            vocabulary,
            idf,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Predict the tool for a message, with the winning class probability.
    pub fn predict(&self, text: &str) -> (ToolId, f64) {
        let doc = ngrams(text);
        let features = vectorize(&doc, &self.vocabulary, &self.idf);

        // Joint log likelihood per class, then log-sum-exp normalization.
        let jll: Vec<f64> = self
            .classes
            .iter()
            .enumerate()
            .map(|(class, _)| {
                let mut score = self.class_log_prior[class];
                for &(index, weight) in &features {
                    score += weight * self.feature_log_prob[class][index];
                }
                score
            })
            .collect();

        let max_jll = jll.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let total: f64 = jll.iter().map(|&score| (score - max_jll).exp()).sum();

        let mut best_class = 0;
        let mut best_probability = 0.0;
        for (class, &score) in jll.iter().enumerate() {
            let probability = (score - max_jll).exp() / total;
            if probability > best_probability {
                best_probability = probability;
                best_class = class;
            }
        }

        (self.classes[best_class], best_probability)
    }
}

/// Lower-cased word tokens of at least two alphanumeric chars, stop-words
/// removed.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_owned)
        .collect()
}

/// Unigrams plus adjacent bigrams over the filtered token stream.
fn ngrams(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = tokens.clone();
    for window in tokens.windows(2) {
        terms.push(format!("{} {}", window[0], window[1]));
    }
    terms
}

/// Vocabulary capped at MAX_FEATURES, most frequent terms first, ties
/// broken alphabetically for determinism.
fn build_vocabulary(documents: &[Vec<String>]) -> AHashMap<String, usize> {
    let mut counts: AHashMap<&str, usize> = AHashMap::new();
    for doc in documents {
        for term in doc {
            *counts.entry(term).or_insert(0) += 1;
        }
    }

    let mut terms: Vec<(&str, usize)> = counts.into_iter().collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    terms.truncate(MAX_FEATURES);

    terms
        .into_iter()
        .enumerate()
        .map(|(index, (term, _))| (term.to_owned(), index))
        .collect()
}

/// Sparse l2-normalized tf-idf vector for one document.
fn vectorize(
    doc: &[String],
    vocabulary: &AHashMap<String, usize>,
    idf: &[f64],
) -> Vec<(usize, f64)> {
    let mut term_counts: AHashMap<usize, f64> = AHashMap::new();
    for term in doc {
        if let Some(&index) = vocabulary.get(term) {
            *term_counts.entry(index).or_insert(0.0) += 1.0;
        }
    }

    let mut features: Vec<(usize, f64)> = term_counts
        .into_iter()
        .map(|(index, count)| (index, count * idf[index]))
        .collect();

    let norm: f64 = features
        .iter()
        .map(|(_, weight)| weight * weight)
        .sum::<f64>()
        .sqrt();
    if norm > 0.0 {
        for feature in &mut features {
            feature.1 /= norm;
        }
    }

    // Stable order so training sums never depend on hash iteration.
    features.sort_by_key(|&(index, _)| index);
    features
}
