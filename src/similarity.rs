//! Text similarity behind a narrow interface.
//!
//! The recommendation engine only ever asks two questions: which terms
//! carry a text's content, and how similar two texts are. Anything that
//! can answer those — a lexical backend, an embedding service — plugs in
//! here.

use std::collections::{BTreeSet, HashMap};

use crate::text::content_terms;

/// Scores pairs of short editorial texts.
pub trait TextSimilarity: Send + Sync {
    /// Content-bearing terms of a text, lower-cased and stopword-free.
    fn key_terms(&self, text: &str) -> BTreeSet<String>;

    /// Similarity score in `[0, 1]`; identical texts score 1.
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Lexical similarity backend: cosine over term frequencies of the key
/// terms, blended with a Jaro-Winkler score over the raw texts so that
/// near-identical phrasings with little term overlap still register.
#[derive(Debug, Default)]
pub struct LexicalSimilarity;

impl LexicalSimilarity {
    pub fn new() -> Self {
        Self
    }

    fn term_frequencies(text: &str) -> HashMap<String, f64> {
        let mut frequencies = HashMap::new();
        for term in content_terms(text) {
            *frequencies.entry(term).or_insert(0.0) += 1.0;
        }
        frequencies
    }

    fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
        let dot: f64 = a
            .iter()
            .filter_map(|(term, weight)| b.get(term).map(|other| weight * other))
            .sum();
        let norm_a: f64 = a.values().map(|w| w * w).sum::<f64>().sqrt();
        let norm_b: f64 = b.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

impl TextSimilarity for LexicalSimilarity {
    fn key_terms(&self, text: &str) -> BTreeSet<String> {
        content_terms(text).into_iter().collect()
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        let term_score = Self::cosine(&Self::term_frequencies(a), &Self::term_frequencies(b));
        let phrase_score = strsim::jaro_winkler(&a.to_lowercase(), &b.to_lowercase());
        ((term_score * 0.7) + (phrase_score * 0.3)).clamp(0.0, 1.0)
    }
}
