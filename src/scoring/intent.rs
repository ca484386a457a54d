//! Intent similarity: TF-IDF vectors fitted over the two passages, compared
//! by cosine similarity.
//!
//! The vectorizer follows the usual defaults: lowercase, tokens of two or more
//! word characters, smoothed idf `ln((1 + n) / (1 + df)) + 1`, raw term
//! counts, rows L2-normalised.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use crate::TARGET_SCORING;

static DEFAULT_TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Vocabulary and document vectors produced by one fit.
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfMatrix {
    pub vocabulary: BTreeMap<String, usize>,
    pub rows: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    token_pattern: Regex,
    lowercase: bool,
    smooth_idf: bool,
    sublinear_tf: bool,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            token_pattern: DEFAULT_TOKEN_PATTERN.clone(),
            lowercase: true,
            smooth_idf: true,
            sublinear_tf: false,
        }
    }
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_sublinear_tf(mut self, sublinear: bool) -> Self {
        self.sublinear_tf = sublinear;
        self
    }

    fn analyze(&self, document: &str) -> Vec<String> {
        let text = if self.lowercase {
            document.to_lowercase()
        } else {
            document.to_string()
        };
        self.token_pattern
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Fit the vocabulary and idf weights on `documents` and return their
    /// L2-normalised TF-IDF vectors. An empty vocabulary yields zero-length rows.
    pub fn fit_transform(&self, documents: &[&str]) -> TfidfMatrix {
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| self.analyze(d)).collect();

        let mut vocabulary = BTreeMap::new();
        for term in analyzed.iter().flatten() {
            if !vocabulary.contains_key(term) {
                vocabulary.insert(term.clone(), 0);
            }
        }
        for (column, index) in vocabulary.values_mut().enumerate() {
            *index = column;
        }

        let n_docs = documents.len() as f64;
        let mut document_frequency = vec![0usize; vocabulary.len()];
        let mut counts: Vec<Vec<f64>> = Vec::with_capacity(analyzed.len());
        for terms in &analyzed {
            let mut row = vec![0.0; vocabulary.len()];
            for term in terms {
                row[vocabulary[term]] += 1.0;
            }
            for (column, count) in row.iter().enumerate() {
                if *count > 0.0 {
                    document_frequency[column] += 1;
                }
            }
            counts.push(row);
        }

        let smooth = if self.smooth_idf { 1.0 } else { 0.0 };
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((n_docs + smooth) / (df as f64 + smooth)).ln() + 1.0)
            .collect();

        let rows = counts
            .into_iter()
            .map(|row| {
                let weighted: Vec<f64> = row
                    .iter()
                    .zip(&idf)
                    .map(|(&tf, &idf)| {
                        let tf = if self.sublinear_tf && tf > 0.0 {
                            tf.ln() + 1.0
                        } else {
                            tf
                        };
                        tf * idf
                    })
                    .collect();
                l2_normalize(weighted)
            })
            .collect();

        TfidfMatrix { vocabulary, rows }
    }
}

fn l2_normalize(mut row: Vec<f64>) -> Vec<f64> {
    let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in row.iter_mut() {
            *x /= norm;
        }
    }
    row
}

/// Cosine similarity of two vectors. Zero-magnitude vectors and dimension
/// mismatches give 0.0 instead of an error.
pub fn cosine_similarity(vec1: &[f64], vec2: &[f64]) -> f64 {
    if vec1.len() != vec2.len() {
        return 0.0;
    }

    let mag1 = vec1.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag2 = vec2.iter().map(|x| x * x).sum::<f64>().sqrt();
    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    let dot_product: f64 = vec1.iter().zip(vec2).map(|(a, b)| a * b).sum();
    dot_product / (mag1 * mag2)
}

/// Similarity of intent between the two passages, in [0, 1].
///
/// The vector space is fitted fresh on exactly these two passages.
pub fn intent_score(vectorizer: &TfidfVectorizer, student: &str, expert: &str) -> f64 {
    let matrix = vectorizer.fit_transform(&[student, expert]);
    if matrix.vocabulary.is_empty() {
        debug!(target: TARGET_SCORING, "Empty vocabulary, intent score is 0.0");
        return 0.0;
    }

    let score = cosine_similarity(&matrix.rows[0], &matrix.rows[1]).clamp(0.0, 1.0);
    debug!(
        target: TARGET_SCORING,
        "Intent score {:.4} over {} terms", score, matrix.vocabulary.len()
    );
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_need_two_word_characters() {
        let matrix = TfidfVectorizer::new().fit_transform(&["A cell, a Cell!", "x"]);
        assert_eq!(matrix.vocabulary.keys().collect::<Vec<_>>(), vec!["cell"]);
        assert!((matrix.rows[0][0] - 1.0).abs() < 1e-12);
        assert_eq!(matrix.rows[1], vec![0.0]);
    }

    #[test]
    fn test_idf_weights_unshared_terms_higher() {
        let matrix = TfidfVectorizer::new().fit_transform(&["cell energy", "cell"]);
        let cell = matrix.vocabulary["cell"];
        let energy = matrix.vocabulary["energy"];
        // idf(cell) = 1, idf(energy) = ln(3/2) + 1
        let expected_ratio = (1.5f64).ln() + 1.0;
        assert!((matrix.rows[0][energy] / matrix.rows[0][cell] - expected_ratio).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_intent_score_bounds() {
        let vectorizer = TfidfVectorizer::new();
        assert_eq!(intent_score(&vectorizer, "", ""), 0.0);
        assert_eq!(intent_score(&vectorizer, "", "Anything"), 0.0);
        assert_eq!(intent_score(&vectorizer, "apples", "oranges"), 0.0);
        let same = intent_score(&vectorizer, "the cell wall", "the cell wall");
        assert!((same - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_lowercase_can_be_disabled() {
        let vectorizer = TfidfVectorizer::new().with_lowercase(false);
        assert_eq!(intent_score(&vectorizer, "Cell", "cell"), 0.0);
        assert!(intent_score(&TfidfVectorizer::new(), "Cell", "cell") > 0.99);
    }
}
