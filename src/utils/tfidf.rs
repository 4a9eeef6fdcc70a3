use std::collections::HashMap;

use crate::utils::text::tokenize;

/// Sparse, L2-normalized TF-IDF vector keyed by vocabulary index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: HashMap<usize, f64>,
}

impl TermVector {
    pub fn is_zero(&self) -> bool {
        self.weights.is_empty()
    }

    fn weight(&self, term: usize) -> f64 {
        self.weights.get(&term).copied().unwrap_or(0.0)
    }

    fn norm(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }
}

/// TF-IDF vectorizer fitted over a whole document set at once.
///
/// Term frequency is the raw count, idf is smoothed as `ln((1 + n) / (1 + df)) + 1`
/// and every vector is L2-normalized, so cosine similarity reduces to a dot product.
#[derive(Debug, Default)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    #[cfg(test)]
    fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, docs: &[S]) -> Vec<TermVector> {
        let tokenized: Vec<Vec<String>> = docs.iter().map(|d| tokenize(d.as_ref())).collect();

        self.vocabulary.clear();
        let mut doc_freq: Vec<usize> = Vec::new();
        for tokens in &tokenized {
            let mut seen: Vec<usize> = Vec::new();
            for token in tokens {
                let next = self.vocabulary.len();
                let idx = *self.vocabulary.entry(token.clone()).or_insert(next);
                if idx == doc_freq.len() {
                    doc_freq.push(0);
                }
                if !seen.contains(&idx) {
                    seen.push(idx);
                    doc_freq[idx] += 1;
                }
            }
        }

        let n = docs.len() as f64;
        self.idf = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        tokenized
            .iter()
            .map(|tokens| self.vectorize(tokens))
            .collect()
    }

    fn vectorize(&self, tokens: &[String]) -> TermVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = TermVector {
            weights: counts
                .into_iter()
                .map(|(idx, tf)| (idx, tf * self.idf[idx]))
                .collect(),
        };

        let norm = vector.norm();
        if norm > 0.0 {
            for w in vector.weights.values_mut() {
                *w /= norm;
            }
        }
        vector
    }
}

/// Cosine similarity of two term vectors, clamped to `[0, 1]`.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    if a.is_zero() || b.is_zero() {
        return 0.0;
    }

    let (small, large) = if a.weights.len() <= b.weights.len() {
        (a, b)
    } else {
        (b, a)
    };

    let dot: f64 = small
        .weights
        .iter()
        .map(|(idx, w)| w * large.weight(*idx))
        .sum();
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }

    let score = (dot / denom).clamp(0.0, 1.0);
    // identical vectors can land a few ulps under 1.0
    if (1.0 - score) < 1e-9 {
        1.0
    } else {
        score
    }
}
