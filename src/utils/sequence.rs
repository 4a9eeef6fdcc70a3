use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::utils::text::split_sentences;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentencePair {
    pub submitted_sentence: String,
    pub source_sentence: String,
    pub similarity: f64,
}

/// Ratcliff/Obershelp similarity of two strings at character level.
///
/// Returns `2 * M / (len(a) + len(b))` where `M` is the number of characters in
/// matching blocks, found by taking the longest common substring and recursing
/// on both sides of it.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_characters(&a, &b);
    (2.0 * matched as f64 / total as f64).clamp(0.0, 1.0)
}

/// Every sentence pair across the two texts whose ratio clears `threshold`.
pub fn find_matching_sentences(submitted: &str, source: &str, threshold: f64) -> Vec<SentencePair> {
    let left = split_sentences(submitted);
    let right = split_sentences(source);

    let mut pairs = Vec::new();
    for s1 in &left {
        for s2 in &right {
            let similarity = sequence_ratio(s1, s2);
            if similarity >= threshold {
                pairs.push(SentencePair {
                    submitted_sentence: s1.clone(),
                    source_sentence: s2.clone(),
                    similarity,
                });
            }
        }
    }
    pairs
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` inside the given window, preferring
/// the earliest start in `a`, then in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_j2len: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = if j > 0 {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                next_j2len.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        j2len = next_j2len;
    }

    (best_i, best_j, best_k)
}
