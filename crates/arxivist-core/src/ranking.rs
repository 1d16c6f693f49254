//! Ranked result types and the selection math shared by both engines.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A predicted subject label with its raw classifier probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectPrediction {
    pub label: String,
    pub score: f32,
}

/// A recommended corpus title with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub score: f32,
}

/// Indices of the `k` largest scores, highest first.
///
/// Ties are broken by lowest index first, so the result is fully determined by
/// the input. NaN ranks below every real score. Returns `min(k, scores.len())`
/// indices.
pub fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
    let k = k.min(scores.len());
    if k == 0 {
        return Vec::new();
    }

    let rank = |&a: &usize, &b: &usize| -> Ordering {
        sort_key(scores[b])
            .total_cmp(&sort_key(scores[a]))
            .then(a.cmp(&b))
    };

    let mut indices: Vec<usize> = (0..scores.len()).collect();
    // (score desc, index asc) is a total order, so an unstable partition is
    // still deterministic.
    if k < indices.len() {
        indices.select_nth_unstable_by(k - 1, rank);
        indices.truncate(k);
    }
    indices.sort_unstable_by(rank);
    indices
}

fn sort_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

/// Cosine similarity of two vectors, `0.0` if either has zero norm.
///
/// The result is clamped to `[-1, 1]` to absorb rounding error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine_with_norms(a, l2_norm(a), b, l2_norm(b))
}

/// Cosine similarity with norms already known.
pub fn cosine_with_norms(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
