//! Confidence estimation from retrieval distances.

use crate::types::SearchHit;

/// Mean of `1 / (1 + distance)` over the hits, rounded to two decimals.
///
/// Assumes distances are non-negative dissimilarities (0 = identical), which is
/// the [`VectorIndex`](crate::vector_index::VectorIndex) contract; a negative
/// distance is treated as 0. Returns 0.0 for no hits.
pub fn confidence(hits: &[SearchHit]) -> f32 {
    if hits.is_empty() {
        return 0.0;
    }

    let total: f64 = hits
        .iter()
        .map(|hit| {
            let distance = if hit.distance.is_nan() {
                f64::INFINITY
            } else {
                f64::from(hit.distance).max(0.0)
            };
            1.0 / (1.0 + distance)
        })
        .sum();

    let mean = (total / hits.len() as f64).min(1.0);
    ((mean * 100.0).round() / 100.0) as f32
}
