//! Citation extraction.

use crate::types::{Citation, SearchHit};
use std::collections::HashSet;

/// Deduplicate hits by `(source_path, department)` in first-seen order and
/// number them `1..=N`.
pub fn citations(hits: &[SearchHit]) -> Vec<Citation> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for hit in hits {
        let key = (hit.chunk.source_path.as_str(), &hit.chunk.department);
        if seen.insert(key) {
            result.push(Citation {
                id: result.len() + 1,
                source_path: hit.chunk.source_path.clone(),
                department: hit.chunk.department.clone(),
            });
        }
    }

    result
}
