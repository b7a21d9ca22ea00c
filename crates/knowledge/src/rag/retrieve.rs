//! Role-filtered nearest-neighbour retrieval.

use crate::access::RoleAccessTable;
use crate::embeddings::EmbeddingProvider;
use crate::types::SearchHit;
use crate::vector_index::VectorIndex;
use clearance_core::AppResult;

/// Oversample-then-filter retriever.
///
/// Requests `k * oversample_factor` candidates, keeps those readable by the
/// role in distance order and stops at `k`. There is no second round: when
/// filtering leaves fewer than `k` hits the short result is returned as is.
#[derive(Debug, Clone, Copy)]
pub struct Retriever {
    oversample_factor: usize,
}

impl Default for Retriever {
    fn default() -> Self {
        Self {
            oversample_factor: 2,
        }
    }
}

impl Retriever {
    pub fn new(oversample_factor: usize) -> Self {
        Self {
            oversample_factor: oversample_factor.max(1),
        }
    }

    pub fn oversample_factor(&self) -> usize {
        self.oversample_factor
    }

    /// Retrieve at most `k` hits readable by `role`.
    ///
    /// Fails with `InvalidRole` before the embedder or the index is touched.
    /// Embedding and index failures propagate as retrieval errors; an empty
    /// result only ever means nothing readable was found.
    pub async fn retrieve(
        &self,
        access: &RoleAccessTable,
        embedder: &dyn EmbeddingProvider,
        index: &dyn VectorIndex,
        query: &str,
        role: &str,
        k: usize,
    ) -> AppResult<Vec<SearchHit>> {
        let role = access.role(role)?;

        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = embedder.embed(query).await?;
        let candidates = index.search(&query_embedding, k.saturating_mul(self.oversample_factor))?;
        let candidate_count = candidates.len();

        let hits: Vec<SearchHit> = candidates
            .into_iter()
            .filter(|hit| hit.chunk.readable_by(&role))
            .take(k)
            .collect();

        tracing::debug!(
            role = %role,
            k,
            candidates = candidate_count,
            kept = hits.len(),
            "Filtered retrieval candidates"
        );

        Ok(hits)
    }
}
