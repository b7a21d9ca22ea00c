//! Vector index abstraction for knowledge chunks.
//!
//! Defines the contract the retrieval pipeline needs from a nearest-neighbour
//! index. Distances are non-negative dissimilarities: 0 means identical and
//! results are returned in ascending distance order.

use crate::types::{IndexedChunk, SearchHit};
use clearance_core::AppResult;

/// Trait for vector index backends.
///
/// An index is mutable only while it is being built; once published through an
/// [`IndexHandle`](crate::handle::IndexHandle) it is shared read-only between
/// concurrent queries.
pub trait VectorIndex: Send + Sync + std::fmt::Debug {
    /// Insert chunks with their embeddings, replacing any with the same id.
    fn upsert(&mut self, chunks: Vec<IndexedChunk>) -> AppResult<()>;

    /// The `n` nearest chunks to `query`, ascending by distance.
    ///
    /// Ties keep insertion order so results are deterministic.
    fn search(&self, query: &[f32], n: usize) -> AppResult<Vec<SearchHit>>;

    /// Number of chunks stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension the index accepts.
    fn dimensions(&self) -> usize;
}
