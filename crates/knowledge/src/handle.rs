//! Published index generations.
//!
//! Queries load the current generation with a single atomic read and keep it
//! alive through an `Arc` for as long as they need it. Rebuilds construct the
//! next generation off to the side and publish it with one atomic store, so a
//! reader sees either the old index or the new one, never a partial build.

use crate::vector_index::VectorIndex;
use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use clearance_core::{AppError, AppResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// One fully built, immutable index.
#[derive(Debug)]
pub struct IndexGeneration {
    pub id: u64,
    pub built_at: DateTime<Utc>,
    pub index: Box<dyn VectorIndex>,
}

/// Owner of the currently served index generation.
#[derive(Debug)]
pub struct IndexHandle {
    current: ArcSwapOption<IndexGeneration>,
    next_id: AtomicU64,
    rebuild: Mutex<()>,
}

impl Default for IndexHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexHandle {
    /// An empty handle; queries fail with `NotReady` until the first publish.
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            next_id: AtomicU64::new(1),
            rebuild: Mutex::new(()),
        }
    }

    /// Whether any generation has been published.
    pub fn exists(&self) -> bool {
        self.current.load().is_some()
    }

    /// The generation currently served.
    pub fn current(&self) -> AppResult<Arc<IndexGeneration>> {
        self.current.load_full().ok_or_else(|| {
            AppError::NotReady(
                "No index has been built yet. Run ingestion first.".to_string(),
            )
        })
    }

    /// Reserve the id for the next generation.
    pub fn next_generation_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Atomically replace the served generation.
    ///
    /// In-flight readers holding the previous generation keep using it until
    /// they drop their `Arc`.
    pub fn publish(&self, generation: IndexGeneration) -> Arc<IndexGeneration> {
        // Keep ids monotonic when a restored snapshot carries a higher id
        self.next_id.fetch_max(generation.id + 1, Ordering::SeqCst);

        let generation = Arc::new(generation);
        let previous = self.current.swap(Some(Arc::clone(&generation)));

        tracing::info!(
            generation = generation.id,
            chunks = generation.index.len(),
            previous = ?previous.as_ref().map(|g| g.id),
            "Published index generation"
        );

        generation
    }

    /// Serialise rebuilds. Held for the whole build-and-publish sequence.
    pub async fn lock_rebuild(&self) -> MutexGuard<'_, ()> {
        self.rebuild.lock().await
    }

    /// Like [`lock_rebuild`](Self::lock_rebuild) but fails instead of waiting.
    pub fn try_lock_rebuild(&self) -> Option<MutexGuard<'_, ()>> {
        self.rebuild.try_lock().ok()
    }
}
