//! Embedding gateway.
//!
//! Provider-agnostic embedding generation; the provider is built once from
//! `KnowledgeConfig::embedding` and injected into the service.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use crate::types::Chunk;
use clearance_core::{AppError, AppResult};

/// Embed chunk texts in batches of at most `batch_size`.
///
/// Checks that the provider returns one vector of the expected dimension per
/// chunk; a mismatch is a collaborator failure.
pub async fn embed_chunks(
    provider: &dyn EmbeddingProvider,
    chunks: &[Chunk],
    batch_size: usize,
    mut on_batch: impl FnMut(usize),
) -> AppResult<Vec<Vec<f32>>> {
    let mut embeddings = Vec::with_capacity(chunks.len());

    for batch in chunks.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = provider.embed_batch(&texts).await?;

        if vectors.len() != texts.len() {
            return Err(AppError::Retrieval(format!(
                "Embedding provider '{}' returned {} vectors for {} texts",
                provider.provider_name(),
                vectors.len(),
                texts.len()
            )));
        }

        for vector in vectors {
            if vector.len() != provider.dimensions() {
                return Err(AppError::Retrieval(format!(
                    "Embedding provider '{}' returned {} dimensions, expected {}",
                    provider.provider_name(),
                    vector.len(),
                    provider.dimensions()
                )));
            }
            embeddings.push(vector);
        }

        on_batch(embeddings.len());
    }

    tracing::debug!(
        "Generated {} embeddings of dimension {} with '{}'",
        embeddings.len(),
        provider.dimensions(),
        provider.model_name()
    );

    Ok(embeddings)
}
