//! Secure retrieval pipeline.
//!
//! Ingests department folders into a role-tagged vector index and answers
//! questions using only the evidence the caller's role may read.

pub mod access;
pub mod audit;
pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod flat_index;
pub mod handle;
pub mod ingest;
pub mod parser;
pub mod progress;
pub mod rag;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use access::{Department, Role, RoleAccessTable};
pub use config::KnowledgeConfig;
pub use handle::{IndexGeneration, IndexHandle};
pub use progress::{ProgressEvent, ProgressReporter};
pub use rag::RagResponse;
pub use types::{AskOptions, Chunk, Citation, IndexStatus, IngestionStats, SearchHit};

use chrono::Utc;
use clearance_core::{AppConfig, AppResult};
use clearance_llm::{create_client, LlmClient};
use clearance_prompt::{load_template, GroundingTemplate};
use embeddings::EmbeddingProvider;
use flat_index::{FlatIndex, LoadedSnapshot, SnapshotHeader};
use rag::{AnswerGenerator, Retriever};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use types::IndexedChunk;
use vector_index::VectorIndex;

/// The retrieval pipeline with its collaborators.
///
/// Constructed once and shared; queries may run concurrently with each other
/// and with a rebuild.
pub struct KnowledgeService {
    access: Arc<RoleAccessTable>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmClient>,
    template: GroundingTemplate,
    config: KnowledgeConfig,
    model: String,
    retriever: Retriever,
    index: IndexHandle,
    snapshot_dir: Option<PathBuf>,
}

impl KnowledgeService {
    /// Assemble a service from explicit collaborators, with no persistence.
    pub fn new(
        access: RoleAccessTable,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmClient>,
        template: GroundingTemplate,
        config: KnowledgeConfig,
        model: impl Into<String>,
    ) -> Self {
        let retriever = Retriever::new(config.oversample_factor);
        Self {
            access: Arc::new(access),
            embedder,
            llm,
            template,
            config,
            model: model.into(),
            retriever,
            index: IndexHandle::new(),
            snapshot_dir: None,
        }
    }

    /// Persist generations under `dir` and serve the snapshot found there, if any.
    ///
    /// A snapshot that cannot be read, or that was built by a different
    /// embedder, is not served: the service starts not ready and the next
    /// ingestion replaces it.
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();

        match flat_index::load_snapshot(&dir) {
            Ok(Some(snapshot)) => self.restore(&dir, snapshot),
            Ok(None) => {}
            Err(e) => tracing::warn!(
                "Ignoring unreadable index snapshot in {:?}: {}. Re-run ingestion.",
                dir,
                e
            ),
        }

        self.snapshot_dir = Some(dir);
        Ok(self)
    }

    fn restore(&self, dir: &Path, snapshot: LoadedSnapshot) {
        let header = &snapshot.header;
        let provider = self.embedder.provider_name();
        let model = self.embedder.model_name();

        if header.provider != provider || header.model != model {
            tracing::warn!(
                "Ignoring index snapshot in {:?}: built with {}/{}, embedder is {}/{}. Re-run ingestion.",
                dir,
                header.provider,
                header.model,
                provider,
                model
            );
            return;
        }

        if snapshot.index.dimensions() != self.embedder.dimensions() {
            tracing::warn!(
                "Ignoring index snapshot in {:?}: {} dimensions, embedder produces {}. Re-run ingestion.",
                dir,
                snapshot.index.dimensions(),
                self.embedder.dimensions()
            );
            return;
        }

        tracing::info!(
            "Restored index generation {} ({} chunks) from {:?}",
            header.generation,
            snapshot.index.len(),
            dir
        );
        self.index.publish(IndexGeneration {
            id: header.generation,
            built_at: header.built_at,
            index: Box::new(snapshot.index),
        });
    }

    /// Build a service from application configuration and workspace files.
    pub fn open(app: &AppConfig) -> AppResult<Self> {
        let knowledge = KnowledgeConfig::load(&app.workspace)?;
        let access = RoleAccessTable::load_or_builtin(&app.workspace)?;
        let template = load_template(&app.workspace)?;
        let embedder = embeddings::create_provider(&knowledge.embedding)?;
        let llm = create_client(
            &app.provider,
            app.endpoint.as_deref(),
            app.timeout_secs.map(Duration::from_secs),
        )?;

        tracing::debug!(
            "Opening knowledge service: embedder={} ({}), generator={} ({})",
            embedder.provider_name(),
            embedder.model_name(),
            llm.provider_name(),
            app.model
        );

        Self::new(access, embedder, llm, template, knowledge, app.model.clone())
            .with_snapshot_dir(config::index_dir(&app.workspace))
    }

    pub fn access(&self) -> &RoleAccessTable {
        &self.access
    }

    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    pub fn index_handle(&self) -> &IndexHandle {
        &self.index
    }

    /// Rebuild the index from `base_dir` and publish it.
    ///
    /// Rebuilds are serialised. The new generation is embedded and persisted
    /// before it is published; if any step fails the previous generation
    /// keeps serving.
    pub async fn run_ingestion(
        &self,
        base_dir: &Path,
        reporter: &ProgressReporter,
    ) -> AppResult<IngestionStats> {
        let _rebuild = self.index.lock_rebuild().await;
        let start = Instant::now();

        tracing::info!("Starting ingestion from {:?}", base_dir);

        let collected = ingest::collect_chunks(base_dir, &self.access, &self.config, reporter)?;

        let total = collected.chunks.len() as u64;
        let model = self.embedder.model_name().to_string();
        let embeddings = embeddings::embed_chunks(
            self.embedder.as_ref(),
            &collected.chunks,
            self.config.embedding.batch_size,
            |done| reporter.embed(done as u64, total, &model),
        )
        .await?;

        let mut index = FlatIndex::new(self.embedder.dimensions());
        index.upsert(
            collected
                .chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
                .collect(),
        )?;

        let generation = self.index.next_generation_id();
        let built_at = Utc::now();

        if let Some(dir) = &self.snapshot_dir {
            let header = SnapshotHeader {
                generation,
                built_at,
                provider: self.embedder.provider_name().to_string(),
                model: self.embedder.model_name().to_string(),
            };
            flat_index::save_snapshot(dir, &header, &index)?;
        }

        let chunk_count = index.len();
        self.index.publish(IndexGeneration {
            id: generation,
            built_at,
            index: Box::new(index),
        });
        reporter.publish(generation, chunk_count);

        let stats = IngestionStats {
            total_documents: collected.total_documents,
            total_chunks: chunk_count as u32,
            chunks_per_department: collected.chunks_per_department,
            skipped_files: collected.skipped_files,
            skipped_departments: collected.skipped_departments,
            generation,
            duration_secs: start.elapsed().as_secs_f64(),
        };

        tracing::info!(
            "Ingestion completed: {} documents, {} chunks, generation {} in {:.2}s",
            stats.total_documents,
            stats.total_chunks,
            stats.generation,
            stats.duration_secs
        );

        Ok(stats)
    }

    /// Role-filtered retrieval against the current generation.
    pub async fn retrieve(&self, role: &str, query: &str, k: usize) -> AppResult<Vec<SearchHit>> {
        self.access.role(role)?;
        let generation = self.index.current()?;

        self.retriever
            .retrieve(
                &self.access,
                self.embedder.as_ref(),
                generation.index.as_ref(),
                query,
                role,
                k,
            )
            .await
    }

    /// Answer a question from the evidence the role may read.
    ///
    /// Unknown roles fail before the index is consulted; a query before the
    /// first ingestion fails with `NotReady`. When nothing readable is found
    /// the fixed fallback answer is returned without calling the generator.
    /// Every outcome, including failures, leaves one audit event.
    pub async fn answer_query(&self, options: AskOptions) -> AppResult<RagResponse> {
        let principal = options.principal.as_deref();

        let role = match self.access.role(&options.role) {
            Ok(role) => role,
            Err(e) => {
                audit::record_rejected(principal, &options.role, &options.query);
                return Err(e);
            }
        };

        match self.answer_as(&role, &options).await {
            Ok((response, evidence)) => {
                audit::record_query(
                    principal,
                    &role,
                    &options.query,
                    evidence,
                    response.confidence,
                );
                Ok(response)
            }
            Err(e) => {
                audit::record_failed(principal, &role, &options.query, &e);
                Err(e)
            }
        }
    }

    /// The response and the number of evidence chunks it was built from.
    async fn answer_as(
        &self,
        role: &Role,
        options: &AskOptions,
    ) -> AppResult<(RagResponse, usize)> {
        let hits = self
            .retrieve(role.as_str(), &options.query, options.top_k)
            .await?;

        if hits.is_empty() {
            tracing::info!("No permitted evidence for role '{}'", role);
            return Ok((RagResponse::no_evidence(), 0));
        }

        let generator = AnswerGenerator {
            client: self.llm.as_ref(),
            template: &self.template,
            model: &self.model,
            max_tokens: self.config.max_answer_tokens,
        };
        let answer = generator.generate(&options.query, &hits).await?;

        let response = RagResponse {
            answer,
            confidence: rag::confidence(&hits),
            citations: rag::citations(&hits),
        };
        Ok((response, hits.len()))
    }

    /// Readiness of the served index.
    pub fn status(&self) -> IndexStatus {
        match self.index.current() {
            Ok(generation) => IndexStatus {
                ready: true,
                generation: Some(generation.id),
                chunks: generation.index.len(),
                built_at: Some(generation.built_at),
            },
            Err(_) => IndexStatus {
                ready: false,
                generation: None,
                chunks: 0,
                built_at: None,
            },
        }
    }
}
