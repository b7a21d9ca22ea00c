//! In-process collaborators for pipeline tests.

use crate::access::{Department, Role, RoleAccessTable};
use crate::config::KnowledgeConfig;
use crate::embeddings::providers::trigram::TrigramProvider;
use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use crate::types::{Chunk, IndexedChunk, SearchHit};
use crate::vector_index::VectorIndex;
use crate::KnowledgeService;
use clearance_core::{AppError, AppResult};
use clearance_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use clearance_prompt::GroundingTemplate;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const DIMENSIONS: usize = 64;

pub const CANNED_ANSWER: &str = "Grounded answer.";

/// Generator that records every prompt and returns a canned answer.
#[derive(Debug, Default)]
pub struct RecordingLlm {
    prompts: Mutex<Vec<String>>,
}

impl RecordingLlm {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for RecordingLlm {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        Ok(LlmResponse {
            content: format!("  {}\n", CANNED_ANSWER),
            model: request.model.clone(),
            usage: LlmUsage::new(10, 3),
            done: true,
        })
    }
}

/// Generator whose backend is down.
#[derive(Debug)]
pub struct UnreachableLlm;

#[async_trait::async_trait]
impl LlmClient for UnreachableLlm {
    fn provider_name(&self) -> &str {
        "unreachable"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        Err(AppError::Llm("connection refused".to_string()))
    }
}

/// Embedder whose backend is down.
#[derive(Debug)]
pub struct UnreachableEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for UnreachableEmbedder {
    fn provider_name(&self) -> &str {
        "unreachable"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::Retrieval("embedding service unavailable".to_string()))
    }
}

/// Trigram vectors reported under another model name.
#[derive(Debug)]
pub struct RenamedEmbedder {
    pub inner: TrigramProvider,
    pub model: &'static str,
}

#[async_trait::async_trait]
impl EmbeddingProvider for RenamedEmbedder {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.model
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.inner.embed_batch(texts).await
    }
}

/// Index that ignores the query and returns preset hits in their given order.
#[derive(Debug)]
pub struct FixedIndex {
    pub hits: Vec<SearchHit>,
}

impl VectorIndex for FixedIndex {
    fn upsert(&mut self, chunks: Vec<IndexedChunk>) -> AppResult<()> {
        self.hits.extend(chunks.into_iter().map(|c| SearchHit {
            chunk: c.chunk,
            distance: 0.0,
        }));
        Ok(())
    }

    fn search(&self, _query: &[f32], n: usize) -> AppResult<Vec<SearchHit>> {
        Ok(self.hits.iter().take(n).cloned().collect())
    }

    fn len(&self) -> usize {
        self.hits.len()
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}

/// Index whose backend is down.
#[derive(Debug)]
pub struct UnreachableIndex;

impl VectorIndex for UnreachableIndex {
    fn upsert(&mut self, _chunks: Vec<IndexedChunk>) -> AppResult<()> {
        Err(AppError::Retrieval("index unavailable".to_string()))
    }

    fn search(&self, _query: &[f32], _n: usize) -> AppResult<Vec<SearchHit>> {
        Err(AppError::Retrieval("index unavailable".to_string()))
    }

    fn len(&self) -> usize {
        0
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}

pub fn chunk(id: &str, department: &str, roles: &[&str], text: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: text.to_string(),
        department: Department::new(department),
        accessible_roles: roles.iter().map(Role::new).collect(),
        source_path: format!("{}/{}.md", department, id),
        position: 0,
    }
}

pub fn hit(chunk: Chunk, distance: f32) -> SearchHit {
    SearchHit { chunk, distance }
}

pub fn test_config() -> KnowledgeConfig {
    KnowledgeConfig {
        chunk_size: 400,
        chunk_overlap: 40,
        embedding: EmbeddingConfig {
            dimensions: DIMENSIONS,
            batch_size: 4,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn service_with(
    config: KnowledgeConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmClient>,
) -> KnowledgeService {
    KnowledgeService::new(
        RoleAccessTable::builtin().unwrap(),
        embedder,
        llm,
        GroundingTemplate::builtin().unwrap(),
        config,
        "test-model",
    )
}

/// Service over the built-in access table with a trigram embedder.
pub fn service(llm: Arc<dyn LlmClient>) -> KnowledgeService {
    service_with(
        test_config(),
        Arc::new(TrigramProvider::new(DIMENSIONS)),
        llm,
    )
}

pub fn write_doc(base: &Path, relative: &str, content: &str) {
    let path = base.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small company document tree.
pub fn company_docs(base: &Path) {
    write_doc(
        base,
        "finance/q3_report.md",
        "# Q3 Financial Report\n\nQuarterly revenue grew twelve percent to 4.2 million. \
         Operating margin improved to 18 percent.",
    );
    write_doc(
        base,
        "finance/payroll.csv",
        "month,payroll\nJuly,310000\nAugust,312000\n",
    );
    write_doc(
        base,
        "marketing/campaign.md",
        "The spring campaign codename is BLUEHERON. Campaign budget was 800 thousand.",
    );
    write_doc(
        base,
        "hr/leave_policy.md",
        "Employees receive 25 days of annual leave.",
    );
    write_doc(
        base,
        "engineering/architecture.md",
        "Services communicate over gRPC behind an internal gateway.",
    );
    write_doc(
        base,
        "general/handbook.md",
        "The office opens at nine. Lunch is served in the cafeteria.",
    );
}
