//! Knowledge configuration management.

use crate::embeddings::EmbeddingConfig;
use clearance_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retrieval and ingestion settings, `.clearance/knowledge.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeConfig {
    /// Maximum chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Default number of hits per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Candidates requested per wanted hit before role filtering
    #[serde(default = "default_oversample_factor")]
    pub oversample_factor: usize,

    /// Upper bound on generated answer length
    #[serde(default = "default_max_answer_tokens")]
    pub max_answer_tokens: u32,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_top_k() -> usize {
    5
}

fn default_oversample_factor() -> usize {
    2
}

fn default_max_answer_tokens() -> u32 {
    512
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            oversample_factor: default_oversample_factor(),
            max_answer_tokens: default_max_answer_tokens(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl KnowledgeConfig {
    /// Load `.clearance/knowledge.yaml`, falling back to defaults when absent.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        let config_path = config_path(workspace);

        let config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).map_err(|e| {
                AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
            })?;

            let config: Self = serde_yaml::from_str(&content).map_err(|e| {
                AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
            })?;

            tracing::debug!("Loaded knowledge config from {:?}", config_path);
            config
        } else {
            tracing::debug!("No knowledge config at {:?}, using defaults", config_path);
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.oversample_factor == 0 {
            return Err(AppError::Config(
                "oversample_factor must be at least 1".to_string(),
            ));
        }

        self.embedding.validate()
    }
}

/// Get the path to the knowledge config file.
pub fn config_path(workspace: &Path) -> PathBuf {
    workspace.join(".clearance").join("knowledge.yaml")
}

/// Get the directory holding the persisted index snapshot.
pub fn index_dir(workspace: &Path) -> PathBuf {
    workspace.join(".clearance").join("index")
}
