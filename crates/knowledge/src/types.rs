//! Knowledge system type definitions.

use crate::access::{Department, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A bounded fragment of a source document, tagged with who may read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic content hash
    pub id: String,

    /// Text content
    pub text: String,

    /// Department the source document belongs to
    pub department: Department,

    /// Exactly the roles whose allowed departments contain `department`
    pub accessible_roles: BTreeSet<Role>,

    /// Source path relative to the ingestion base directory, `/`-separated
    pub source_path: String,

    /// Position within source
    pub position: u32,
}

impl Chunk {
    /// Exact set membership; role names are never matched by substring.
    pub fn readable_by(&self, role: &Role) -> bool {
        self.accessible_roles.contains(role)
    }
}

/// A chunk together with its embedding, as stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// One nearest-neighbour result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: Chunk,

    /// Non-negative dissimilarity; smaller is more relevant
    pub distance: f32,
}

/// A deduplicated source reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based, sequential in first-seen order
    pub id: usize,
    pub source_path: String,
    pub department: Department,
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestionStats {
    /// Files that produced at least one chunk
    pub total_documents: u32,

    /// Chunks written to the new index
    pub total_chunks: u32,

    /// Chunk count per department, including departments with zero chunks
    pub chunks_per_department: BTreeMap<Department, u32>,

    /// Files that could not be read or produced no chunks
    pub skipped_files: u32,

    /// Subdirectories that are not departments in the access table
    pub skipped_departments: Vec<String>,

    /// Generation id of the published index
    pub generation: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Options for the ask operation.
#[derive(Debug, Clone)]
pub struct AskOptions {
    /// Authenticated role, as supplied by the caller
    pub role: String,

    /// Query text
    pub query: String,

    /// Number of chunks to retrieve
    pub top_k: usize,

    /// Who is asking; recorded in the audit trail only
    pub principal: Option<String>,
}

/// Readiness of the published index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStatus {
    pub ready: bool,
    pub generation: Option<u64>,
    pub chunks: usize,
    pub built_at: Option<DateTime<Utc>>,
}
