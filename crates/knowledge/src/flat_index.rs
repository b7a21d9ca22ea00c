//! Exact in-memory vector index with JSON snapshot persistence.

use crate::types::{IndexedChunk, SearchHit};
use crate::vector_index::VectorIndex;
use chrono::{DateTime, Utc};
use clearance_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot layout version.
const SNAPSHOT_FORMAT: u32 = 2;

const SNAPSHOT_FILE: &str = "snapshot.json";

/// Brute-force index using squared Euclidean distance.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    entries: Vec<IndexedChunk>,
    positions: HashMap<String, usize>,
}

impl FlatIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn check_dimensions(&self, len: usize, what: &str) -> AppResult<()> {
        if len != self.dimensions {
            return Err(AppError::Retrieval(format!(
                "{} has {} dimensions, index expects {}",
                what, len, self.dimensions
            )));
        }
        Ok(())
    }
}

/// Squared Euclidean distance; always non-negative.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

impl VectorIndex for FlatIndex {
    fn upsert(&mut self, chunks: Vec<IndexedChunk>) -> AppResult<()> {
        for item in chunks {
            self.check_dimensions(item.embedding.len(), &format!("Chunk {}", item.chunk.id))?;

            match self.positions.get(&item.chunk.id) {
                Some(&pos) => self.entries[pos] = item,
                None => {
                    self.positions
                        .insert(item.chunk.id.clone(), self.entries.len());
                    self.entries.push(item);
                }
            }
        }
        Ok(())
    }

    fn search(&self, query: &[f32], n: usize) -> AppResult<Vec<SearchHit>> {
        self.check_dimensions(query.len(), "Query embedding")?;

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, squared_l2(query, &entry.embedding)))
            .collect();

        // Stable: equal distances keep insertion order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(n);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| SearchHit {
                chunk: self.entries[i].chunk.clone(),
                distance,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Identity of a persisted generation and the embedder that produced its vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub generation: u64,
    pub built_at: DateTime<Utc>,
    pub provider: String,
    pub model: String,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    format: u32,
    #[serde(flatten)]
    header: &'a SnapshotHeader,
    dimensions: usize,
    chunks: &'a [IndexedChunk],
}

#[derive(Deserialize)]
struct SnapshotOwned {
    format: u32,
    #[serde(flatten)]
    header: SnapshotHeader,
    dimensions: usize,
    chunks: Vec<IndexedChunk>,
}

/// An index restored from disk with the header it was saved under.
#[derive(Debug)]
pub struct LoadedSnapshot {
    pub header: SnapshotHeader,
    pub index: FlatIndex,
}

pub fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(SNAPSHOT_FILE)
}

/// Write `index` as the snapshot in `dir`, replacing whatever was there.
///
/// The directory is removed first so no stale file from a previous
/// generation survives; the snapshot itself is written to a temporary file
/// and renamed into place.
pub fn save_snapshot(dir: &Path, header: &SnapshotHeader, index: &FlatIndex) -> AppResult<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| {
            AppError::Knowledge(format!("Failed to remove previous index at {:?}: {}", dir, e))
        })?;
    }
    fs::create_dir_all(dir).map_err(|e| {
        AppError::Knowledge(format!("Failed to create index directory {:?}: {}", dir, e))
    })?;

    let snapshot = SnapshotRef {
        format: SNAPSHOT_FORMAT,
        header,
        dimensions: index.dimensions,
        chunks: &index.entries,
    };
    let json = serde_json::to_vec(&snapshot)?;

    let path = snapshot_path(dir);
    let tmp = dir.join(format!("{}.tmp", SNAPSHOT_FILE));
    fs::write(&tmp, json).map_err(|e| {
        AppError::Knowledge(format!("Failed to write index snapshot {:?}: {}", tmp, e))
    })?;
    fs::rename(&tmp, &path).map_err(|e| {
        AppError::Knowledge(format!("Failed to move index snapshot into {:?}: {}", path, e))
    })?;

    tracing::debug!(
        "Saved index snapshot generation {} ({} chunks) to {:?}",
        header.generation,
        index.len(),
        path
    );
    Ok(())
}

/// Read the snapshot in `dir`, if one exists.
pub fn load_snapshot(dir: &Path) -> AppResult<Option<LoadedSnapshot>> {
    let path = snapshot_path(dir);
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(&path).map_err(|e| {
        AppError::Knowledge(format!("Failed to read index snapshot {:?}: {}", path, e))
    })?;
    let snapshot: SnapshotOwned = serde_json::from_slice(&bytes)?;

    if snapshot.format != SNAPSHOT_FORMAT {
        return Err(AppError::Knowledge(format!(
            "Unsupported index snapshot format {} in {:?}",
            snapshot.format, path
        )));
    }

    let mut index = FlatIndex::new(snapshot.dimensions);
    index.upsert(snapshot.chunks)?;

    Ok(Some(LoadedSnapshot {
        header: snapshot.header,
        index,
    }))
}
