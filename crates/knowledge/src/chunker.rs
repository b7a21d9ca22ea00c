//! Text chunking with configurable size and overlap.

use crate::access::{Department, Role};
use crate::types::Chunk;
use clearance_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use text_splitter::{ChunkConfig, TextSplitter};

/// Split text into overlapping pieces of at most `chunk_size` characters.
///
/// Splitting prefers semantic boundaries (paragraphs, sentences, words) over
/// raw character offsets. Whitespace-only pieces are dropped.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> AppResult<Vec<String>> {
    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|e| AppError::Config(format!("Invalid chunking parameters: {}", e)))?;

    let splitter = TextSplitter::new(config);

    let pieces: Vec<String> = splitter
        .chunks(text)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect();

    tracing::debug!(
        "Chunked {} bytes into {} pieces (size: {}, overlap: {})",
        text.len(),
        pieces.len(),
        chunk_size,
        overlap
    );

    Ok(pieces)
}

/// Deterministic chunk id: SHA-256 over department, path, position and text.
pub fn chunk_id(department: &Department, source_path: &str, position: u32, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(department.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(source_path.as_bytes());
    hasher.update([0u8]);
    hasher.update(position.to_le_bytes());
    hasher.update(text.as_bytes());

    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Chunk one document and tag every piece with its department and readers.
pub fn chunk_document(
    department: &Department,
    accessible_roles: &BTreeSet<Role>,
    source_path: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> AppResult<Vec<Chunk>> {
    let pieces = split_text(text, chunk_size, overlap)?;

    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let position = i as u32;
            Chunk {
                id: chunk_id(department, source_path, position, &text),
                text,
                department: department.clone(),
                accessible_roles: accessible_roles.clone(),
                source_path: source_path.to_string(),
                position,
            }
        })
        .collect())
}
