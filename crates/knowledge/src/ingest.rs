//! Department-tagged document ingestion.
//!
//! Reads `<base>/<department>/**` and produces the full chunk set for one
//! index generation. Every chunk carries exactly the roles allowed to read its
//! department.

use crate::access::{Department, RoleAccessTable};
use crate::chunker;
use crate::config::KnowledgeConfig;
use crate::parser;
use crate::progress::ProgressReporter;
use crate::types::Chunk;
use clearance_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Output of the read-and-chunk phase.
#[derive(Debug, Default)]
pub struct CollectedChunks {
    pub chunks: Vec<Chunk>,
    pub total_documents: u32,
    pub chunks_per_department: BTreeMap<Department, u32>,
    pub skipped_files: u32,
    pub skipped_departments: Vec<String>,
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// `/`-separated path of `path` relative to `base`.
fn relative_source_path(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Read and chunk every department under `base_dir`.
///
/// Departments and files are visited in sorted order, so two runs over an
/// unchanged tree produce identical chunks. Unreadable or empty files are
/// counted and skipped; subdirectories that are not departments in `access`
/// are reported and skipped.
pub fn collect_chunks(
    base_dir: &Path,
    access: &RoleAccessTable,
    config: &KnowledgeConfig,
    reporter: &ProgressReporter,
) -> AppResult<CollectedChunks> {
    if !base_dir.is_dir() {
        return Err(AppError::Knowledge(format!(
            "Document directory {:?} does not exist or is not a directory",
            base_dir
        )));
    }

    let mut department_dirs: Vec<(String, std::path::PathBuf)> = fs::read_dir(base_dir)
        .map_err(|e| AppError::Knowledge(format!("Failed to list {:?}: {}", base_dir, e)))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| (entry.file_name().to_string_lossy().to_string(), entry.path()))
        .filter(|(name, _)| !is_hidden(name))
        .collect();
    department_dirs.sort();

    let mut collected = CollectedChunks::default();
    let total_departments = department_dirs.len() as u64;
    let mut files_seen = 0u64;

    for (i, (name, dir)) in department_dirs.iter().enumerate() {
        reporter.department(i as u64 + 1, total_departments, name);

        let department = Department::new(name);
        if !access.contains_department(&department) {
            tracing::warn!(
                "Skipping directory {:?}: '{}' is not a department in the access table",
                dir,
                name
            );
            collected.skipped_departments.push(name.clone());
            continue;
        }

        let roles = access.roles_for_department(&department);
        let count = collected
            .chunks_per_department
            .entry(department.clone())
            .or_insert(0);

        for entry in WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                    collected.skipped_files += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let source_path = relative_source_path(base_dir, path);
            files_seen += 1;
            reporter.parse(files_seen, &source_path);

            let text = match parser::parse_file(path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", source_path, e);
                    collected.skipped_files += 1;
                    continue;
                }
            };

            let chunks = chunker::chunk_document(
                &department,
                &roles,
                &source_path,
                &text,
                config.chunk_size,
                config.chunk_overlap,
            )?;

            if chunks.is_empty() {
                tracing::warn!("Skipping {}: no content", source_path);
                collected.skipped_files += 1;
                continue;
            }

            tracing::debug!("Chunked {} into {} chunks", source_path, chunks.len());

            collected.total_documents += 1;
            *count += chunks.len() as u32;
            collected.chunks.extend(chunks);
            reporter.chunk(files_seen, collected.chunks.len());
        }
    }

    tracing::info!(
        "Collected {} chunks from {} documents ({} files skipped, {} directories skipped)",
        collected.chunks.len(),
        collected.total_documents,
        collected.skipped_files,
        collected.skipped_departments.len()
    );

    Ok(collected)
}
