//! Ingest command handler.
//!
//! Rebuilds the index from the department folders and prints a per-department summary.

use clap::Args;
use clearance_core::{config::AppConfig, AppResult};
use clearance_knowledge::{IngestionStats, KnowledgeService, ProgressEvent, ProgressReporter};
use std::sync::Arc;

/// Rebuild the index from the department folders
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        // --data-dir is a global flag and already folded into the config
        let base_dir = &config.data_dir;
        tracing::info!("Executing ingest command for {:?}", base_dir);

        let service = KnowledgeService::open(config)?;

        let reporter = if self.json {
            ProgressReporter::noop()
        } else {
            ProgressReporter::new(Arc::new(|event: ProgressEvent| {
                eprintln!("{}", event.format_simple())
            }))
        };

        let stats = service.run_ingestion(base_dir, &reporter).await?;

        if self.json {
            super::print_json(&serde_json::to_value(&stats)?)?;
        } else {
            print_summary(&stats);
        }

        Ok(())
    }
}

fn print_summary(stats: &IngestionStats) {
    let width = stats
        .chunks_per_department
        .keys()
        .map(|d| d.as_str().len())
        .max()
        .unwrap_or(0)
        .max("DEPARTMENT".len());

    println!("{:<width$}  CHUNKS", "DEPARTMENT", width = width);
    for (department, chunks) in &stats.chunks_per_department {
        println!("{:<width$}  {:>6}", department.as_str(), chunks, width = width);
    }
    println!();
    println!(
        "Indexed {} documents ({} chunks) as generation {} in {:.2}s",
        stats.total_documents, stats.total_chunks, stats.generation, stats.duration_secs
    );

    if stats.skipped_files > 0 {
        println!("Skipped {} unreadable files", stats.skipped_files);
    }
    if !stats.skipped_departments.is_empty() {
        println!(
            "Skipped unknown departments: {}",
            stats.skipped_departments.join(", ")
        );
    }
}
