//! Status command handler.
//!
//! Reports whether a persisted index generation is available to serve queries.

use clap::Args;
use clearance_core::{config::AppConfig, AppResult};
use clearance_knowledge::KnowledgeService;

/// Show index readiness
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing status command");

        let service = KnowledgeService::open(config)?;
        let status = service.status();

        if self.json {
            return super::print_json(&serde_json::to_value(&status)?);
        }

        if !status.ready {
            println!("Index: not ready (run `clearance ingest` first)");
            return Ok(());
        }

        println!("Index: ready");
        if let Some(generation) = status.generation {
            println!("Generation: {}", generation);
        }
        println!("Chunks: {}", status.chunks);
        if let Some(built_at) = status.built_at {
            println!("Built at: {}", built_at.to_rfc3339());
        }

        Ok(())
    }
}
