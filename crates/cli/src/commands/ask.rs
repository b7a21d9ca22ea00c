//! Ask command handler.
//!
//! Answers a question from the evidence the given role is cleared to read.

use clap::Args;
use clearance_core::{config::AppConfig, AppResult};
use clearance_knowledge::{AskOptions, KnowledgeService, RagResponse};

/// Ask a question as a role
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Role the question is asked under
    #[arg(short, long)]
    pub role: String,

    /// Name of the person asking (recorded in the audit trail)
    #[arg(short, long, env = "USER")]
    pub user: Option<String>,

    /// Number of chunks to retrieve (default from knowledge config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command as role '{}'", self.role);
        tracing::debug!("Ask command options: {:?}", self);

        let service = KnowledgeService::open(config)?;

        let options = AskOptions {
            role: self.role.clone(),
            query: self.question.clone(),
            top_k: self.top_k.unwrap_or(service.config().top_k),
            principal: self.user.clone(),
        };

        let response = service.answer_query(options).await?;

        tracing::debug!(
            "RAG response: confidence={:.2}, citations={}",
            response.confidence,
            response.citations.len()
        );

        if self.json {
            super::print_json(&serde_json::to_value(&response)?)?;
        } else {
            print_response(&response);
        }

        Ok(())
    }
}

fn print_response(response: &RagResponse) {
    println!("Answer:");
    println!("{}", response.answer);
    println!();
    println!("Confidence: {:.2}", response.confidence);

    if response.citations.is_empty() {
        println!("Sources: (none)");
    } else {
        println!("Sources:");
        for citation in &response.citations {
            println!(
                "- [{}] {} ({})",
                citation.id, citation.source_path, citation.department
            );
        }
    }
}
