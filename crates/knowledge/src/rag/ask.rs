//! Answer generation over retrieved evidence.

use crate::types::SearchHit;
use clearance_core::AppResult;
use clearance_llm::{LlmClient, LlmRequest};
use clearance_prompt::{build_grounded_prompt, GroundingTemplate};

/// Everything needed to turn permitted evidence into an answer.
pub struct AnswerGenerator<'a> {
    pub client: &'a dyn LlmClient,
    pub template: &'a GroundingTemplate,
    pub model: &'a str,
    pub max_tokens: u32,
}

impl AnswerGenerator<'_> {
    /// Build the grounded prompt from `hits` and make one completion call.
    ///
    /// Only the texts of `hits` reach the generator. Generator failures
    /// propagate; they are never replaced by the fallback answer.
    pub async fn generate(&self, query: &str, hits: &[SearchHit]) -> AppResult<String> {
        let passages: Vec<String> = hits.iter().map(|hit| hit.chunk.text.clone()).collect();
        let prompt = build_grounded_prompt(self.template, query, &passages)?;

        tracing::debug!(
            "Generating answer with {} using {} sources ({} chars)",
            self.model,
            prompt.source_count,
            prompt.text.len()
        );

        let request = LlmRequest::new(prompt.text, self.model)
            .with_max_tokens(self.max_tokens)
            .with_temperature(0.0);

        let response = self.client.complete(&request).await?;

        tracing::debug!(
            "Generated answer: {} completion tokens",
            response.usage.completion_tokens
        );

        Ok(response.content.trim().to_string())
    }
}
