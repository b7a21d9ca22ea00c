//! RAG response types.

use crate::types::Citation;
use clearance_prompt::FALLBACK_ANSWER;
use serde::{Deserialize, Serialize};

/// Response to an answered query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    /// Generated answer, or the fixed fallback sentence
    pub answer: String,

    /// Scalar in [0, 1] derived from retrieval distances
    pub confidence: f32,

    /// Sources the answer was grounded on
    pub citations: Vec<Citation>,
}

impl RagResponse {
    /// The response when no permitted evidence exists.
    ///
    /// Not an error: the role simply cannot see anything relevant.
    pub fn no_evidence() -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            confidence: 0.0,
            citations: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.citations.is_empty() && self.answer == FALLBACK_ANSWER
    }
}
