//! Prompt types for Clearance.

use clearance_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Answer returned verbatim when no permitted evidence exists.
///
/// The default system instruction asks the generator to reply with this exact
/// sentence when the context does not contain the answer, so both paths read
/// the same to the user.
pub const FALLBACK_ANSWER: &str =
    "The requested information is not available in the provided documents.";

/// Built-in grounding template, shipped as data.
pub(crate) const DEFAULT_TEMPLATE_YAML: &str = include_str!("../prompts/grounded.yml");

/// A grounding prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingTemplate {
    /// Unique template identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Fixed system instruction injected as `{{system}}`
    pub system: String,

    /// Handlebars template; receives `system`, `sources[] {label, text}` and `query`
    pub template: String,
}

impl GroundingTemplate {
    /// The built-in template shipped with the crate.
    pub fn builtin() -> AppResult<Self> {
        serde_yaml::from_str(DEFAULT_TEMPLATE_YAML).map_err(|e| {
            AppError::Prompt(format!("Built-in grounding template is malformed: {}", e))
        })
    }
}

/// A fully rendered prompt ready for the answer generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Rendered prompt text
    pub text: String,

    /// Template the prompt was rendered from
    #[serde(rename = "templateId")]
    pub template_id: String,

    /// Number of `[Source i]` blocks included
    #[serde(rename = "sourceCount")]
    pub source_count: usize,
}
