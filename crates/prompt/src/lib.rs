//! Prompt system for Clearance.
//!
//! This crate assembles the only text the answer generator ever sees:
//! - YAML-based grounding template definitions
//! - Handlebars template rendering
//! - One labelled block per retrieved passage, then the literal question

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_grounded_prompt;
pub use loader::{load_template, template_path};
pub use types::{BuiltPrompt, GroundingTemplate, FALLBACK_ANSWER};
