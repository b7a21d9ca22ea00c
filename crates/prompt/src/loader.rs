//! Grounding template loader.

use crate::types::GroundingTemplate;
use clearance_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Path of the workspace override for the grounding template.
pub fn template_path(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".clearance/prompts/grounded.yml")
}

/// Load the grounding template for a workspace.
///
/// Uses `.clearance/prompts/grounded.yml` when present, otherwise the built-in
/// template. Either way the result is validated before use.
///
/// # Example
/// ```no_run
/// use clearance_prompt::load_template;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let template = load_template(Path::new("."))?;
/// println!("Using template: {}", template.id);
/// # Ok(())
/// # }
/// ```
pub fn load_template(workspace_path: &Path) -> AppResult<GroundingTemplate> {
    let path = template_path(workspace_path);

    let template = if path.exists() {
        tracing::debug!("Loading grounding template from: {:?}", path);

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            AppError::Prompt(format!("Failed to read template file {:?}: {}", path, e))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Prompt(format!("Failed to parse template YAML {:?}: {}", path, e))
        })?
    } else {
        GroundingTemplate::builtin()?
    };

    validate_template(&template)?;

    tracing::info!("Loaded grounding template: {} ({})", template.id, template.title);

    Ok(template)
}

/// Validate a grounding template.
///
/// A template that drops the question, the passages or the system
/// instruction would let the generator answer from something other than the
/// permitted context.
pub fn validate_template(def: &GroundingTemplate) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Template ID cannot be empty".to_string()));
    }

    if def.api_version.is_empty() || !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {:?}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if def.system.trim().is_empty() {
        return Err(AppError::Prompt(
            "Template system instruction cannot be empty".to_string(),
        ));
    }

    for required in ["{{system}}", "{{query}}", "{{#each sources}}"] {
        if !def.template.contains(required) {
            return Err(AppError::Prompt(format!(
                "Template '{}' must reference {}",
                def.id, required
            )));
        }
    }

    Ok(())
}
