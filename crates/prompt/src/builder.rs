//! Prompt builder for rendering the grounding template.

use crate::types::{BuiltPrompt, GroundingTemplate};
use clearance_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

#[derive(Serialize)]
struct SourceBlock<'a> {
    label: usize,
    text: &'a str,
}

#[derive(Serialize)]
struct TemplateVars<'a> {
    system: &'a str,
    sources: Vec<SourceBlock<'a>>,
    query: &'a str,
}

/// Build the grounded prompt for a question.
///
/// `passages` are the texts of the retrieval survivors, in rank order; they are
/// labelled `[Source 1]..[Source N]`. Nothing else is interpolated, so the
/// generator sees exactly the evidence that passed access filtering.
///
/// # Example
/// ```no_run
/// use clearance_prompt::{build_grounded_prompt, GroundingTemplate};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let template = GroundingTemplate::builtin()?;
/// let passages = vec!["Q3 revenue grew 12%.".to_string()];
/// let built = build_grounded_prompt(&template, "How did revenue change?", &passages)?;
/// println!("{}", built.text);
/// # Ok(())
/// # }
/// ```
pub fn build_grounded_prompt(
    template: &GroundingTemplate,
    query: &str,
    passages: &[String],
) -> AppResult<BuiltPrompt> {
    tracing::debug!(
        "Building prompt {} with {} passages",
        template.id,
        passages.len()
    );

    let vars = TemplateVars {
        system: &template.system,
        sources: passages
            .iter()
            .enumerate()
            .map(|(i, text)| SourceBlock { label: i + 1, text })
            .collect(),
        query,
    };

    let text = render_template(&template.template, &vars)?;

    Ok(BuiltPrompt {
        text,
        template_id: template.id.clone(),
        source_count: passages.len(),
    })
}

/// Render a Handlebars template with variables.
fn render_template<T: Serialize>(template: &str, variables: &T) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output; document text must not be HTML-escaped
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
