//! Loader for the YAML prompt definition file.

use crate::builder::check_syntax;
use crate::types::PromptTemplate;
use std::collections::BTreeMap;
use std::path::Path;
use taxrag_core::{AppError, AppResult};

/// Load every template from a prompt definition file.
///
/// The file is a YAML mapping from template name to a definition with
/// `system`, `template` and optional `temperature` / `max_tokens` fields.
///
/// # Errors
/// * `AppError::NotFound` if the file does not exist
/// * `AppError::Parse` if the file is not a valid definition mapping
///
/// # Example
/// ```no_run
/// use taxrag_prompt::load_templates;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let templates = load_templates(Path::new("config/prompts/base.yaml"))?;
/// println!("Loaded {} templates", templates.len());
/// # Ok(())
/// # }
/// ```
pub fn load_templates(path: &Path) -> AppResult<BTreeMap<String, PromptTemplate>> {
    tracing::debug!("Loading prompts from: {:?}", path);

    if !path.is_file() {
        return Err(AppError::NotFound(format!(
            "Prompt file not found: {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    let templates = parse_templates(&contents)
        .map_err(|e| AppError::Parse(format!("{}: {}", path.display(), e)))?;

    tracing::info!("Loaded {} prompt templates from {:?}", templates.len(), path);

    Ok(templates)
}

/// Parse a prompt definition document.
pub fn parse_templates(contents: &str) -> AppResult<BTreeMap<String, PromptTemplate>> {
    let raw: BTreeMap<String, PromptTemplate> = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Parse(format!("Failed to parse prompt YAML: {}", e)))?;

    let mut templates = BTreeMap::new();
    for (name, mut template) in raw {
        template.name = name.clone();
        validate_template(&template)?;
        templates.insert(name, template);
    }

    Ok(templates)
}

fn validate_template(template: &PromptTemplate) -> AppResult<()> {
    if template.name.trim().is_empty() {
        return Err(AppError::Parse("Prompt name cannot be empty".to_string()));
    }

    if template.template.trim().is_empty() {
        return Err(AppError::Parse(format!(
            "Prompt '{}' has an empty template",
            template.name
        )));
    }

    if let Some(temperature) = template.temperature {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(AppError::Parse(format!(
                "Prompt '{}' temperature must be between 0.0 and 1.0, got {}",
                template.name, temperature
            )));
        }
    }

    if template.max_tokens == Some(0) {
        return Err(AppError::Parse(format!(
            "Prompt '{}' max_tokens must be positive",
            template.name
        )));
    }

    check_syntax(template)
}
