//! In-memory prompt template store.

use crate::builder::render_template;
use crate::loader::load_templates;
use crate::types::{GenerationParams, PromptTemplate};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use taxrag_core::{AppError, AppResult};

/// Named prompt templates, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PromptStore {
    templates: BTreeMap<String, PromptTemplate>,
}

impl PromptStore {
    /// Load the store from a YAML definition file.
    pub fn load(path: &Path) -> AppResult<Self> {
        Ok(Self {
            templates: load_templates(path)?,
        })
    }

    /// Build a store from already parsed templates.
    pub fn from_templates(templates: impl IntoIterator<Item = PromptTemplate>) -> Self {
        Self {
            templates: templates
                .into_iter()
                .map(|t| (t.name.clone(), t))
                .collect(),
        }
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> AppResult<&PromptTemplate> {
        self.templates.get(name).ok_or_else(|| {
            AppError::NotFound(format!(
                "Prompt '{}' not found. Available: {}",
                name,
                self.names().join(", ")
            ))
        })
    }

    /// Render the named template with the given variables.
    pub fn render(&self, name: &str, variables: &HashMap<String, String>) -> AppResult<String> {
        render_template(self.get(name)?, variables)
    }

    /// Generation parameters of the named template, with defaults applied.
    pub fn parameters(&self, name: &str) -> AppResult<GenerationParams> {
        Ok(self.get(name)?.parameters())
    }

    /// Template names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
    use tempfile::TempDir;

    fn store() -> PromptStore {
        PromptStore::from_templates(vec![
            PromptTemplate {
                name: "base".to_string(),
                system: "You answer questions about tax law.".to_string(),
                template: "{{context}}\n\nQ: {{question}}".to_string(),
                temperature: Some(0.3),
                max_tokens: Some(800),
            },
            PromptTemplate {
                name: "plain".to_string(),
                system: String::new(),
                template: "{{question}}".to_string(),
                temperature: None,
                max_tokens: None,
            },
        ])
    }

    #[test]
    fn test_get_unknown_name() {
        match store().get("detailed") {
            Err(AppError::NotFound(msg)) => {
                assert!(msg.contains("detailed"));
                assert!(msg.contains("base, plain"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_render_by_name() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "Article 5".to_string());
        vars.insert("question".to_string(), "Who pays?".to_string());

        let rendered = store().render("base", &vars).unwrap();
        assert_eq!(
            rendered,
            "You answer questions about tax law.\n\nArticle 5\n\nQ: Who pays?"
        );
    }

    #[test]
    fn test_render_reports_missing_variable() {
        let vars = HashMap::from([("context".to_string(), "c".to_string())]);
        match store().render("base", &vars) {
            Err(AppError::MissingVariable { name }) => assert_eq!(name, "question"),
            other => panic!("Expected MissingVariable, got {:?}", other),
        }
    }

    #[test]
    fn test_parameters() {
        let store = store();

        let base = store.parameters("base").unwrap();
        assert_eq!(base.temperature, 0.3);
        assert_eq!(base.max_tokens, 800);

        let plain = store.parameters("plain").unwrap();
        assert_eq!(plain.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(plain.max_tokens, DEFAULT_MAX_TOKENS);

        assert!(store.parameters("missing").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("base.yaml");
        std::fs::write(&path, "base:\n  system: s\n  template: \"{{question}}\"\n").unwrap();

        let store = PromptStore::load(&path).unwrap();
        assert_eq!(store.names(), vec!["base"]);
        assert_eq!(store.len(), 1);
    }
}
