//! Template rendering with strict variable checking.

use crate::types::PromptTemplate;
use handlebars::Handlebars;
use std::collections::HashMap;
use taxrag_core::{AppError, AppResult};

/// Render a template with the given variables.
///
/// The system instruction and body are concatenated, then every placeholder
/// is substituted. A placeholder without a bound variable is an error naming
/// the first such placeholder; nothing is ever rendered as a silent blank.
///
/// # Example
/// ```no_run
/// use taxrag_prompt::{render_template, PromptTemplate};
/// use std::collections::HashMap;
///
/// # fn example(template: &PromptTemplate) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("context".to_string(), "VAT is 18%.".to_string());
/// vars.insert("question".to_string(), "What is the VAT rate?".to_string());
///
/// let prompt = render_template(template, &vars)?;
/// println!("{}", prompt);
/// # Ok(())
/// # }
/// ```
pub fn render_template(
    template: &PromptTemplate,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    tracing::debug!("Rendering prompt template: {}", template.name);

    let source = template.full_text();

    if let Some(missing) = placeholders(&source)
        .into_iter()
        .find(|name| !variables.contains_key(name))
    {
        return Err(AppError::MissingVariable { name: missing });
    }

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string(&template.name, &source)
        .map_err(|e| AppError::Parse(format!("Invalid template '{}': {}", template.name, e)))?;

    handlebars
        .render(&template.name, variables)
        .map_err(|e| AppError::Validation(format!("Failed to render '{}': {}", template.name, e)))
}

/// Placeholder names in order of first appearance.
///
/// Only plain `{{name}}` / `{{{name}}}` expressions count; helpers and block
/// expressions (`{{#if ...}}`, `{{/if}}`, `{{! comment }}`) are ignored.
pub fn placeholders(source: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };

        let inner = after[..close].trim_start_matches('{').trim();
        if is_identifier(inner) && !names.iter().any(|n| n == inner) {
            names.push(inner.to_string());
        }

        rest = after[close + 2..].trim_start_matches('}');
    }

    names
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Check that a template compiles, without rendering it.
pub(crate) fn check_syntax(template: &PromptTemplate) -> AppResult<()> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string(&template.name, template.full_text())
        .map_err(|e| AppError::Parse(format!("Invalid template '{}': {}", template.name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_template(system: &str, body: &str) -> PromptTemplate {
        PromptTemplate {
            name: "test".to_string(),
            system: system.to_string(),
            template: body.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_verbatim() {
        let template = create_test_template(
            "You are a tax assistant.",
            "Context:\n{{context}}\n\nQuestion: {{question}}",
        );
        let rendered = render_template(
            &template,
            &vars(&[
                ("context", "Rate is 18% <standard> & \"reduced\""),
                ("question", "What is the standard rate?"),
            ]),
        )
        .unwrap();

        assert!(rendered.starts_with("You are a tax assistant.\n\nContext:\n"));
        assert!(rendered.contains("Rate is 18% <standard> & \"reduced\""));
        assert!(rendered.ends_with("Question: What is the standard rate?"));
    }

    #[test]
    fn test_render_missing_variable_names_first() {
        let template = create_test_template("{{persona}}", "{{context}} {{question}}");
        let err = render_template(&template, &vars(&[("question", "q")])).unwrap_err();

        match err {
            AppError::MissingVariable { name } => assert_eq!(name, "persona"),
            other => panic!("Expected MissingVariable, got {:?}", other),
        }
    }

    #[test]
    fn test_render_empty_value_is_allowed() {
        let template = create_test_template("", "[{{context}}]");
        let rendered = render_template(&template, &vars(&[("context", "")])).unwrap();
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn test_extra_variables_are_ignored() {
        let template = create_test_template("", "{{question}}");
        let rendered =
            render_template(&template, &vars(&[("question", "q"), ("unused", "x")])).unwrap();
        assert_eq!(rendered, "q");
    }

    #[test]
    fn test_placeholders_order_and_dedup() {
        let names = placeholders("{{b}} {{ a }} {{b}} {{{c}}} {{#if a}}x{{/if}} {{! note }}");
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_check_syntax_rejects_unclosed_block() {
        let template = create_test_template("", "{{#if context}}open");
        assert!(matches!(check_syntax(&template), Err(AppError::Parse(_))));
    }
}
