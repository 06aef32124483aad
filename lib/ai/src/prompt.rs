//! Prompt templates for response generation.
//!
//! Templates use `{{variable}}` placeholders. Two built-in templates cover
//! the common cases: answering from retrieved context, and answering the
//! question alone. A node's custom prompt either supplies its own
//! placeholders or replaces the built-in instruction line.

use crate::error::PromptError;
use std::collections::HashMap;

/// Template used when context was retrieved.
pub const CONTEXT_TEMPLATE: &str = "Based on the following context, answer the user's question.\n\n\
Context: {{context}}\n\nQuestion: {{query}}\n\nAnswer:";

/// Template used without context.
pub const QUESTION_TEMPLATE: &str =
    "Answer the following question:\n\nQuestion: {{query}}\n\nAnswer:";

/// A prompt with `{{variable}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    content: String,
}

impl PromptTemplate {
    /// Creates a template.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Returns the placeholder names in order of first appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.content.as_str();
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                break;
            };
            let name = after[..end].trim();
            if !names.contains(&name) {
                names.push(name);
            }
            rest = &after[end + 2..];
        }
        names
    }

    /// Renders the template.
    ///
    /// Substituted values are inserted verbatim and never re-scanned.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::MissingVariable`] for a placeholder with no value.
    pub fn render(&self, variables: &HashMap<&str, &str>) -> Result<String, PromptError> {
        let mut rendered = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                break;
            };
            let name = after[..end].trim();
            let value = variables
                .get(name)
                .ok_or_else(|| PromptError::MissingVariable {
                    variable: name.to_string(),
                })?;
            rendered.push_str(&rest[..start]);
            rendered.push_str(value);
            rest = &after[end + 2..];
        }

        rendered.push_str(rest);
        Ok(rendered)
    }
}

/// Builds the prompt for one generation.
///
/// Without a custom prompt the built-in templates apply. A custom prompt
/// that mentions `{{query}}` or `{{context}}` is rendered as a template
/// (`{{context}}` is empty when nothing was retrieved); any other custom
/// prompt takes the place of the instruction line.
///
/// # Errors
///
/// Returns an error if a custom prompt uses a placeholder other than
/// `query` and `context`.
pub fn build_prompt(
    query: &str,
    context: Option<&str>,
    custom_prompt: Option<&str>,
) -> Result<String, PromptError> {
    let mut variables = HashMap::from([("query", query), ("context", context.unwrap_or(""))]);

    let template = match custom_prompt {
        None => PromptTemplate::new(if context.is_some() {
            CONTEXT_TEMPLATE
        } else {
            QUESTION_TEMPLATE
        }),
        Some(custom) => {
            let template = PromptTemplate::new(custom);
            if template.placeholders().is_empty() {
                variables.insert("instruction", custom);
                PromptTemplate::new(if context.is_some() {
                    "{{instruction}}\n\nContext: {{context}}\n\nQuestion: {{query}}\n\nAnswer:"
                } else {
                    "{{instruction}}\n\nQuestion: {{query}}\n\nAnswer:"
                })
            } else {
                template
            }
        }
    };

    template.render(&variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_rendering() {
        let template = PromptTemplate::new("Summarise {{ topic }} for {{audience}}.");
        let vars = HashMap::from([("topic", "Rust"), ("audience", "beginners")]);

        assert_eq!(template.placeholders(), vec!["topic", "audience"]);
        assert_eq!(
            template.render(&vars).expect("render"),
            "Summarise Rust for beginners."
        );
    }

    #[test]
    fn values_are_not_rescanned() {
        let template = PromptTemplate::new("Q: {{query}}");
        let vars = HashMap::from([("query", "what does {{context}} mean?")]);

        assert_eq!(
            template.render(&vars).expect("render"),
            "Q: what does {{context}} mean?"
        );
    }

    #[test]
    fn missing_variable_is_an_error() {
        let template = PromptTemplate::new("Hello {{name}}");
        let err = template.render(&HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            PromptError::MissingVariable {
                variable: "name".to_string()
            }
        );
    }

    #[test]
    fn context_prompt() {
        let prompt = build_prompt("What is RAG?", Some("RAG means retrieval."), None)
            .expect("build");
        assert_eq!(
            prompt,
            "Based on the following context, answer the user's question.\n\n\
             Context: RAG means retrieval.\n\nQuestion: What is RAG?\n\nAnswer:"
        );
    }

    #[test]
    fn question_only_prompt() {
        let prompt = build_prompt("What is RAG?", None, None).expect("build");
        assert_eq!(
            prompt,
            "Answer the following question:\n\nQuestion: What is RAG?\n\nAnswer:"
        );
    }

    #[test]
    fn custom_instruction_replaces_default() {
        let prompt = build_prompt("Hi", None, Some("Reply like a pirate.")).expect("build");
        assert_eq!(prompt, "Reply like a pirate.\n\nQuestion: Hi\n\nAnswer:");

        let prompt = build_prompt("Hi", Some("ctx"), Some("Be brief.")).expect("build");
        assert_eq!(
            prompt,
            "Be brief.\n\nContext: ctx\n\nQuestion: Hi\n\nAnswer:"
        );
    }

    #[test]
    fn custom_template_is_rendered() {
        let prompt = build_prompt(
            "Hi",
            Some("ctx"),
            Some("Using {{context}}, answer: {{query}}"),
        )
        .expect("build");
        assert_eq!(prompt, "Using ctx, answer: Hi");
    }

    #[test]
    fn custom_template_with_unknown_placeholder_fails() {
        let err = build_prompt("Hi", None, Some("Dear {{name}}")).unwrap_err();
        assert!(err.to_string().contains("name"));
    }
}
