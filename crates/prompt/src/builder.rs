//! Prompt builder for rendering templates and injecting source context.

use crate::context::{build_context, MAX_EXCERPT_CHARS};
use crate::templates::{SYSTEM_TEMPLATE, USER_TEMPLATE};
use crate::types::{BuiltPrompt, BuiltPromptMetadata};
use handlebars::Handlebars;
use sourced_core::{AppError, AppResult, SourceRecord};
use std::collections::HashMap;

/// Build the grounded prompt for a question.
///
/// This function:
/// 1. Builds the numbered context block from `sources`
/// 2. Renders the system and user templates with Handlebars
/// 3. Returns a `BuiltPrompt` ready for LLM execution
///
/// # Example
/// ```
/// use sourced_core::SourceRecord;
/// use sourced_prompt::build_prompt;
///
/// let sources = vec![SourceRecord::new("Rust", "A language", "https://rust-lang.org")];
/// let built = build_prompt("What is Rust?", &sources).unwrap();
/// assert!(built.user.contains("[1] Rust"));
/// ```
pub fn build_prompt(question: &str, sources: &[SourceRecord]) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building grounded prompt with {} sources", sources.len());

    let context = build_context(sources);
    let truncated_sources = sources
        .iter()
        .filter(|s| s.evidence().chars().count() > MAX_EXCERPT_CHARS)
        .count();

    let mut variables = HashMap::new();
    variables.insert("question".to_string(), question.to_string());
    variables.insert("context".to_string(), context.clone());

    let handlebars = registry()?;
    let system = handlebars
        .render("system", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render system template: {}", e)))?;
    let user = handlebars
        .render("user", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render user template: {}", e)))?;

    if truncated_sources > 0 {
        tracing::debug!("Truncated {} source excerpts", truncated_sources);
    }

    Ok(BuiltPrompt {
        system,
        user,
        metadata: BuiltPromptMetadata {
            source_count: sources.len(),
            context_chars: context.chars().count(),
            truncated_sources,
        },
    })
}

fn registry() -> AppResult<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("system", SYSTEM_TEMPLATE)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;
    handlebars
        .register_template_string("user", USER_TEMPLATE)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    Ok(handlebars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> Vec<SourceRecord> {
        vec![
            SourceRecord::new("CloudWalk", "Fintech", "https://www.cloudwalk.io/")
                .with_content("CloudWalk builds payment solutions.".to_string()),
            SourceRecord::new("InfinitePay", "Payments app", "https://www.infinitepay.io/"),
        ]
    }

    #[test]
    fn test_system_fixes_constraints() {
        let built = build_prompt("what is cloudwalk?", &sources()).unwrap();
        assert!(built.system.contains("ONLY"));
        assert!(built.system.contains("2 or 3 lines"));
        assert!(built.system.contains("[n] URL"));
    }

    #[test]
    fn test_user_embeds_question_and_context() {
        let built = build_prompt("what is cloudwalk?", &sources()).unwrap();

        assert!(built.user.starts_with("Question:\nwhat is cloudwalk?\n"));
        assert!(built.user.contains("[1] CloudWalk\nURL: https://www.cloudwalk.io/"));
        assert!(built.user.contains("Excerpt: CloudWalk builds payment solutions."));
        assert!(built.user.contains("[2] InfinitePay\nURL: https://www.infinitepay.io/\nExcerpt: Payments app"));
        assert!(built.user.contains("could not find reliable info"));
        assert!(built.user.contains("under ~100 words"));
        assert_eq!(built.metadata.source_count, 2);
    }

    #[test]
    fn test_no_html_escaping() {
        let built = build_prompt("is 1 < 2 & \"yes\"?", &[]).unwrap();
        assert!(built.user.contains("is 1 < 2 & \"yes\"?"));
    }

    #[test]
    fn test_counts_truncated_sources() {
        let long = SourceRecord::new("Long", "", "https://long.example")
            .with_content("z".repeat(MAX_EXCERPT_CHARS + 1));
        let built = build_prompt("q", &[long]).unwrap();
        assert_eq!(built.metadata.truncated_sources, 1);
        assert!(!built.user.contains(&"z".repeat(MAX_EXCERPT_CHARS + 1)));
    }
}
