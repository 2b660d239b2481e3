//! Template substitution.
//!
//! Single pass over the `{...}` spans of the template. Each recognised token
//! is replaced when its source is available:
//!
//! - `{user_context}`, when a user is given
//! - ideas tokens, when the category is ideas and a topic is given
//! - `{content}`, when the category is drafts and an idea is given
//!
//! Inserted values are copied verbatim and never rescanned, so a topic name
//! or profile field containing token text comes out unchanged. Unknown
//! `{...}` spans are left as they are. No escaping is performed.

use crate::models::{
    CONTENT_TOKEN, IDEAS_TOKEN, IdeaContext, NAME_TOKEN, PromptType, RELATED_TOPICS_TOKEN,
    TopicContext, USER_CONTEXT_TOKEN, UserProfile, scan_placeholders,
};
use crate::{Error, Result};

/// Label paired with the related topics token, removed with it when the list is empty.
pub const RELATED_TOPICS_LABEL: &str = "Related topics: ";

/// Separator between related topics.
const RELATED_TOPICS_SEPARATOR: &str = ", ";

/// Substitutes the context values into a template.
///
/// # Errors
///
/// Returns [`Error::MissingVariable`] when the topic name (ideas) or idea
/// content (drafts) is empty. Both checks run before any output is built.
pub fn substitute(
    template: &str,
    prompt_type: PromptType,
    topic: Option<&TopicContext>,
    idea: Option<&IdeaContext>,
    user: Option<&UserProfile>,
) -> Result<String> {
    let topic = topic.filter(|_| prompt_type == PromptType::Ideas);
    let idea = idea.filter(|_| prompt_type == PromptType::Drafts);

    if topic.is_some_and(|t| t.name.is_empty()) {
        return Err(Error::MissingVariable("name".to_string()));
    }
    if idea.is_some_and(|i| i.content.is_empty()) {
        return Err(Error::MissingVariable("content".to_string()));
    }

    let user_context = user.map(UserProfile::context_summary);
    let mut result = String::with_capacity(template.len());
    let mut cursor = 0;

    for span in scan_placeholders(template) {
        let literal = &template[cursor..span.start];
        let token = span.as_str(template);
        result.push_str(literal);
        cursor = span.end;

        let value = match token {
            USER_CONTEXT_TOKEN => user_context.clone(),
            NAME_TOKEN => topic.map(|t| t.name.clone()),
            IDEAS_TOKEN => topic.map(|t| t.idea_count.to_string()),
            RELATED_TOPICS_TOKEN => topic.map(|t| {
                if t.related_topics.is_empty() {
                    elide_related_label(&mut result, literal);
                }
                t.related_topics.join(RELATED_TOPICS_SEPARATOR)
            }),
            CONTENT_TOKEN => idea.map(|i| i.content.clone()),
            _ => None,
        };
        result.push_str(value.as_deref().unwrap_or(token));
    }

    result.push_str(&template[cursor..]);
    Ok(result)
}

/// Drops a `Related topics: ` label (and its leading newline) that ends the
/// literal text just written.
fn elide_related_label(result: &mut String, literal: &str) {
    if let Some(rest) = literal.strip_suffix(RELATED_TOPICS_LABEL) {
        let rest = rest.strip_suffix('\n').unwrap_or(rest);
        result.truncate(result.len() - (literal.len() - rest.len()));
    }
}

/// Returns the `{...}` spans still present in `text`, in order.
#[must_use]
pub fn unresolved_placeholders(text: &str) -> Vec<&str> {
    scan_placeholders(text)
        .iter()
        .map(|span| span.as_str(text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserConfiguration;
    use test_case::test_case;

    const SCENARIO: &str = "Generate {ideas} ideas about {name}: {[related_topics]}";

    fn go(related: &[&str]) -> TopicContext {
        TopicContext::new("Go", 3).with_related_topics(related.iter().copied())
    }

    #[test]
    fn test_related_topics_joined() {
        let out = substitute(SCENARIO, PromptType::Ideas, Some(&go(&["A", "B"])), None, None).unwrap();
        assert_eq!(out, "Generate 3 ideas about Go: A, B");
    }

    #[test]
    fn test_empty_related_topics_removes_token_only() {
        let out = substitute(SCENARIO, PromptType::Ideas, Some(&go(&[])), None, None).unwrap();
        assert_eq!(out, "Generate 3 ideas about Go: ");
    }

    #[test_case("About {name}.\nRelated topics: {[related_topics]}\nBe brief.", "About Go.\nBe brief." ; "own line")]
    #[test_case("About {name}. Related topics: {[related_topics]}", "About Go. " ; "inline")]
    fn test_empty_related_topics_elides_label(template: &str, expected: &str) {
        let out = substitute(template, PromptType::Ideas, Some(&go(&[])), None, None).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_all_tokens_replaced() {
        let template = "{user_context}|{name}|{ideas}|{[related_topics]}|{content}";
        let user = UserProfile::new("u1", "ana@example.com");
        let out = substitute(
            template,
            PromptType::Ideas,
            Some(&TopicContext::new("Rust", 7).with_related_topics(["Cargo"])),
            None,
            Some(&user),
        )
        .unwrap();

        assert_eq!(out, "Email: ana@example.com|Rust|7|Cargo|{content}");
    }

    #[test]
    fn test_drafts_content() {
        let out = substitute(
            "Draft: {content} {name}",
            PromptType::Drafts,
            Some(&go(&[])),
            Some(&IdeaContext::new("Ship it")),
            None,
        )
        .unwrap();
        assert_eq!(out, "Draft: Ship it {name}");
    }

    #[test]
    fn test_missing_name() {
        let err = substitute("{name}", PromptType::Ideas, Some(&TopicContext::new("", 1)), None, None)
            .unwrap_err();
        assert!(err.to_string().contains("missing required variable: {name}"));
    }

    #[test]
    fn test_missing_content() {
        let err = substitute("{content}", PromptType::Drafts, None, Some(&IdeaContext::new("")), None)
            .unwrap_err();
        assert!(err.to_string().contains("missing required variable: {content}"));
    }

    #[test]
    fn test_no_user_leaves_user_context() {
        let out = substitute("{user_context} {name}", PromptType::Ideas, Some(&go(&[])), None, None)
            .unwrap();
        assert_eq!(out, "{user_context} Go");
    }

    #[test]
    fn test_structured_configuration_preferred() {
        let user = UserProfile::new("u1", "ana@example.com").with_configuration(UserConfiguration {
            expertise: Some("Rust".to_string()),
            ..UserConfiguration::default()
        });
        let out = substitute("{user_context}", PromptType::Drafts, None, None, Some(&user)).unwrap();
        assert_eq!(out, "Expertise: Rust");
    }

    #[test]
    fn test_unknown_tokens_untouched() {
        let out = substitute("{name} {tone} {", PromptType::Ideas, Some(&go(&[])), None, None).unwrap();
        assert_eq!(out, "Go {tone} {");
        assert_eq!(unresolved_placeholders(&out), vec!["{tone}"]);
    }

    #[test]
    fn test_inserted_values_are_not_rescanned() {
        let topic = TopicContext::new("Pricing {ideas} ways", 3).with_related_topics(["{name}"]);
        let out = substitute(
            "About {name} x{ideas}: {[related_topics]}",
            PromptType::Ideas,
            Some(&topic),
            None,
            None,
        )
        .unwrap();
        assert_eq!(out, "About Pricing {ideas} ways x3: {name}");
    }

    #[test]
    fn test_user_context_is_verbatim() {
        let mut user = UserProfile::new("u1", "");
        user.goals = Some("{content}".to_string());
        let out = substitute(
            "{user_context}: {content}",
            PromptType::Drafts,
            None,
            Some(&IdeaContext::new("x")),
            Some(&user),
        )
        .unwrap();
        assert_eq!(out, "Goals: {content}: x");

        user.goals = Some("teach {name} basics".to_string());
        let out = substitute("{user_context} / {name}", PromptType::Ideas, Some(&go(&[])), None, Some(&user))
            .unwrap();
        assert_eq!(out, "Goals: teach {name} basics / Go");
    }

    #[test]
    fn test_label_only_elided_when_it_precedes_token() {
        let out = substitute(
            "Related topics: none\n{[related_topics]}{name}",
            PromptType::Ideas,
            Some(&go(&[])),
            None,
            None,
        )
        .unwrap();
        assert_eq!(out, "Related topics: none\nGo");
    }
}
