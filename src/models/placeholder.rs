//! Placeholder tokens and scanning.
//!
//! Templates use single-brace tokens such as `{name}`. The recognised set is
//! small and category-scoped:
//!
//! | Token | Category | Required | Source |
//! |-------|----------|----------|--------|
//! | `{name}` | ideas | yes | topic name |
//! | `{ideas}` | ideas | no | topic idea count, decimal |
//! | `{[related_topics]}` | ideas | no | comma-joined related topics |
//! | `{content}` | drafts | yes | idea content |
//! | `{user_context}` | both | no | derived user summary |
//!
//! Any other `{...}` span is left untouched by substitution.

use serde::Serialize;

use super::PromptType;

/// Topic name token.
pub const NAME_TOKEN: &str = "{name}";
/// Idea count token.
pub const IDEAS_TOKEN: &str = "{ideas}";
/// Related topics token.
pub const RELATED_TOPICS_TOKEN: &str = "{[related_topics]}";
/// Idea content token.
pub const CONTENT_TOKEN: &str = "{content}";
/// User context token.
pub const USER_CONTEXT_TOKEN: &str = "{user_context}";

/// Every recognised token, in canonical order.
pub const SUPPORTED_PLACEHOLDERS: [&str; 5] = [
    NAME_TOKEN,
    IDEAS_TOKEN,
    RELATED_TOPICS_TOKEN,
    CONTENT_TOKEN,
    USER_CONTEXT_TOKEN,
];

/// Contract for one recognised token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaceholderDefinition {
    /// The literal token, braces included.
    pub token: &'static str,
    /// Categories the token is substituted for.
    pub prompt_types: &'static [PromptType],
    /// Whether substitution fails when the source value is empty.
    pub required: bool,
    /// Where the value comes from.
    pub source: &'static str,
}

const DEFINITIONS: [PlaceholderDefinition; 5] = [
    PlaceholderDefinition {
        token: NAME_TOKEN,
        prompt_types: &[PromptType::Ideas],
        required: true,
        source: "topic name",
    },
    PlaceholderDefinition {
        token: IDEAS_TOKEN,
        prompt_types: &[PromptType::Ideas],
        required: false,
        source: "topic idea count",
    },
    PlaceholderDefinition {
        token: RELATED_TOPICS_TOKEN,
        prompt_types: &[PromptType::Ideas],
        required: false,
        source: "related topics",
    },
    PlaceholderDefinition {
        token: CONTENT_TOKEN,
        prompt_types: &[PromptType::Drafts],
        required: true,
        source: "idea content",
    },
    PlaceholderDefinition {
        token: USER_CONTEXT_TOKEN,
        prompt_types: &[PromptType::Ideas, PromptType::Drafts],
        required: false,
        source: "user context",
    },
];

impl PlaceholderDefinition {
    /// Returns every token definition.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &DEFINITIONS
    }

    /// Looks up a token definition.
    #[must_use]
    pub fn find(token: &str) -> Option<&'static Self> {
        DEFINITIONS.iter().find(|d| d.token == token)
    }

    /// Returns the tokens substituted for a category.
    pub fn for_type(prompt_type: PromptType) -> impl Iterator<Item = &'static Self> {
        DEFINITIONS
            .iter()
            .filter(move |d| d.prompt_types.contains(&prompt_type))
    }

    /// Returns `true` if this token applies to the category.
    #[must_use]
    pub fn applies_to(&self, prompt_type: PromptType) -> bool {
        self.prompt_types.contains(&prompt_type)
    }
}

/// A `{...}` span found in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderSpan {
    /// Byte offset of the opening brace.
    pub start: usize,
    /// Byte offset one past the closing brace.
    pub end: usize,
}

impl PlaceholderSpan {
    /// Returns the token text (braces included).
    #[must_use]
    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// Returns `true` if the span is one of [`SUPPORTED_PLACEHOLDERS`].
    #[must_use]
    pub fn is_recognized(&self, text: &str) -> bool {
        SUPPORTED_PLACEHOLDERS.contains(&self.as_str(text))
    }
}

/// Scans `text` for `{...}` spans in a single pass.
///
/// A `{` seen while a span is open restarts the span, so `{a {b}` yields
/// `{b}`. An unmatched `{` stops the scan and the spans found so far are
/// returned.
#[must_use]
pub fn scan_placeholders(text: &str) -> Vec<PlaceholderSpan> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (idx, byte) in text.bytes().enumerate() {
        match byte {
            b'{' => open = Some(idx),
            b'}' => {
                if let Some(start) = open.take() {
                    spans.push(PlaceholderSpan {
                        start,
                        end: idx + 1,
                    });
                }
            },
            _ => {},
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<&str> {
        scan_placeholders(text)
            .iter()
            .map(|span| span.as_str(text))
            .collect()
    }

    #[test]
    fn test_scan_finds_tokens_in_order() {
        let text = "Generate {ideas} ideas about {name}: {[related_topics]}";
        assert_eq!(tokens(text), vec!["{ideas}", "{name}", "{[related_topics]}"]);
    }

    #[test]
    fn test_scan_unmatched_open_stops() {
        let text = "{name} then {broken and {never";
        assert_eq!(tokens(text), vec!["{name}"]);
    }

    #[test]
    fn test_scan_nested_open_restarts() {
        assert_eq!(tokens("{a {b}"), vec!["{b}"]);
    }

    #[test]
    fn test_scan_stray_close_is_ignored() {
        assert_eq!(tokens("} {content} }"), vec!["{content}"]);
    }

    #[test]
    fn test_scan_multibyte_text() {
        let text = "Écris sur {name} → ✓ {content}";
        assert_eq!(tokens(text), vec!["{name}", "{content}"]);
    }

    #[test]
    fn test_recognized() {
        let text = "{name} {unknown}";
        let spans = scan_placeholders(text);
        assert!(spans[0].is_recognized(text));
        assert!(!spans[1].is_recognized(text));
    }

    #[test]
    fn test_definitions_for_type() {
        let ideas: Vec<_> = PlaceholderDefinition::for_type(PromptType::Ideas)
            .map(|d| d.token)
            .collect();
        assert_eq!(
            ideas,
            vec![NAME_TOKEN, IDEAS_TOKEN, RELATED_TOPICS_TOKEN, USER_CONTEXT_TOKEN]
        );

        let required: Vec<_> = PlaceholderDefinition::all()
            .iter()
            .filter(|d| d.required)
            .map(|d| d.token)
            .collect();
        assert_eq!(required, vec![NAME_TOKEN, CONTENT_TOKEN]);
    }

    #[test]
    fn test_find_definition() {
        assert!(PlaceholderDefinition::find(USER_CONTEXT_TOKEN).is_some_and(|d| {
            d.applies_to(PromptType::Ideas) && d.applies_to(PromptType::Drafts)
        }));
        assert!(PlaceholderDefinition::find("{other}").is_none());
    }
}
