//! Built-in fallback templates.
//!
//! Used only when the repository has no prompt for the requested name.

use crate::models::PromptType;

/// Canonical ideas template.
pub const DEFAULT_IDEAS_TEMPLATE: &str = "\
You are a content strategist helping a professional plan social media posts.

About the author:
{user_context}

Generate {ideas} distinct post ideas about {name}.
Related topics: {[related_topics]}

Each idea should be one or two sentences, specific, and written for the author's audience.
Return one idea per line without numbering.";

/// Canonical drafts template.
pub const DEFAULT_DRAFTS_TEMPLATE: &str = "\
You are a ghostwriter drafting a social media post for a professional.

About the author:
{user_context}

Write a complete post based on this idea:
{content}

Keep the author's voice, open with a strong hook, and end with a question that invites discussion.
Return only the post text.";

/// Fallback templates keyed by category.
///
/// A catalog with an entry removed makes resolution of that category fail
/// with `PromptNotFound` when the repository has no match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCatalog {
    ideas: Option<String>,
    drafts: Option<String>,
}

impl DefaultCatalog {
    /// Returns the catalog with the built-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            ideas: Some(DEFAULT_IDEAS_TEMPLATE.to_string()),
            drafts: Some(DEFAULT_DRAFTS_TEMPLATE.to_string()),
        }
    }

    /// Returns a catalog with no fallbacks.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            ideas: None,
            drafts: None,
        }
    }

    /// Replaces the template for a category.
    #[must_use]
    pub fn with_template(mut self, prompt_type: PromptType, template: impl Into<String>) -> Self {
        *self.slot_mut(prompt_type) = Some(template.into());
        self
    }

    /// Removes the template for a category.
    #[must_use]
    pub fn without(mut self, prompt_type: PromptType) -> Self {
        *self.slot_mut(prompt_type) = None;
        self
    }

    /// Returns the fallback template for a category, if any.
    #[must_use]
    pub fn template(&self, prompt_type: PromptType) -> Option<&str> {
        match prompt_type {
            PromptType::Ideas => self.ideas.as_deref(),
            PromptType::Drafts => self.drafts.as_deref(),
        }
    }

    const fn slot_mut(&mut self, prompt_type: PromptType) -> &mut Option<String> {
        match prompt_type {
            PromptType::Ideas => &mut self.ideas,
            PromptType::Drafts => &mut self.drafts,
        }
    }
}

impl Default for DefaultCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
