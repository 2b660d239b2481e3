//! Prompt record models.
//!
//! A [`PromptRecord`] is one named template owned by a single user. Records
//! are created from seed files or by explicit user action, and are
//! deactivated rather than destroyed when their seed disappears.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Maximum length of a prompt name, in characters.
pub const MAX_PROMPT_NAME_LEN: usize = 100;

/// Prompt category.
///
/// Each category has its own variable contract (see
/// [`crate::models::placeholder`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptType {
    /// Generates ideas from a topic.
    #[default]
    Ideas,
    /// Expands an idea into a post draft.
    Drafts,
}

impl PromptType {
    /// Returns all categories.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Ideas, Self::Drafts]
    }

    /// Returns the category as its wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ideas => "ideas",
            Self::Drafts => "drafts",
        }
    }

    /// Parses a category string.
    ///
    /// Matching is exact after trimming; seed files and the repository store
    /// the lowercase form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "ideas" => Some(Self::Ideas),
            "drafts" => Some(Self::Drafts),
            _ => None,
        }
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a prompt record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptOrigin {
    /// Synchronised from a seed file. May be deactivated when the seed goes away.
    Seed,
    /// Authored by the user. Never deactivated automatically.
    #[default]
    Custom,
}

impl PromptOrigin {
    /// Returns the origin as its storage string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Custom => "custom",
        }
    }

    /// Parses an origin string, defaulting to `Custom`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("seed") {
            Self::Seed
        } else {
            Self::Custom
        }
    }
}

/// A named prompt template owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    /// Opaque identifier.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Prompt category.
    pub prompt_type: PromptType,
    /// Prompt name, unique per owner.
    pub name: String,
    /// Template text containing `{variable}` placeholders.
    pub content: String,
    /// Whether the record is active. Inactive records are still found by name.
    pub active: bool,
    /// Seed-derived or user-authored.
    pub origin: PromptOrigin,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl PromptRecord {
    /// Creates a new active, user-authored record.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        prompt_type: PromptType,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            user_id: user_id.into(),
            prompt_type,
            name: name.into(),
            content: content.into(),
            active: true,
            origin: PromptOrigin::Custom,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new active record from a parsed seed file.
    #[must_use]
    pub fn from_seed(user_id: impl Into<String>, seed: &SeedPromptFile) -> Self {
        Self::new(user_id, &seed.name, seed.prompt_type, &seed.content)
            .with_origin(PromptOrigin::Seed)
    }

    /// Sets the origin.
    #[must_use]
    pub const fn with_origin(mut self, origin: PromptOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Marks the record as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validates the record invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the name is empty or too long, or if
    /// the template body is empty.
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("prompt name is required".to_string()));
        }
        if name.chars().count() > MAX_PROMPT_NAME_LEN {
            return Err(Error::InvalidInput(format!(
                "prompt name must be at most {MAX_PROMPT_NAME_LEN} characters"
            )));
        }
        if self.content.trim().is_empty() {
            return Err(Error::InvalidInput(
                "prompt template is required".to_string(),
            ));
        }
        if self.prompt_type == PromptType::Drafts && name.is_empty() {
            return Err(Error::InvalidInput(
                "drafts prompts require a name".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse result of one seed file. Exists only between load and sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedPromptFile {
    /// Prompt name from the front matter, trimmed.
    pub name: String,
    /// Prompt category from the front matter.
    pub prompt_type: PromptType,
    /// Template body, trimmed.
    pub content: String,
}

impl SeedPromptFile {
    /// Creates a seed prompt.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        prompt_type: PromptType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prompt_type,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("ideas", Some(PromptType::Ideas); "ideas")]
    #[test_case("drafts", Some(PromptType::Drafts); "drafts")]
    #[test_case("  drafts ", Some(PromptType::Drafts); "trimmed")]
    #[test_case("Ideas", None; "case sensitive")]
    #[test_case("posts", None; "unknown")]
    #[test_case("", None; "empty")]
    fn test_prompt_type_parse(input: &str, expected: Option<PromptType>) {
        assert_eq!(PromptType::parse(input), expected);
    }

    #[test]
    fn test_prompt_type_roundtrips_through_str() {
        for prompt_type in PromptType::all() {
            assert_eq!(PromptType::parse(prompt_type.as_str()), Some(*prompt_type));
        }
    }

    #[test]
    fn test_prompt_type_serde_lowercase() {
        let json = serde_json::to_string(&PromptType::Drafts).unwrap();
        assert_eq!(json, "\"drafts\"");
    }

    #[test]
    fn test_new_record_defaults() {
        let record = PromptRecord::new("u1", "weekly", PromptType::Ideas, "About {name}");
        assert!(record.active);
        assert_eq!(record.origin, PromptOrigin::Custom);
        assert!(!record.id.is_empty());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_from_seed_marks_origin() {
        let seed = SeedPromptFile::new("post", PromptType::Drafts, "Write {content}");
        let record = PromptRecord::from_seed("u1", &seed);
        assert_eq!(record.origin, PromptOrigin::Seed);
        assert_eq!(record.name, "post");
        assert_eq!(record.prompt_type, PromptType::Drafts);
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let record = PromptRecord::new("u1", "   ", PromptType::Drafts, "Write {content}");
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn test_validate_rejects_long_name() {
        let name = "x".repeat(MAX_PROMPT_NAME_LEN + 1);
        let record = PromptRecord::new("u1", name, PromptType::Ideas, "About {name}");
        assert!(record.validate().is_err());

        let name = "x".repeat(MAX_PROMPT_NAME_LEN);
        let record = PromptRecord::new("u1", name, PromptType::Ideas, "About {name}");
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_template() {
        let record = PromptRecord::new("u1", "weekly", PromptType::Ideas, "\n  \n");
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("template is required"));
    }

    #[test]
    fn test_origin_parse_defaults_to_custom() {
        assert_eq!(PromptOrigin::parse("seed"), PromptOrigin::Seed);
        assert_eq!(PromptOrigin::parse("custom"), PromptOrigin::Custom);
        assert_eq!(PromptOrigin::parse("???"), PromptOrigin::Custom);
    }
}
