//! Substitution contexts.
//!
//! Read-only views handed to the substitution engine: the topic for `ideas`
//! prompts, the idea for `drafts` prompts, and the user whose profile is
//! summarised into `{user_context}`.

use serde::{Deserialize, Serialize};

/// Literal emitted for `{user_context}` when nothing is known about the user.
pub const NO_CONTEXT_MARKER: &str = "No user context available";

/// Topic view used by `ideas` prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicContext {
    /// Topic name. Required for substitution.
    pub name: String,
    /// Number of ideas to generate.
    pub idea_count: u32,
    /// Related topics, in display order.
    #[serde(default)]
    pub related_topics: Vec<String>,
}

impl TopicContext {
    /// Creates a topic with no related topics.
    #[must_use]
    pub fn new(name: impl Into<String>, idea_count: u32) -> Self {
        Self {
            name: name.into(),
            idea_count,
            related_topics: Vec::new(),
        }
    }

    /// Sets the related topics.
    #[must_use]
    pub fn with_related_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_topics = topics.into_iter().map(Into::into).collect();
        self
    }
}

/// Idea view used by `drafts` prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaContext {
    /// Idea text. Required for substitution.
    pub content: String,
}

impl IdeaContext {
    /// Creates an idea context.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Structured user configuration.
///
/// Every field is optional; the configuration counts as present as soon as
/// one field holds a non-blank value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfiguration {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Areas of expertise.
    #[serde(default)]
    pub expertise: Option<String>,
    /// Preferred writing tone.
    #[serde(default)]
    pub tone_preference: Option<String>,
    /// Industry.
    #[serde(default)]
    pub industry: Option<String>,
    /// Job role.
    #[serde(default)]
    pub role: Option<String>,
    /// Professional experience.
    #[serde(default)]
    pub experience: Option<String>,
    /// Content goals.
    #[serde(default)]
    pub goals: Option<String>,
}

impl UserConfiguration {
    /// Labelled fields in display order.
    fn labelled_fields(&self) -> [(&'static str, Option<&str>); 7] {
        [
            ("Name", self.name.as_deref()),
            ("Expertise", self.expertise.as_deref()),
            ("Tone", self.tone_preference.as_deref()),
            ("Industry", self.industry.as_deref()),
            ("Role", self.role.as_deref()),
            ("Experience", self.experience.as_deref()),
            ("Goals", self.goals.as_deref()),
        ]
    }

    /// Returns `true` if no field holds a non-blank value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labelled_fields()
            .iter()
            .all(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
    }

    /// Renders the set fields as `Label: value` lines.
    #[must_use]
    pub fn summary(&self) -> String {
        join_labelled(&self.labelled_fields())
    }
}

/// The user a prompt is resolved for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    pub id: String,
    /// Account email.
    #[serde(default)]
    pub email: String,
    /// Legacy industry field.
    #[serde(default)]
    pub industry: Option<String>,
    /// Legacy role field.
    #[serde(default)]
    pub role: Option<String>,
    /// Legacy experience field.
    #[serde(default)]
    pub experience: Option<String>,
    /// Legacy goals field.
    #[serde(default)]
    pub goals: Option<String>,
    /// Structured configuration, preferred over the legacy fields.
    #[serde(default)]
    pub configuration: Option<UserConfiguration>,
}

impl UserProfile {
    /// Creates a user with only an id and email.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Sets the structured configuration.
    #[must_use]
    pub fn with_configuration(mut self, configuration: UserConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Sets the legacy industry field.
    #[must_use]
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Sets the legacy role field.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Builds the human-readable summary substituted for `{user_context}`.
    ///
    /// Precedence:
    /// 1. the structured configuration, if any of its fields is set
    /// 2. the legacy fields (email, industry, role, experience, goals)
    /// 3. [`NO_CONTEXT_MARKER`]
    #[must_use]
    pub fn context_summary(&self) -> String {
        if let Some(configuration) = self.configuration.as_ref().filter(|c| !c.is_empty()) {
            return configuration.summary();
        }

        let legacy = join_labelled(&[
            ("Email", Some(self.email.as_str())),
            ("Industry", self.industry.as_deref()),
            ("Role", self.role.as_deref()),
            ("Experience", self.experience.as_deref()),
            ("Goals", self.goals.as_deref()),
        ]);
        if legacy.is_empty() {
            NO_CONTEXT_MARKER.to_string()
        } else {
            legacy
        }
    }
}

/// Joins the non-blank fields as newline-separated `Label: value` lines.
fn join_labelled(fields: &[(&str, Option<&str>)]) -> String {
    fields
        .iter()
        .filter_map(|(label, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{label}: {v}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_configuration_wins() {
        let user = UserProfile::new("u1", "ana@example.com")
            .with_industry("Finance")
            .with_configuration(UserConfiguration {
                name: Some("Ana".to_string()),
                tone_preference: Some("friendly".to_string()),
                ..UserConfiguration::default()
            });

        assert_eq!(user.context_summary(), "Name: Ana\nTone: friendly");
    }

    #[test]
    fn test_blank_configuration_falls_back_to_legacy() {
        let user = UserProfile::new("u1", "ana@example.com")
            .with_role("CTO")
            .with_configuration(UserConfiguration {
                name: Some("   ".to_string()),
                ..UserConfiguration::default()
            });

        assert_eq!(user.context_summary(), "Email: ana@example.com\nRole: CTO");
    }

    #[test]
    fn test_email_only_context() {
        let user = UserProfile::new("u1", "ana@example.com");
        assert_eq!(user.context_summary(), "Email: ana@example.com");
    }

    #[test]
    fn test_no_context_marker() {
        let user = UserProfile::new("u1", "");
        assert_eq!(user.context_summary(), NO_CONTEXT_MARKER);
    }

    #[test]
    fn test_configuration_field_order() {
        let configuration = UserConfiguration {
            goals: Some("grow audience".to_string()),
            name: Some("Ana".to_string()),
            expertise: Some("Rust".to_string()),
            ..UserConfiguration::default()
        };
        assert_eq!(
            configuration.summary(),
            "Name: Ana\nExpertise: Rust\nGoals: grow audience"
        );
    }

    #[test]
    fn test_topic_builder() {
        let topic = TopicContext::new("Go", 3).with_related_topics(["A", "B"]);
        assert_eq!(topic.related_topics, vec!["A", "B"]);
        assert_eq!(topic.idea_count, 3);
    }
}
