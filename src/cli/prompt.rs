//! Prompt CLI command.

use std::io::Write;

use super::emit;
use crate::Result;
use crate::models::{IdeaContext, PromptType, TopicContext, UserConfiguration, UserProfile};
use crate::services::{PromptResolver, ResolveRequest};
use crate::storage::PromptRepository;

/// Arguments for `prompt resolve`.
#[derive(Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Owner of the prompt.
    pub user_id: String,
    /// Prompt name.
    pub name: String,
    /// Category.
    pub prompt_type: PromptType,
    /// Topic name, for ideas prompts.
    pub topic: Option<String>,
    /// Number of ideas requested.
    pub ideas: u32,
    /// Related topics.
    pub related: Vec<String>,
    /// Idea content, for drafts prompts.
    pub idea: Option<String>,
    /// User email.
    pub email: String,
    /// User industry.
    pub industry: Option<String>,
    /// User role.
    pub role: Option<String>,
    /// Structured configuration: expertise.
    pub expertise: Option<String>,
    /// Structured configuration: tone preference.
    pub tone: Option<String>,
}

impl ResolveArgs {
    fn user(&self) -> UserProfile {
        let mut user = UserProfile::new(&self.user_id, &self.email);
        user.industry.clone_from(&self.industry);
        user.role.clone_from(&self.role);
        let configuration = UserConfiguration {
            expertise: self.expertise.clone(),
            tone_preference: self.tone.clone(),
            ..UserConfiguration::default()
        };
        if configuration.is_empty() {
            user
        } else {
            user.with_configuration(configuration)
        }
    }
}

/// Prompt command handler.
pub struct PromptCommand;

impl PromptCommand {
    /// Lists a user's prompt records.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub fn list(
        repository: &dyn PromptRepository,
        user_id: &str,
        out: &mut impl Write,
    ) -> Result<usize> {
        let records = repository.list_by_user_id(user_id)?;
        if records.is_empty() {
            emit(out, format_args!("No prompts for user '{user_id}'"))?;
            return Ok(0);
        }

        for record in &records {
            emit(
                out,
                format_args!(
                    "{:<40} {:<7} {:<7} {}",
                    record.name,
                    record.prompt_type.as_str(),
                    record.origin.as_str(),
                    if record.active { "active" } else { "inactive" }
                ),
            )?;
        }
        Ok(records.len())
    }

    /// Resolves a prompt and writes the final text.
    ///
    /// # Errors
    ///
    /// Returns the resolution error.
    pub fn resolve(
        resolver: &PromptResolver,
        args: &ResolveArgs,
        out: &mut impl Write,
    ) -> Result<String> {
        let user = args.user();
        let topic = args
            .topic
            .as_ref()
            .map(|name| TopicContext::new(name, args.ideas).with_related_topics(args.related.iter()));
        let idea = args.idea.as_ref().map(IdeaContext::new);

        let mut request =
            ResolveRequest::new(&args.user_id, &args.name, args.prompt_type).with_user(&user);
        if let Some(topic) = &topic {
            request = request.with_topic(topic);
        }
        if let Some(idea) = &idea {
            request = request.with_idea(idea);
        }

        let text = resolver.resolve(&request)?;
        emit(out, &text)?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PromptRecord;
    use crate::storage::MemoryPromptRepository;
    use std::sync::Arc;

    fn repo() -> Arc<MemoryPromptRepository> {
        Arc::new(
            MemoryPromptRepository::with_records([PromptRecord::new(
                "u1",
                "weekly",
                PromptType::Ideas,
                "{ideas} about {name}: {[related_topics]}\n{user_context}",
            )])
            .unwrap(),
        )
    }

    #[test]
    fn test_list() {
        let mut out = Vec::new();
        assert_eq!(PromptCommand::list(repo().as_ref(), "u1", &mut out).unwrap(), 1);
        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with("weekly"));
        assert!(output.contains("custom"));

        let mut out = Vec::new();
        assert_eq!(PromptCommand::list(repo().as_ref(), "u2", &mut out).unwrap(), 0);
    }

    #[test]
    fn test_resolve_builds_context() {
        let resolver = PromptResolver::new(repo());
        let args = ResolveArgs {
            user_id: "u1".to_string(),
            name: "weekly".to_string(),
            prompt_type: PromptType::Ideas,
            topic: Some("Rust".to_string()),
            ideas: 2,
            related: vec!["Cargo".to_string(), "Tokio".to_string()],
            email: "ana@example.com".to_string(),
            tone: Some("direct".to_string()),
            ..ResolveArgs::default()
        };
        let mut out = Vec::new();

        let text = PromptCommand::resolve(&resolver, &args, &mut out).unwrap();

        assert_eq!(text, "2 about Rust: Cargo, Tokio\nTone: direct");
        assert_eq!(String::from_utf8(out).unwrap(), format!("{text}\n"));
    }

    #[test]
    fn test_resolve_without_topic_fails() {
        let resolver = PromptResolver::new(repo());
        let args = ResolveArgs {
            user_id: "u1".to_string(),
            name: "weekly".to_string(),
            prompt_type: PromptType::Ideas,
            ..ResolveArgs::default()
        };

        let err = PromptCommand::resolve(&resolver, &args, &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: topic is required for ideas prompts");
    }
}
