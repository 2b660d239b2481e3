//! Data models for postforge.
//!
//! This module contains the core data structures used throughout the system.

mod activity;
mod context;
pub mod placeholder;
mod prompt;

pub use activity::{ActivityAction, ActivityLogEntry};
pub use context::{IdeaContext, NO_CONTEXT_MARKER, TopicContext, UserConfiguration, UserProfile};
pub use placeholder::{
    CONTENT_TOKEN, IDEAS_TOKEN, NAME_TOKEN, PlaceholderDefinition, PlaceholderSpan,
    RELATED_TOPICS_TOKEN, SUPPORTED_PLACEHOLDERS, USER_CONTEXT_TOKEN, scan_placeholders,
};
pub use prompt::{MAX_PROMPT_NAME_LEN, PromptOrigin, PromptRecord, PromptType, SeedPromptFile};
