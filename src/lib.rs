//! # Postforge
//!
//! Prompt resolution and templating engine for a LinkedIn post-writing
//! assistant.
//!
//! Users define topics, the assistant generates ideas from topics, and ideas
//! are expanded into drafts. Every generation step starts from a prompt
//! template. This crate owns that step:
//!
//! - Loading prompt seed files (markdown with front matter) from a directory
//! - Synchronising seeds into a per-user prompt repository
//! - Resolving a user's custom prompt or falling back to a built-in default
//! - Substituting topic, idea and user context into the template
//! - Caching resolved prompts under a content fingerprint
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use postforge::models::{PromptType, TopicContext, UserProfile};
//! use postforge::services::{PromptResolver, ResolveRequest};
//! use postforge::storage::MemoryPromptRepository;
//!
//! let resolver = PromptResolver::new(Arc::new(MemoryPromptRepository::new()));
//! let user = UserProfile::new("user-1", "ana@example.com");
//! let topic = TopicContext::new("Rust", 3);
//!
//! let request = ResolveRequest::ideas("user-1", "weekly-ideas", &topic).with_user(&user);
//! let prompt = resolver.resolve(&request)?;
//! assert!(prompt.contains("Rust"));
//! # Ok::<(), postforge::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::PostforgeConfig;
pub use models::{
    IdeaContext, PromptOrigin, PromptRecord, PromptType, SeedPromptFile, TopicContext,
    UserConfiguration, UserProfile,
};
pub use services::{PromptResolver, ResolveRequest, SeedLoader, SeedSynchronizer};
pub use storage::{MemoryPromptRepository, PromptRepository, SqlitePromptRepository};

/// Error type for postforge operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Missing user/topic/idea for a resolve call, invalid prompt record |
/// | `MissingVariable` | A required placeholder source is empty during substitution |
/// | `PromptNotFound` | Neither the repository nor the default catalog has a template |
/// | `NotFound` | Updating a prompt record that does not exist |
/// | `Conflict` | Creating a second prompt with the same owner and name |
/// | `Cancelled` | The caller cancelled the repository call |
/// | `OperationFailed` | Repository, filesystem or observability failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - `Resolve` is called without a user
    /// - An ideas prompt is resolved without a topic
    /// - A drafts prompt is resolved without an idea
    /// - A prompt record fails validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required template variable had no value.
    ///
    /// The payload is the bare variable name; the message renders it with
    /// braces, e.g. `missing required variable: {name}`.
    #[error("missing required variable: {{{0}}}")]
    MissingVariable(String),

    /// No template exists for the requested prompt.
    #[error("no prompt found for name '{name}' and type '{prompt_type}'")]
    PromptNotFound {
        /// The requested prompt name.
        name: String,
        /// The requested prompt category.
        prompt_type: String,
    },

    /// A record addressed by id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A record with the same identity already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The operation was cancelled by the caller.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` operations fail
    /// - The seed directory cannot be read
    /// - Observability cannot be initialised
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Wraps any displayable cause as an [`Error::OperationFailed`].
    pub fn operation(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }

    /// Short machine-friendly label used for metrics and activity logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::MissingVariable(_) => "missing_variable",
            Self::PromptNotFound { .. } => "prompt_not_found",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Cancelled(_) => "cancelled",
            Self::OperationFailed { .. } => "operation_failed",
        }
    }
}

/// Result type alias for postforge operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("user is required".to_string());
        assert_eq!(err.to_string(), "invalid input: user is required");

        let err = Error::MissingVariable("name".to_string());
        assert_eq!(err.to_string(), "missing required variable: {name}");

        let err = Error::PromptNotFound {
            name: "x".to_string(),
            prompt_type: "ideas".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no prompt found for name 'x' and type 'ideas'"
        );

        let err = Error::operation("find_prompt_by_name", "disk full");
        assert_eq!(
            err.to_string(),
            "operation 'find_prompt_by_name' failed: disk full"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::Cancelled("deadline".into()).kind(), "cancelled");
        assert_eq!(
            Error::MissingVariable("content".into()).kind(),
            "missing_variable"
        );
    }
}
