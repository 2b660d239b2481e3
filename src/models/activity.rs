//! Activity log entries recorded by the resolver.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::PromptType;

/// What happened during a resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// Served from the cache.
    CacheHit,
    /// Resolved, substituted and cached.
    ProcessComplete,
    /// Resolution failed.
    ProcessError,
}

impl ActivityAction {
    /// Returns the action as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CacheHit => "cache_hit",
            Self::ProcessComplete => "process_complete",
            Self::ProcessError => "process_error",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityLogEntry {
    /// Owner of the prompt.
    pub user_id: String,
    /// Requested prompt name.
    pub prompt_name: String,
    /// Requested category.
    pub prompt_type: PromptType,
    /// What happened.
    pub action: ActivityAction,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Error message for failed attempts.
    pub error_message: Option<String>,
    /// Processing time in milliseconds, for completed resolutions.
    pub duration_ms: Option<u64>,
}

impl ActivityLogEntry {
    /// Creates a successful entry stamped now.
    #[must_use]
    pub fn success(
        user_id: impl Into<String>,
        prompt_name: impl Into<String>,
        prompt_type: PromptType,
        action: ActivityAction,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            prompt_name: prompt_name.into(),
            prompt_type,
            action,
            timestamp: Utc::now(),
            success: true,
            error_message: None,
            duration_ms: None,
        }
    }

    /// Creates a failed entry stamped now.
    #[must_use]
    pub fn failure(
        user_id: impl Into<String>,
        prompt_name: impl Into<String>,
        prompt_type: PromptType,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error_message: Some(error_message.into()),
            ..Self::success(
                user_id,
                prompt_name,
                prompt_type,
                ActivityAction::ProcessError,
            )
        }
    }

    /// Sets the processing time.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}
