//! Prompt resolution.
//!
//! Turns `(owner, prompt name, category, context)` into ready-to-send prompt
//! text. One resolver is meant to be shared by every request thread.
//!
//! # Resolution
//!
//! 1. Check the request preconditions (user, then topic or idea)
//! 2. Look up the fingerprint in the cache; a hit returns immediately
//! 3. Find the owner's prompt by name, else the default catalog template
//! 4. Substitute, cache the result and record the activity
//!
//! Errors are never cached, and no text is returned alongside an error.

use serde::Serialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

use super::activity_log::{ActivityLog, DEFAULT_ACTIVITY_LOG_CAPACITY};
use super::cache::{CacheStats, PromptCache};
use super::substitution::{substitute, unresolved_placeholders};
use super::{DefaultCatalog, Fingerprint};
use crate::config::EngineConfig;
use crate::models::{
    ActivityAction, ActivityLogEntry, IdeaContext, PromptType, SUPPORTED_PLACEHOLDERS,
    TopicContext, UserProfile,
};
use crate::storage::PromptRepository;
use crate::{Error, Result};

/// Inputs of one resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    /// Owner of the prompt.
    pub user_id: &'a str,
    /// Prompt name to look up.
    pub prompt_name: &'a str,
    /// Requested category.
    pub prompt_type: PromptType,
    /// Topic, required for ideas prompts.
    pub topic: Option<&'a TopicContext>,
    /// Idea, required for drafts prompts.
    pub idea: Option<&'a IdeaContext>,
    /// The user the prompt is written for. Always required.
    pub user: Option<&'a UserProfile>,
}

impl<'a> ResolveRequest<'a> {
    /// Creates a request with no context attached.
    #[must_use]
    pub const fn new(user_id: &'a str, prompt_name: &'a str, prompt_type: PromptType) -> Self {
        Self {
            user_id,
            prompt_name,
            prompt_type,
            topic: None,
            idea: None,
            user: None,
        }
    }

    /// Creates an ideas request for a topic.
    #[must_use]
    pub const fn ideas(user_id: &'a str, prompt_name: &'a str, topic: &'a TopicContext) -> Self {
        Self::new(user_id, prompt_name, PromptType::Ideas).with_topic(topic)
    }

    /// Creates a drafts request for an idea.
    #[must_use]
    pub const fn drafts(user_id: &'a str, prompt_name: &'a str, idea: &'a IdeaContext) -> Self {
        Self::new(user_id, prompt_name, PromptType::Drafts).with_idea(idea)
    }

    /// Attaches a topic.
    #[must_use]
    pub const fn with_topic(mut self, topic: &'a TopicContext) -> Self {
        self.topic = Some(topic);
        self
    }

    /// Attaches an idea.
    #[must_use]
    pub const fn with_idea(mut self, idea: &'a IdeaContext) -> Self {
        self.idea = Some(idea);
        self
    }

    /// Attaches the user.
    #[must_use]
    pub const fn with_user(mut self, user: &'a UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    /// Checks the preconditions, in order.
    fn validate(&self) -> Result<&'a UserProfile> {
        let user = self
            .user
            .ok_or_else(|| Error::InvalidInput("user is required".to_string()))?;

        match self.prompt_type {
            PromptType::Ideas if self.topic.is_none() => Err(Error::InvalidInput(
                "topic is required for ideas prompts".to_string(),
            )),
            PromptType::Drafts if self.idea.is_none() => Err(Error::InvalidInput(
                "idea is required for drafts prompts".to_string(),
            )),
            _ => Ok(user),
        }
    }

    fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(
            self.user_id,
            self.prompt_name,
            self.prompt_type,
            self.topic,
            self.idea,
        )
    }
}

/// Engine state reported for one user.
#[derive(Debug, Clone, Serialize)]
pub struct EngineDiagnostics {
    /// Whether the engine is serving requests.
    pub active: bool,
    /// The user the counts refer to.
    pub user_id: String,
    /// Prompt records owned by the user, seed-derived and custom, active or not.
    pub prompt_count: usize,
    /// Current cache entry count.
    pub cache_size: usize,
    /// Cache counters.
    pub cache_stats: CacheStats,
    /// Retained activity entries.
    pub activity_log_size: usize,
    /// Every recognised placeholder token.
    pub supported_placeholders: Vec<&'static str>,
}

/// Resolves prompt templates against a repository, with caching.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use postforge::models::{IdeaContext, UserProfile};
/// use postforge::services::{PromptResolver, ResolveRequest};
/// use postforge::storage::MemoryPromptRepository;
///
/// let resolver = PromptResolver::new(Arc::new(MemoryPromptRepository::new()));
/// let user = UserProfile::new("u1", "ana@example.com");
/// let idea = IdeaContext::new("Why we moved our CLI to Rust");
///
/// let request = ResolveRequest::drafts("u1", "post", &idea).with_user(&user);
/// let first = resolver.resolve(&request)?;
/// let second = resolver.resolve(&request)?;
///
/// assert_eq!(first, second);
/// assert_eq!(resolver.cache_size(), 1);
/// # Ok::<(), postforge::Error>(())
/// ```
pub struct PromptResolver {
    repository: Arc<dyn PromptRepository>,
    catalog: DefaultCatalog,
    cache: PromptCache,
    activity: ActivityLog,
}

impl PromptResolver {
    /// Creates a resolver with the built-in catalog, an unbounded cache and
    /// the default activity log capacity.
    #[must_use]
    pub fn new(repository: Arc<dyn PromptRepository>) -> Self {
        Self {
            repository,
            catalog: DefaultCatalog::builtin(),
            cache: PromptCache::unbounded(),
            activity: ActivityLog::new(DEFAULT_ACTIVITY_LOG_CAPACITY),
        }
    }

    /// Creates a resolver from engine configuration.
    #[must_use]
    pub fn from_config(repository: Arc<dyn PromptRepository>, config: &EngineConfig) -> Self {
        Self {
            cache: PromptCache::new(config.cache_max_entries.and_then(NonZeroUsize::new)),
            activity: ActivityLog::new(config.activity_log_capacity),
            ..Self::new(repository)
        }
    }

    /// Replaces the fallback catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: DefaultCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Bounds the cache to `capacity` entries.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.cache = PromptCache::new(Some(capacity));
        self
    }

    /// Sets how many activity entries are retained.
    #[must_use]
    pub fn with_activity_capacity(mut self, capacity: usize) -> Self {
        self.activity = ActivityLog::new(capacity);
        self
    }

    /// Resolves a prompt to its final text.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the user, or the topic/idea the category
    ///   needs, is missing
    /// - [`Error::PromptNotFound`] if neither the repository nor the catalog
    ///   has a template
    /// - [`Error::MissingVariable`] if a required context value is empty
    /// - [`Error::Cancelled`] if the repository call was cancelled
    /// - [`Error::OperationFailed`] for other repository failures
    #[instrument(
        skip(self, request),
        fields(
            user_id = %request.user_id,
            prompt_name = %request.prompt_name,
            prompt_type = %request.prompt_type,
        )
    )]
    pub fn resolve(&self, request: &ResolveRequest<'_>) -> Result<String> {
        let user = request.validate()?;
        let start = Instant::now();
        let key = request.fingerprint();

        if let Some(cached) = self.cache.get(&key) {
            metrics::counter!("prompt_cache_hits_total").increment(1);
            tracing::debug!("prompt cache hit");
            self.activity.record(ActivityLogEntry::success(
                request.user_id,
                request.prompt_name,
                request.prompt_type,
                ActivityAction::CacheHit,
            ));
            return Ok(cached);
        }
        metrics::counter!("prompt_cache_misses_total").increment(1);

        let result = self
            .load_template(request)
            .and_then(|template| {
                substitute(
                    &template,
                    request.prompt_type,
                    request.topic,
                    request.idea,
                    Some(user),
                )
            });

        let elapsed = start.elapsed();
        metrics::histogram!("prompt_resolve_duration_ms").record(elapsed.as_secs_f64() * 1000.0);

        match result {
            Ok(text) => {
                let leftover = unresolved_placeholders(&text);
                if !leftover.is_empty() {
                    tracing::debug!(?leftover, "resolved prompt contains unresolved placeholders");
                }

                self.cache.insert(key, text.clone());
                self.activity.record(
                    ActivityLogEntry::success(
                        request.user_id,
                        request.prompt_name,
                        request.prompt_type,
                        ActivityAction::ProcessComplete,
                    )
                    .with_duration_ms(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
                );
                Ok(text)
            },
            Err(e) => {
                metrics::counter!("prompt_resolve_errors_total", "reason" => e.kind())
                    .increment(1);
                tracing::warn!(error = %e, "prompt resolution failed");
                self.activity.record(ActivityLogEntry::failure(
                    request.user_id,
                    request.prompt_name,
                    request.prompt_type,
                    e.to_string(),
                ));
                Err(e)
            },
        }
    }

    /// Finds the owner's template by name, else the catalog template.
    fn load_template(&self, request: &ResolveRequest<'_>) -> Result<String> {
        let found = self
            .repository
            .find_by_name(request.user_id, request.prompt_name)
            .map_err(|e| match e {
                Error::Cancelled(_) => e,
                other => Error::operation("find_prompt_by_name", other),
            })?;

        if let Some(record) = found {
            if record.prompt_type != request.prompt_type {
                tracing::warn!(
                    stored_type = %record.prompt_type,
                    "stored prompt category differs from the requested category"
                );
            }
            if !record.active {
                tracing::debug!("using inactive prompt record");
            }
            return Ok(record.content);
        }

        tracing::debug!("no stored prompt, using default template");
        self.catalog
            .template(request.prompt_type)
            .map(str::to_string)
            .ok_or_else(|| Error::PromptNotFound {
                name: request.prompt_name.to_string(),
                prompt_type: request.prompt_type.to_string(),
            })
    }

    /// Empties the cache and resets its counters.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("prompt cache cleared");
    }

    /// Returns the cache entry count.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Returns a copy of the cache, keyed by hex fingerprint.
    ///
    /// For diagnostics only.
    #[must_use]
    pub fn cache_contents(&self) -> HashMap<String, String> {
        self.cache.contents()
    }

    /// Returns the cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Returns up to `limit` activity entries, newest first.
    #[must_use]
    pub fn recent_activity(&self, limit: usize) -> Vec<ActivityLogEntry> {
        self.activity.recent(limit)
    }

    /// Reports engine state for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository listing fails.
    pub fn diagnostics(&self, user_id: &str) -> Result<EngineDiagnostics> {
        let prompt_count = self.repository.list_by_user_id(user_id)?.len();
        let cache_stats = self.cache.stats();

        Ok(EngineDiagnostics {
            active: true,
            user_id: user_id.to_string(),
            prompt_count,
            cache_size: cache_stats.size,
            cache_stats,
            activity_log_size: self.activity.len(),
            supported_placeholders: SUPPORTED_PLACEHOLDERS.to_vec(),
        })
    }
}

impl std::fmt::Debug for PromptResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptResolver")
            .field("catalog", &self.catalog)
            .field("cache", &self.cache)
            .field("activity", &self.activity)
            .finish_non_exhaustive()
    }
}
