//! Business logic services.
//!
//! - [`SeedLoader`] reads prompt seed files from a directory
//! - [`SeedSynchronizer`] applies loaded seeds to a repository
//! - [`PromptResolver`] resolves, substitutes and caches prompts

mod activity_log;
mod cache;
mod defaults;
mod fingerprint;
mod resolver;
mod seed_loader;
mod seed_sync;
pub mod substitution;

pub use activity_log::{ActivityLog, DEFAULT_ACTIVITY_LOG_CAPACITY};
pub use cache::{CacheStats, PromptCache};
pub use defaults::{DEFAULT_DRAFTS_TEMPLATE, DEFAULT_IDEAS_TEMPLATE, DefaultCatalog};
pub use fingerprint::Fingerprint;
pub use resolver::{EngineDiagnostics, PromptResolver, ResolveRequest};
pub use seed_loader::{LEGACY_SUFFIX, SEED_SUFFIX, SeedLoadReport, SeedLoader, SeedRejection};
pub use seed_sync::{SeedSynchronizer, SyncReport};
pub use substitution::substitute;
