//! Prompt repository backends.
//!
//! Provides user-scoped storage for prompt records with pluggable backends:
//!
//! | Backend | Type | Location |
//! |---------|------|----------|
//! | Memory | [`MemoryPromptRepository`] | Process memory |
//! | `SQLite` | [`SqlitePromptRepository`] | `<data_dir>/postforge/prompts.db` |

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryPromptRepository;
pub use sqlite::SqlitePromptRepository;
pub use traits::PromptRepository;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Backend type for prompt storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptBackendType {
    /// Process-local memory.
    Memory,
    /// `SQLite` database.
    #[default]
    Sqlite,
}

impl PromptBackendType {
    /// Parses a backend name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Some(Self::Memory),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the backend name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Factory for prompt repositories.
pub struct PromptRepositoryFactory;

impl PromptRepositoryFactory {
    /// Creates a repository with an explicit backend type.
    ///
    /// # Arguments
    ///
    /// * `backend` - The backend type to use
    /// * `path` - Database path for `SQLite`; the platform default when `None`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    pub fn create(
        backend: PromptBackendType,
        path: Option<PathBuf>,
    ) -> Result<Arc<dyn PromptRepository>> {
        match backend {
            PromptBackendType::Memory => Ok(Arc::new(MemoryPromptRepository::new())),
            PromptBackendType::Sqlite => {
                let db_path = path
                    .or_else(SqlitePromptRepository::default_path)
                    .ok_or_else(|| {
                        Error::operation(
                            "create_prompt_repository",
                            "could not determine data directory",
                        )
                    })?;
                tracing::debug!(path = %db_path.display(), "opening SQLite prompt repository");
                Ok(Arc::new(SqlitePromptRepository::new(db_path)?))
            },
        }
    }
}
