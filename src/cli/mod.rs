//! CLI command implementations.
//!
//! Each command writes its output to a caller-supplied writer so it can be
//! exercised without a terminal.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `seed check` | Parse a seed directory and list what loads |
//! | `seed sync` | Apply a seed directory to a user's prompts |
//! | `prompt list` | List a user's prompt records |
//! | `prompt resolve` | Resolve a prompt and print the final text |
//! | `diagnostics` | Print engine diagnostics as JSON |
//! | `config` | Print the effective configuration |
//!
//! # Example Usage
//!
//! ```bash
//! postforge seed sync ./seeds --user user-1
//! postforge prompt resolve --user user-1 --name weekly-ideas --type ideas \
//!     --topic Rust --ideas 5 --related "Cargo,Tokio"
//! ```

mod config;
mod diagnostics;
mod prompt;
mod seed;

pub use config::ConfigCommand;
pub use diagnostics::DiagnosticsCommand;
pub use prompt::{PromptCommand, ResolveArgs};
pub use seed::SeedCommand;

use std::io::Write;
use std::sync::Arc;

use crate::config::PostforgeConfig;
use crate::storage::{PromptRepository, PromptRepositoryFactory};
use crate::{Error, Result};

/// Opens the repository named by the configuration.
///
/// # Errors
///
/// Returns an error if the backend cannot be initialized.
pub fn open_repository(config: &PostforgeConfig) -> Result<Arc<dyn PromptRepository>> {
    PromptRepositoryFactory::create(config.storage.backend, config.storage.path.clone())
}

/// Writes one line of command output.
pub(crate) fn emit(out: &mut impl Write, line: impl std::fmt::Display) -> Result<()> {
    writeln!(out, "{line}").map_err(|e| Error::operation("write_output", e))
}
