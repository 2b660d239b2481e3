//! Seed CLI command.

use std::io::Write;
use std::path::Path;

use super::emit;
use crate::Result;
use crate::services::{SeedLoader, SeedSynchronizer, SyncReport};
use crate::storage::PromptRepository;

/// Seed command handler.
pub struct SeedCommand;

impl SeedCommand {
    /// Loads a seed directory and reports each loaded and rejected file.
    ///
    /// Returns the number of rejected files.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn check(dir: &Path, out: &mut impl Write) -> Result<usize> {
        let report = SeedLoader::load_with_report(dir)?;

        for seed in &report.seeds {
            emit(
                out,
                format_args!(
                    "ok       {:<7} {} ({} chars)",
                    seed.prompt_type.as_str(),
                    seed.name,
                    seed.content.chars().count()
                ),
            )?;
        }
        for (path, reason) in &report.rejected {
            emit(out, format_args!("rejected {}: {reason}", path.display()))?;
        }
        emit(
            out,
            format_args!(
                "{} loaded, {} rejected",
                report.seeds.len(),
                report.rejected.len()
            ),
        )?;

        Ok(report.rejected.len())
    }

    /// Loads a seed directory and synchronises it into a user's prompts.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or the repository fails.
    pub fn sync(
        repository: &dyn PromptRepository,
        dir: &Path,
        user_id: &str,
        out: &mut impl Write,
    ) -> Result<SyncReport> {
        let seeds = SeedLoader::load_from_directory(dir)?;
        let report = SeedSynchronizer::sync(repository, user_id, &seeds)?;

        emit(
            out,
            format_args!(
                "created {}, updated {}, unchanged {}, deactivated {}, skipped {}",
                report.created, report.updated, report.unchanged, report.deactivated, report.skipped
            ),
        )?;
        Ok(report)
    }
}
