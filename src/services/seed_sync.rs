//! Seed synchronisation into a prompt repository.
//!
//! Brings one owner's seed-derived prompts in line with a loaded seed set.
//! User-authored (custom) prompts are never touched: a custom prompt with the
//! same name as a seed shadows it, and custom prompts are never deactivated.
//!
//! Cache keys do not cover template bodies, so a resolver sharing the
//! repository must have its cache cleared after a sync.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

use crate::models::{PromptOrigin, PromptRecord, SeedPromptFile};
use crate::storage::PromptRepository;
use crate::{Error, Result};

/// Counts of what a sync did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// New seed records.
    pub created: usize,
    /// Seed records whose body or category changed, or that were reactivated.
    pub updated: usize,
    /// Seed records already matching.
    pub unchanged: usize,
    /// Seed records deactivated because their seed disappeared.
    pub deactivated: usize,
    /// Seeds not applied: duplicates, invalid seeds and seeds shadowed by a custom prompt.
    pub skipped: usize,
}

/// Applies seed sets to a repository.
pub struct SeedSynchronizer;

impl SeedSynchronizer {
    /// Synchronises `seeds` into `owner_user_id`'s prompts.
    ///
    /// The first seed with a given name wins; later duplicates are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first repository error other than a seed failing record
    /// validation.
    #[instrument(skip(repository, seeds), fields(seed_count = seeds.len()))]
    pub fn sync(
        repository: &dyn PromptRepository,
        owner_user_id: &str,
        seeds: &[SeedPromptFile],
    ) -> Result<SyncReport> {
        let mut existing: HashMap<String, PromptRecord> = repository
            .list_by_user_id(owner_user_id)?
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();

        let mut report = SyncReport::default();
        let mut seen = HashSet::new();

        for seed in seeds {
            if !seen.insert(seed.name.as_str()) {
                tracing::warn!(name = %seed.name, "duplicate seed name, keeping the first");
                report.skipped += 1;
                continue;
            }

            match existing.remove(&seed.name) {
                None => match repository.create(&PromptRecord::from_seed(owner_user_id, seed)) {
                    Ok(_) => report.created += 1,
                    Err(Error::InvalidInput(reason)) => {
                        tracing::warn!(name = %seed.name, %reason, "skipping invalid seed");
                        report.skipped += 1;
                    },
                    Err(e) => return Err(e),
                },
                Some(record) if record.origin == PromptOrigin::Custom => {
                    tracing::debug!(name = %seed.name, "custom prompt shadows seed");
                    report.skipped += 1;
                },
                Some(mut record) => {
                    if record.content == seed.content
                        && record.prompt_type == seed.prompt_type
                        && record.active
                    {
                        report.unchanged += 1;
                        continue;
                    }
                    record.content.clone_from(&seed.content);
                    record.prompt_type = seed.prompt_type;
                    record.active = true;
                    record.touch();
                    repository.update(&record)?;
                    report.updated += 1;
                },
            }
        }

        for mut record in existing.into_values() {
            if record.origin == PromptOrigin::Seed && record.active {
                record.active = false;
                record.touch();
                repository.update(&record)?;
                tracing::info!(name = %record.name, "deactivated prompt whose seed was removed");
                report.deactivated += 1;
            }
        }

        tracing::info!(
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            deactivated = report.deactivated,
            skipped = report.skipped,
            "seed sync complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PromptType;
    use crate::storage::MemoryPromptRepository;

    fn seed(name: &str, content: &str) -> SeedPromptFile {
        SeedPromptFile::new(name, PromptType::Ideas, content)
    }

    fn active(repo: &MemoryPromptRepository, name: &str) -> bool {
        repo.find_by_name("u1", name).unwrap().unwrap().active
    }

    #[test]
    fn test_first_sync_creates_seed_records() {
        let repo = MemoryPromptRepository::new();
        let report =
            SeedSynchronizer::sync(&repo, "u1", &[seed("a", "A {name}"), seed("b", "B {name}")])
                .unwrap();

        assert_eq!(report.created, 2);
        let record = repo.find_by_name("u1", "a").unwrap().unwrap();
        assert_eq!(record.origin, PromptOrigin::Seed);
        assert!(record.active);
    }

    #[test]
    fn test_resync_is_idempotent() {
        let repo = MemoryPromptRepository::new();
        let seeds = [seed("a", "A {name}")];
        SeedSynchronizer::sync(&repo, "u1", &seeds).unwrap();

        let report = SeedSynchronizer::sync(&repo, "u1", &seeds).unwrap();
        assert_eq!(
            report,
            SyncReport {
                unchanged: 1,
                ..SyncReport::default()
            }
        );
    }

    #[test]
    fn test_changed_seed_updates_body() {
        let repo = MemoryPromptRepository::new();
        SeedSynchronizer::sync(&repo, "u1", &[seed("a", "Old {name}")]).unwrap();

        let report = SeedSynchronizer::sync(&repo, "u1", &[seed("a", "New {name}")]).unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(repo.find_by_name("u1", "a").unwrap().unwrap().content, "New {name}");
    }

    #[test]
    fn test_removed_seed_deactivated_then_reactivated() {
        let repo = MemoryPromptRepository::new();
        SeedSynchronizer::sync(&repo, "u1", &[seed("a", "A"), seed("b", "B")]).unwrap();

        let report = SeedSynchronizer::sync(&repo, "u1", &[seed("a", "A")]).unwrap();
        assert_eq!(report.deactivated, 1);
        assert!(!active(&repo, "b"));

        let report = SeedSynchronizer::sync(&repo, "u1", &[seed("a", "A"), seed("b", "B")]).unwrap();
        assert_eq!(report.updated, 1);
        assert!(active(&repo, "b"));
    }

    #[test]
    fn test_custom_prompts_untouched() {
        let repo = MemoryPromptRepository::with_records([
            PromptRecord::new("u1", "a", PromptType::Ideas, "Mine {name}"),
            PromptRecord::new("u1", "mine", PromptType::Drafts, "Mine {content}"),
        ])
        .unwrap();

        let report = SeedSynchronizer::sync(&repo, "u1", &[seed("a", "Seed {name}")]).unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.deactivated, 0);
        assert_eq!(repo.find_by_name("u1", "a").unwrap().unwrap().content, "Mine {name}");
        assert!(active(&repo, "mine"));
    }

    #[test]
    fn test_duplicate_seed_names_first_wins() {
        let repo = MemoryPromptRepository::new();
        let report =
            SeedSynchronizer::sync(&repo, "u1", &[seed("a", "First"), seed("a", "Second")]).unwrap();

        assert_eq!((report.created, report.skipped), (1, 1));
        assert_eq!(repo.find_by_name("u1", "a").unwrap().unwrap().content, "First");
    }

    #[test]
    fn test_invalid_seed_skipped() {
        let repo = MemoryPromptRepository::new();
        let long_name = "n".repeat(101);
        let report = SeedSynchronizer::sync(&repo, "u1", &[seed(&long_name, "Body")]).unwrap();

        assert_eq!((report.created, report.skipped), (0, 1));
    }

    #[test]
    fn test_other_owners_unaffected() {
        let repo = MemoryPromptRepository::new();
        SeedSynchronizer::sync(&repo, "u2", &[seed("a", "A")]).unwrap();

        SeedSynchronizer::sync(&repo, "u1", &[]).unwrap();

        assert!(repo.find_by_name("u2", "a").unwrap().unwrap().active);
    }
}
