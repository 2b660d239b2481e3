//! In-memory prompt repository.

use super::PromptRepository;
use crate::models::PromptRecord;
use crate::{Error, Result};
use std::sync::{PoisonError, RwLock};

/// Process-local prompt repository.
///
/// Records are kept in insertion order, so listings are stable.
#[derive(Debug, Default)]
pub struct MemoryPromptRepository {
    records: RwLock<Vec<PromptRecord>>,
}

impl MemoryPromptRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with records.
    ///
    /// # Errors
    ///
    /// Returns the first validation or conflict error.
    pub fn with_records(records: impl IntoIterator<Item = PromptRecord>) -> Result<Self> {
        let repo = Self::new();
        for record in records {
            repo.create(&record)?;
        }
        Ok(repo)
    }
}

impl PromptRepository for MemoryPromptRepository {
    fn find_by_name(&self, user_id: &str, name: &str) -> Result<Option<PromptRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .find(|r| r.user_id == user_id && r.name == name)
            .cloned())
    }

    fn list_by_user_id(&self, user_id: &str) -> Result<Vec<PromptRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn create(&self, record: &PromptRecord) -> Result<String> {
        record.validate()?;

        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records
            .iter()
            .any(|r| r.user_id == record.user_id && r.name == record.name)
        {
            return Err(Error::Conflict(format!(
                "prompt '{}' already exists for user '{}'",
                record.name, record.user_id
            )));
        }

        records.push(record.clone());
        Ok(record.id.clone())
    }

    fn update(&self, record: &PromptRecord) -> Result<()> {
        record.validate()?;

        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records
            .iter()
            .any(|r| r.id != record.id && r.user_id == record.user_id && r.name == record.name)
        {
            return Err(Error::Conflict(format!(
                "prompt '{}' already exists for user '{}'",
                record.name, record.user_id
            )));
        }

        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| Error::NotFound(format!("prompt with id {} not found", record.id)))?;
        *slot = record.clone();
        Ok(())
    }

    fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|r| !(r.user_id == user_id && r.id == id));
        Ok(records.len() != before)
    }

    fn count_by_user_id(&self, user_id: &str) -> Result<usize> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.iter().filter(|r| r.user_id == user_id).count())
    }
}
