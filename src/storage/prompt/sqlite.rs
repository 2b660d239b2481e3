//! SQLite-based prompt repository.
//!
//! Stores prompts in `<data_dir>/postforge/prompts.db` by default.

use super::PromptRepository;
use crate::models::{PromptOrigin, PromptRecord, PromptType};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Columns selected for every record query, in [`PromptRow`] order.
const SELECT_COLUMNS: &str =
    "id, user_id, name, prompt_type, content, active, origin, created_at, updated_at";

/// `SQLite`-based prompt repository.
pub struct SqlitePromptRepository {
    /// Connection to the `SQLite` database.
    conn: Mutex<Connection>,
    /// Path to the `SQLite` database.
    db_path: PathBuf,
}

/// Raw row, converted to a [`PromptRecord`] outside the rusqlite closure.
struct PromptRow {
    id: String,
    user_id: String,
    name: String,
    prompt_type: String,
    content: String,
    active: bool,
    origin: String,
    created_at: String,
    updated_at: String,
}

impl PromptRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            prompt_type: row.get(3)?,
            content: row.get(4)?,
            active: row.get(5)?,
            origin: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn into_record(self) -> Result<PromptRecord> {
        let prompt_type = PromptType::parse(&self.prompt_type).ok_or_else(|| {
            Error::operation(
                "decode_prompt_row",
                format!("unknown prompt type '{}' for id {}", self.prompt_type, self.id),
            )
        })?;

        Ok(PromptRecord {
            prompt_type,
            origin: PromptOrigin::parse(&self.origin),
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            content: self.content,
            active: self.active,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::operation("decode_prompt_timestamp", e))
}

/// Maps a write error, turning unique-constraint failures into conflicts.
fn map_write_error(operation: &str, record: &PromptRecord, e: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, _) = &e {
        if failure.code == ErrorCode::ConstraintViolation {
            return Error::Conflict(format!(
                "prompt '{}' already exists for user '{}'",
                record.name, record.user_id
            ));
        }
    }
    Error::operation(operation, e)
}

impl SqlitePromptRepository {
    /// Opens (or creates) a repository at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::operation("create_prompt_db_dir", e))?;
        }

        let conn = Connection::open(&db_path).map_err(|e| Error::operation("open_prompt_db", e))?;

        let repo = Self {
            conn: Mutex::new(conn),
            db_path,
        };
        repo.initialize()?;
        Ok(repo)
    }

    /// Creates an in-memory `SQLite` repository (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::operation("open_prompt_db_memory", e))?;

        let repo = Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        };
        repo.initialize()?;
        Ok(repo)
    }

    /// Returns the default database path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|d| d.data_dir().join("postforge").join("prompts.db"))
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Initializes the database schema.
    fn initialize(&self) -> Result<()> {
        let conn = self.lock_conn();

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS prompts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                prompt_type TEXT NOT NULL,
                content TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                origin TEXT NOT NULL DEFAULT 'custom',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, name)
            );
            CREATE INDEX IF NOT EXISTS idx_prompts_user_id ON prompts(user_id);",
        )
        .map_err(|e| Error::operation("create_prompts_table", e))
    }

    /// Locks the connection, recovering from poisoning.
    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("SQLite prompt repository mutex was poisoned, recovering");
                metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
                poisoned.into_inner()
            },
        }
    }
}

impl PromptRepository for SqlitePromptRepository {
    fn find_by_name(&self, user_id: &str, name: &str) -> Result<Option<PromptRecord>> {
        let conn = self.lock_conn();

        let row = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM prompts WHERE user_id = ?1 AND name = ?2"),
                params![user_id, name],
                PromptRow::from_row,
            )
            .optional()
            .map_err(|e| Error::operation("find_prompt_by_name", e))?;

        row.map(PromptRow::into_record).transpose()
    }

    fn list_by_user_id(&self, user_id: &str) -> Result<Vec<PromptRecord>> {
        let conn = self.lock_conn();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM prompts WHERE user_id = ?1 ORDER BY created_at, name"
            ))
            .map_err(|e| Error::operation("prepare_list_prompts", e))?;

        let rows = stmt
            .query_map(params![user_id], PromptRow::from_row)
            .map_err(|e| Error::operation("list_prompts", e))?;

        let mut results = Vec::new();
        for row in rows {
            let row = row.map_err(|e| Error::operation("read_prompt_row", e))?;
            results.push(row.into_record()?);
        }
        Ok(results)
    }

    fn create(&self, record: &PromptRecord) -> Result<String> {
        record.validate()?;
        let conn = self.lock_conn();

        conn.execute(
            "INSERT INTO prompts
             (id, user_id, name, prompt_type, content, active, origin, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.user_id,
                record.name,
                record.prompt_type.as_str(),
                record.content,
                record.active,
                record.origin.as_str(),
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| map_write_error("create_prompt", record, e))?;

        Ok(record.id.clone())
    }

    fn update(&self, record: &PromptRecord) -> Result<()> {
        record.validate()?;
        let conn = self.lock_conn();

        let changed = conn
            .execute(
                "UPDATE prompts
                 SET user_id = ?2, name = ?3, prompt_type = ?4, content = ?5,
                     active = ?6, origin = ?7, updated_at = ?8
                 WHERE id = ?1",
                params![
                    record.id,
                    record.user_id,
                    record.name,
                    record.prompt_type.as_str(),
                    record.content,
                    record.active,
                    record.origin.as_str(),
                    record.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| map_write_error("update_prompt", record, e))?;

        if changed == 0 {
            return Err(Error::NotFound(format!(
                "prompt with id {} not found",
                record.id
            )));
        }
        Ok(())
    }

    fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let conn = self.lock_conn();

        let changed = conn
            .execute(
                "DELETE FROM prompts WHERE user_id = ?1 AND id = ?2",
                params![user_id, id],
            )
            .map_err(|e| Error::operation("delete_prompt", e))?;

        Ok(changed > 0)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn count_by_user_id(&self, user_id: &str) -> Result<usize> {
        let conn = self.lock_conn();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM prompts WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(|e| Error::operation("count_prompts", e))?;

        Ok(count.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(user: &str, name: &str) -> PromptRecord {
        PromptRecord::new(user, name, PromptType::Drafts, "Write about {content}")
    }

    #[test]
    fn test_create_and_find_roundtrip() {
        let repo = SqlitePromptRepository::in_memory().unwrap();
        let stored = record("u1", "post").with_origin(PromptOrigin::Seed);
        repo.create(&stored).unwrap();

        let found = repo.find_by_name("u1", "post").unwrap().unwrap();
        assert_eq!(found.id, stored.id);
        assert_eq!(found.prompt_type, PromptType::Drafts);
        assert_eq!(found.origin, PromptOrigin::Seed);
        assert_eq!(found.content, "Write about {content}");
        assert!(found.active);
        assert_eq!(found.created_at.timestamp(), stored.created_at.timestamp());
    }

    #[test]
    fn test_find_missing_returns_none() {
        let repo = SqlitePromptRepository::in_memory().unwrap();
        assert!(repo.find_by_name("u1", "nope").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_owner_and_name_conflicts() {
        let repo = SqlitePromptRepository::in_memory().unwrap();
        repo.create(&record("u1", "post")).unwrap();

        let err = repo.create(&record("u1", "post")).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)), "got {err:?}");

        repo.create(&record("u2", "post")).unwrap();
    }

    #[test]
    fn test_update_and_deactivate() {
        let repo = SqlitePromptRepository::in_memory().unwrap();
        let mut stored = record("u1", "post");
        repo.create(&stored).unwrap();

        stored.active = false;
        stored.content = "Rewrite {content}".to_string();
        stored.touch();
        repo.update(&stored).unwrap();

        let found = repo.find_by_name("u1", "post").unwrap().unwrap();
        assert!(!found.active);
        assert_eq!(found.content, "Rewrite {content}");
    }

    #[test]
    fn test_update_unknown_id() {
        let repo = SqlitePromptRepository::in_memory().unwrap();
        let err = repo.update(&record("u1", "post")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_list_count_and_delete() {
        let repo = SqlitePromptRepository::in_memory().unwrap();
        let a = record("u1", "a");
        repo.create(&a).unwrap();
        repo.create(&record("u1", "b")).unwrap();
        repo.create(&record("u2", "c")).unwrap();

        assert_eq!(repo.list_by_user_id("u1").unwrap().len(), 2);
        assert_eq!(repo.count_by_user_id("u1").unwrap(), 2);
        assert_eq!(repo.count_by_user_id("nobody").unwrap(), 0);

        assert!(repo.delete("u1", &a.id).unwrap());
        assert!(!repo.delete("u1", &a.id).unwrap());
        assert_eq!(repo.count_by_user_id("u1").unwrap(), 1);
    }

    #[test]
    fn test_file_backed_repository_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("prompts.db");

        {
            let repo = SqlitePromptRepository::new(&path).unwrap();
            repo.create(&record("u1", "post")).unwrap();
            assert_eq!(repo.db_path(), path.as_path());
        }

        let reopened = SqlitePromptRepository::new(&path).unwrap();
        assert!(reopened.find_by_name("u1", "post").unwrap().is_some());
    }
}
