//! Prompt repository trait definition.

use crate::Result;
use crate::models::PromptRecord;

/// Trait for prompt repository backends.
///
/// Records are scoped by owner; `(user_id, name)` is unique. The resolver
/// only reads through [`find_by_name`](Self::find_by_name) and
/// [`list_by_user_id`](Self::list_by_user_id); the write methods belong to
/// seed synchronisation and prompt management.
///
/// Implementations that honour a caller deadline report it as
/// [`crate::Error::Cancelled`], which the resolver propagates unchanged.
pub trait PromptRepository: Send + Sync {
    /// Gets a user's prompt by name, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be accessed.
    fn find_by_name(&self, user_id: &str, name: &str) -> Result<Option<PromptRecord>>;

    /// Lists all of a user's prompts.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be accessed.
    fn list_by_user_id(&self, user_id: &str) -> Result<Vec<PromptRecord>>;

    /// Creates a prompt.
    ///
    /// # Returns
    ///
    /// The id of the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Conflict`] if the owner already has a prompt
    /// with that name, or [`crate::Error::InvalidInput`] if the record is
    /// invalid.
    fn create(&self, record: &PromptRecord) -> Result<String>;

    /// Replaces a prompt, matched by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if no record has that id.
    fn update(&self, record: &PromptRecord) -> Result<()>;

    /// Deletes a user's prompt by id.
    ///
    /// # Returns
    ///
    /// True if deleted, false if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be accessed.
    fn delete(&self, user_id: &str, id: &str) -> Result<bool>;

    /// Counts a user's prompts.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be accessed.
    fn count_by_user_id(&self, user_id: &str) -> Result<usize>;
}
