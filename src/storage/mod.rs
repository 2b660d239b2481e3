//! Storage layer.
//!
//! Prompt records live in a [`PromptRepository`]. The resolution engine only
//! reads from it; seed synchronisation writes to it.

// Allow significant_drop_tightening - dropping database connections slightly early
// provides no meaningful benefit.
#![allow(clippy::significant_drop_tightening)]

pub mod prompt;

pub use prompt::{
    MemoryPromptRepository, PromptBackendType, PromptRepository, PromptRepositoryFactory,
    SqlitePromptRepository,
};
