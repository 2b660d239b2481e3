//! Diagnostics CLI command.

use std::io::Write;

use super::emit;
use crate::services::{EngineDiagnostics, PromptResolver};
use crate::{Error, Result};

/// Diagnostics command handler.
pub struct DiagnosticsCommand;

impl DiagnosticsCommand {
    /// Writes engine diagnostics for a user as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository listing or serialization fails.
    pub fn run(
        resolver: &PromptResolver,
        user_id: &str,
        out: &mut impl Write,
    ) -> Result<EngineDiagnostics> {
        let diagnostics = resolver.diagnostics(user_id)?;
        let json = serde_json::to_string_pretty(&diagnostics)
            .map_err(|e| Error::operation("serialize_diagnostics", e))?;
        emit(out, json)?;
        Ok(diagnostics)
    }
}
