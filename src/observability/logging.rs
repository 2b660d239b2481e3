//! Structured logging configuration.

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Filter used when nothing else is configured.
pub const DEFAULT_FILTER: &str = "postforge=info";

/// Filter used with `--verbose`.
pub const VERBOSE_FILTER: &str = "postforge=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, defaulting to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Event filter.
    pub filter: EnvFilter,
    /// Output format.
    pub format: LogFormat,
    /// Log file; stderr when `None`.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds logging configuration from settings.
    ///
    /// Filter precedence: `--verbose`, then `RUST_LOG`, then the configured
    /// level, then [`DEFAULT_FILTER`].
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let directive = if verbose {
            VERBOSE_FILTER.to_string()
        } else {
            std::env::var(EnvFilter::DEFAULT_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .or_else(|| settings.level.clone())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string())
        };

        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
            tracing::warn!(%directive, error = %e, "invalid log filter, using default");
            EnvFilter::new(DEFAULT_FILTER)
        });

        Self {
            filter,
            format: settings
                .format
                .as_deref()
                .map_or_else(LogFormat::default, LogFormat::parse),
            file: settings.file.clone(),
        }
    }
}
