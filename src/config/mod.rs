//! Configuration management.
//!
//! Settings come from, in increasing precedence:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config <path>`, else `<config_dir>/postforge/config.toml`)
//! 3. `POSTFORGE_*` environment variables
//!
//! ```toml
//! seed_dir = "./seeds"
//!
//! [storage]
//! backend = "sqlite"
//! path = "/var/lib/postforge/prompts.db"
//!
//! [engine]
//! cache_max_entries = 10000
//! activity_log_capacity = 1000
//!
//! [logging]
//! level = "postforge=debug"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! port = 9090
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::services::DEFAULT_ACTIVITY_LOG_CAPACITY;
use crate::storage::PromptBackendType;
use crate::{Error, Result};

/// Default Prometheus listener port.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Main configuration for postforge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostforgeConfig {
    /// Directory of prompt seed files.
    pub seed_dir: Option<PathBuf>,
    /// Prompt repository settings.
    pub storage: StorageConfig,
    /// Resolution engine settings.
    pub engine: EngineConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Metrics settings.
    pub metrics: MetricsSettings,
}

/// Prompt repository settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend type.
    #[serde(default)]
    pub backend: PromptBackendType,
    /// Database path; the platform data directory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Resolution engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cache entry bound. Unset means unbounded for the process lifetime.
    #[serde(default)]
    pub cache_max_entries: Option<usize>,
    /// Retained activity log entries.
    #[serde(default = "default_activity_log_capacity")]
    pub activity_log_capacity: usize,
}

const fn default_activity_log_capacity() -> usize {
    DEFAULT_ACTIVITY_LOG_CAPACITY
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_max_entries: None,
            activity_log_capacity: DEFAULT_ACTIVITY_LOG_CAPACITY,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `postforge=debug`.
    #[serde(default)]
    pub level: Option<String>,
    /// Output format: `pretty` or `json`.
    #[serde(default)]
    pub format: Option<String>,
    /// Log file; stderr when unset.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Metrics settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Whether the Prometheus exporter is installed.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Listener port.
    #[serde(default)]
    pub port: Option<u16>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Seed directory.
    pub seed_dir: Option<String>,
    /// Storage section.
    pub storage: Option<StorageConfig>,
    /// Engine section.
    pub engine: Option<EngineConfig>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
    /// Metrics section.
    pub metrics: Option<MetricsSettings>,
}

impl PostforgeConfig {
    /// Loads the effective configuration.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// used when present. Environment overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        Self::parse(&contents)
    }

    /// Parses TOML configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Returns default configuration if no config file is found or it cannot
    /// be parsed.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        Self::load_from_file(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
            Self::default()
        })
    }

    /// Returns `<config_dir>/postforge/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("postforge").join("config.toml"))
    }

    /// Converts a `ConfigFile` to `PostforgeConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        Self {
            seed_dir: file.seed_dir.map(PathBuf::from),
            storage: file.storage.unwrap_or_default(),
            engine: file.engine.unwrap_or_default(),
            logging: file.logging.unwrap_or_default(),
            metrics: file.metrics.unwrap_or_default(),
        }
    }

    /// Applies `POSTFORGE_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a key lookup. Blank and unparsable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(dir) = get("POSTFORGE_SEED_DIR") {
            self.seed_dir = Some(PathBuf::from(dir));
        }
        if let Some(backend) = get("POSTFORGE_STORAGE_BACKEND") {
            match PromptBackendType::parse(&backend) {
                Some(backend) => self.storage.backend = backend,
                None => tracing::warn!(%backend, "ignoring unknown storage backend"),
            }
        }
        if let Some(path) = get("POSTFORGE_DB_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }
        if let Some(max) = get("POSTFORGE_CACHE_MAX_ENTRIES").and_then(|v| v.parse().ok()) {
            self.engine.cache_max_entries = Some(max).filter(|max| *max > 0);
        }
        if let Some(capacity) = get("POSTFORGE_ACTIVITY_LOG_CAPACITY").and_then(|v| v.parse().ok())
        {
            self.engine.activity_log_capacity = capacity;
        }
        if let Some(level) = get("POSTFORGE_LOG_LEVEL") {
            self.logging.level = Some(level);
        }
        if let Some(format) = get("POSTFORGE_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = get("POSTFORGE_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
        if let Some(enabled) = get("POSTFORGE_METRICS_ENABLED") {
            let enabled = enabled.to_lowercase();
            self.metrics.enabled = Some(enabled == "true" || enabled == "1" || enabled == "yes");
        }
        if let Some(port) = get("POSTFORGE_METRICS_PORT").and_then(|v| v.parse().ok()) {
            self.metrics.port = Some(port);
        }
    }

    /// Sets the seed directory.
    #[must_use]
    pub fn with_seed_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_dir = Some(path.into());
        self
    }

    /// Sets the storage backend.
    #[must_use]
    pub const fn with_backend(mut self, backend: PromptBackendType) -> Self {
        self.storage.backend = backend;
        self
    }
}
