// crates/neptune-config/src/config.rs
// ============================================================================
// Module: Neptune Configuration
// Description: Configuration loading and validation for Neptune.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: neptune-core, neptune-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path resolves from an explicit argument, then the `NEPTUNE_CONFIG`
//! environment variable, then `neptune.toml` in the working directory. Every
//! section has defaults, so an empty file is a valid in-memory `SQLite`
//! setup logging to stderr at `info`.
//!
//! ```toml
//! [sql]
//! dialect = "sqlite"
//!
//! [store]
//! type = "sqlite"
//! path = "data/app.db"
//! journal_mode = "wal"
//!
//! [logging]
//! sink = "file"
//! level = "debug"
//! path = "logs/neptune.jsonl"
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use neptune_core::Dialect;
use neptune_core::FileLogSink;
use neptune_core::LogLevel;
use neptune_core::LogSink;
use neptune_core::NoopLogSink;
use neptune_core::SchemaRegistry;
use neptune_core::StderrLogSink;
use neptune_store_sqlite::SqliteExecutor;
use neptune_store_sqlite::SqliteStoreConfig;
use neptune_store_sqlite::SqliteStoreMode;
use neptune_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "neptune.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "NEPTUNE_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default busy timeout (ms) for `SQLite` stores.
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Upper bound accepted for the busy timeout.
const MAX_STORE_BUSY_TIMEOUT_MS: u64 = 600_000;

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Root Neptune configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NeptuneConfig {
    /// SQL generation settings.
    #[serde(default)]
    pub sql: SqlConfig,
    /// Execution store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NeptuneConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.logging.validate()?;
        if self.store.store_type != StoreType::External && self.sql.dialect != Dialect::Sqlite {
            return Err(ConfigError::Invalid(format!(
                "{} store requires sql.dialect = \"sqlite\"",
                self.store.store_type.as_str()
            )));
        }
        Ok(())
    }

    /// Builds the configured log sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the log file cannot be opened.
    pub fn build_log_sink(&self) -> Result<Arc<dyn LogSink>, ConfigError> {
        self.logging.build_sink()
    }

    /// Creates an empty schema registry for the configured dialect and sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the log sink cannot be built.
    pub fn schema_registry(&self) -> Result<SchemaRegistry, ConfigError> {
        Ok(SchemaRegistry::new(self.sql.dialect, self.build_log_sink()?))
    }

    /// Opens the configured `SQLite` executor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an external store and
    /// [`ConfigError::Store`] when the database cannot be opened.
    pub fn open_store(&self) -> Result<SqliteExecutor, ConfigError> {
        self.store.open()
    }
}

/// SQL generation settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SqlConfig {
    /// Dialect used for DDL and literal rendering.
    #[serde(default)]
    pub dialect: Dialect,
}

/// Execution store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Private in-memory `SQLite` database.
    #[default]
    Memory,
    /// On-disk `SQLite` database.
    Sqlite,
    /// The application supplies its own executor.
    External,
}

impl StoreType {
    /// Returns the config label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
            Self::External => "external",
        }
    }
}

/// Execution store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory | StoreType::External => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(format!(
                        "{} store must not set path",
                        self.store_type.as_str()
                    )));
                }
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_field_path("store.path", path)?;
            }
        }
        if self.busy_timeout_ms > MAX_STORE_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "store.busy_timeout_ms exceeds {MAX_STORE_BUSY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }

    /// Opens the executor for this store.
    fn open(&self) -> Result<SqliteExecutor, ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                SqliteExecutor::open_in_memory().map_err(|err| ConfigError::Store(err.to_string()))
            }
            StoreType::Sqlite => {
                let path = self.path.clone().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                let config = SqliteStoreConfig {
                    path,
                    busy_timeout_ms: self.busy_timeout_ms,
                    journal_mode: self.journal_mode,
                    sync_mode: self.sync_mode,
                };
                SqliteExecutor::open(&config).map_err(|err| ConfigError::Store(err.to_string()))
            }
            StoreType::External => Err(ConfigError::Invalid(
                "external store has no built-in executor".to_string(),
            )),
        }
    }
}

/// Returns the default busy timeout for `SQLite` stores.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

/// Log sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard all events.
    None,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Minimum level recorded.
    #[serde(default)]
    pub level: LogLevel,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkKind::File, Some(path)) => validate_field_path("logging.path", path),
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("file log sink requires logging.path".to_string()))
            }
            (LogSinkKind::Stderr | LogSinkKind::None, Some(_)) => Err(ConfigError::Invalid(
                "logging.path only allowed when sink = \"file\"".to_string(),
            )),
            (LogSinkKind::Stderr | LogSinkKind::None, None) => Ok(()),
        }
    }

    /// Builds the sink.
    fn build_sink(&self) -> Result<Arc<dyn LogSink>, ConfigError> {
        match self.sink {
            LogSinkKind::Stderr => Ok(Arc::new(StderrLogSink::new(self.level))),
            LogSinkKind::None => Ok(Arc::new(NoopLogSink)),
            LogSinkKind::File => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("file log sink requires logging.path".to_string())
                })?;
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    fs::create_dir_all(parent).map_err(|err| ConfigError::Io(err.to_string()))?;
                }
                let sink = FileLogSink::new(path, self.level)
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening a log file.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// The configured store could not be opened.
    #[error("config store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from an explicit argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path field.
fn validate_field_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::ConfigError;
    use super::validate_field_path;
    use super::validate_path;

    #[test]
    fn overlong_components_are_rejected() {
        let long = "a".repeat(300);
        assert!(matches!(validate_path(Path::new(&long)), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            validate_field_path("store.path", Path::new(&long)),
            Err(ConfigError::Invalid(_))
        ));
        assert!(validate_path(Path::new("neptune.toml")).is_ok());
    }

    #[test]
    fn blank_field_paths_are_rejected() {
        assert!(matches!(
            validate_field_path("logging.path", Path::new("  ")),
            Err(ConfigError::Invalid(_))
        ));
    }
}
