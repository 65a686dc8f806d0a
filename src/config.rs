//! Runtime configuration for the board backend.
//!
//! # Environment Variables
//!
//! - `KANBAN_STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `KANBAN_DATABASE_URL`: `PostgreSQL` connection URL (required when
//!   `KANBAN_STORAGE_MODE=postgres`)
//! - `KANBAN_POOL_MAX_SIZE`: maximum pooled connections (default `10`)
//! - `KANBAN_LOG`: `tracing` filter directive (default `info`)

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable selecting the storage backend.
pub const STORAGE_MODE_VAR: &str = "KANBAN_STORAGE_MODE";
/// Environment variable holding the `PostgreSQL` URL.
pub const DATABASE_URL_VAR: &str = "KANBAN_DATABASE_URL";
/// Environment variable holding the pool size.
pub const POOL_MAX_SIZE_VAR: &str = "KANBAN_POOL_MAX_SIZE";
/// Environment variable holding the log filter.
pub const LOG_FILTER_VAR: &str = "KANBAN_LOG";

const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_LOG_FILTER: &str = "info";

/// Storage backend for users, tasks, and ordered lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local storage for tests and development.
    #[default]
    InMemory,
    /// `PostgreSQL` storage with row-level locking.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_owned())),
        }
    }
}

/// Validated backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Selected storage backend.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` URL, required for [`StorageMode::Postgres`].
    pub database_url: Option<String>,
    /// Maximum number of pooled connections.
    pub pool_max_size: u32,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            database_url: None,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl BoardConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> BoardConfigBuilder {
        BoardConfigBuilder::default()
    }

    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a variable holds an invalid value
    /// or the database URL is missing for `PostgreSQL` storage.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// Empty and whitespace-only values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a value is invalid or the database
    /// URL is missing for `PostgreSQL` storage.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigurationError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let storage_mode = read(STORAGE_MODE_VAR)
            .map(|value| value.parse::<StorageMode>())
            .transpose()?
            .unwrap_or_default();
        let pool_max_size = read(POOL_MAX_SIZE_VAR)
            .map(|value| {
                value
                    .parse::<u32>()
                    .map_err(|_| ConfigurationError::InvalidPoolSize(value.clone()))
            })
            .transpose()?
            .unwrap_or(DEFAULT_POOL_MAX_SIZE);

        let config = Self {
            storage_mode,
            database_url: read(DATABASE_URL_VAR),
            pool_max_size,
            log_filter: read(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field requirements.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingDatabaseUrl`] when `PostgreSQL`
    /// storage has no URL, or [`ConfigurationError::InvalidPoolSize`] when the
    /// pool size is zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::Postgres && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }
        if self.pool_max_size == 0 {
            return Err(ConfigurationError::InvalidPoolSize(
                self.pool_max_size.to_string(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`BoardConfig`].
#[derive(Debug, Clone, Default)]
pub struct BoardConfigBuilder {
    config: BoardConfig,
}

impl BoardConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.config.storage_mode = mode;
        self
    }

    /// Sets the `PostgreSQL` URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    /// Sets the maximum pool size.
    #[must_use]
    pub const fn pool_max_size(mut self, size: u32) -> Self {
        self.config.pool_max_size = size;
        self
    }

    /// Sets the log filter directive.
    #[must_use]
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the configuration is invalid.
    pub fn build(self) -> Result<BoardConfig, ConfigurationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Unrecognized storage mode.
    #[error("invalid storage mode '{0}', expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    /// `PostgreSQL` storage selected without a URL.
    #[error("KANBAN_DATABASE_URL is required when KANBAN_STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// Pool size is not a positive integer.
    #[error("invalid pool size '{0}', expected a positive integer")]
    InvalidPoolSize(String),
}
