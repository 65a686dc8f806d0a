//! Storage backend selected at runtime from [`BoardConfig`].

use super::{
    memory::InMemoryBoardStore,
    postgres::{BoardPgPool, PostgresBoardStore},
};
use crate::board::ports::{BoardReader, BoardStore, BoardStoreError, BoardUnit};
use crate::config::{BoardConfig, ConfigurationError, StorageMode};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use thiserror::Error;

/// Board store chosen by [`BoardConfig::storage_mode`].
#[derive(Debug, Clone)]
pub enum ConfiguredBoardStore {
    /// Process-local storage.
    InMemory(InMemoryBoardStore),
    /// `PostgreSQL` storage.
    Postgres(PostgresBoardStore),
}

/// Errors raised while opening the configured store.
#[derive(Debug, Error)]
pub enum StoreOpenError {
    /// The configuration is incomplete or invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

impl ConfiguredBoardStore {
    /// Opens the store selected by `config`.
    ///
    /// For `PostgreSQL` this builds the connection pool and checks out one
    /// connection, so an unreachable database fails here rather than on the
    /// first request.
    ///
    /// # Errors
    ///
    /// Returns [`StoreOpenError`] when the configuration is invalid or the
    /// pool cannot connect.
    pub fn open(config: &BoardConfig) -> Result<Self, StoreOpenError> {
        config.validate()?;
        match config.storage_mode {
            StorageMode::InMemory => {
                tracing::info!("using in-memory board store");
                Ok(Self::InMemory(InMemoryBoardStore::new()))
            }
            StorageMode::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or(ConfigurationError::MissingDatabaseUrl)?;
                let pool = build_pool(url, config.pool_max_size)?;
                tracing::info!(
                    pool_max_size = config.pool_max_size,
                    "using PostgreSQL board store"
                );
                Ok(Self::Postgres(PostgresBoardStore::new(pool)))
            }
        }
    }

    /// Returns the storage mode backing this store.
    #[must_use]
    pub const fn storage_mode(&self) -> StorageMode {
        match self {
            Self::InMemory(_) => StorageMode::InMemory,
            Self::Postgres(_) => StorageMode::Postgres,
        }
    }
}

fn build_pool(url: &str, max_size: u32) -> Result<BoardPgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(url);
    Pool::builder().max_size(max_size).build(manager)
}

#[async_trait]
impl BoardStore for ConfiguredBoardStore {
    async fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardUnit) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<BoardStoreError> + Send + 'static,
    {
        match self {
            Self::InMemory(store) => store.atomically(work).await,
            Self::Postgres(store) => store.atomically(work).await,
        }
    }

    async fn snapshot<T, E, F>(&self, read: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardReader) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<BoardStoreError> + Send + 'static,
    {
        match self {
            Self::InMemory(store) => store.snapshot(read).await,
            Self::Postgres(store) => store.snapshot(read).await,
        }
    }
}
