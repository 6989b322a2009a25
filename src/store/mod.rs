use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{client::ClientError, config::StorageConfig, error::AppError, models::ShortenedLink};

mod file;
mod memory;
mod remote;
mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed stored data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("remote store error: {0}")]
    Remote(#[from] ClientError),
}

/// Whole-collection persistence. There are no partial writes: `save` always
/// replaces everything previously stored.
#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    async fn load(&self) -> Result<Vec<ShortenedLink>, StoreError>;

    async fn save(&self, links: &[ShortenedLink]) -> Result<(), StoreError>;
}

/// Build the backend selected in the configuration.
pub async fn open(config: &StorageConfig) -> Result<Arc<dyn LinkStore>, StoreError> {
    let store: Arc<dyn LinkStore> = match config {
        StorageConfig::Memory => Arc::new(MemoryStore::new()),
        StorageConfig::File { path } => Arc::new(FileStore::new(path)),
        StorageConfig::Sqlite { database_url } => {
            Arc::new(SqliteStore::connect(database_url).await?)
        }
        StorageConfig::Remote { base_url } => Arc::new(RemoteStore::new(base_url)?),
    };
    Ok(store)
}

/// A store plus the lock that serializes every read-modify-write cycle on it.
/// The Registry and Resolver hold clones of the same `SharedStore`.
#[derive(Clone)]
pub struct SharedStore {
    store: Arc<dyn LinkStore>,
    lock: Arc<Mutex<()>>,
}

impl SharedStore {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn read(&self) -> Result<Vec<ShortenedLink>, AppError> {
        let _guard = self.lock.lock().await;
        Ok(self.store.load().await?)
    }

    /// Load, apply `f`, and persist the result. When `f` fails nothing is
    /// written.
    pub async fn modify<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Vec<ShortenedLink>) -> Result<T, AppError>,
    {
        let (out, _) = self.modify_listed(f).await?;
        Ok(out)
    }

    /// Like `modify`, but also hands back the collection exactly as it was
    /// saved, taken under the same lock.
    pub async fn modify_listed<T, F>(&self, f: F) -> Result<(T, Vec<ShortenedLink>), AppError>
    where
        F: FnOnce(&mut Vec<ShortenedLink>) -> Result<T, AppError>,
    {
        let _guard = self.lock.lock().await;
        let mut links = self.store.load().await?;
        let out = f(&mut links)?;
        self.store.save(&links).await?;
        Ok((out, links))
    }
}
