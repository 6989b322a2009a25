use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{LinkStore, StoreError};
use crate::models::ShortenedLink;

/// Volatile store; the collection is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    links: RwLock<Vec<ShortenedLink>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn load(&self) -> Result<Vec<ShortenedLink>, StoreError> {
        Ok(self.links.read().await.clone())
    }

    async fn save(&self, links: &[ShortenedLink]) -> Result<(), StoreError> {
        *self.links.write().await = links.to_vec();
        Ok(())
    }
}
