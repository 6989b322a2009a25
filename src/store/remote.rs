use async_trait::async_trait;

use super::{LinkStore, StoreError};
use crate::{client::UrlsClient, models::ShortenedLink};

/// Keeps the collection on another instance, reading and writing it whole
/// through that instance's `/urls` endpoint.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: UrlsClient,
}

impl RemoteStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: UrlsClient::new(base_url)?,
        })
    }
}

#[async_trait]
impl LinkStore for RemoteStore {
    async fn load(&self) -> Result<Vec<ShortenedLink>, StoreError> {
        Ok(self.client.list().await?)
    }

    async fn save(&self, links: &[ShortenedLink]) -> Result<(), StoreError> {
        self.client.replace_all(links).await?;
        tracing::debug!(
            "Pushed {} link(s) to {}",
            links.len(),
            self.client.base_url()
        );
        Ok(())
    }
}
