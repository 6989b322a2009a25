use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{LinkStore, StoreError};
use crate::models::ShortenedLink;

/// Pretty-printed JSON array at a fixed path.
///
/// A missing file loads as an empty collection. Writes go to a sibling
/// `.tmp` file which is then renamed over the target, so a reader never sees
/// a half-written array.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl LinkStore for FileStore {
    async fn load(&self) -> Result<Vec<ShortenedLink>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, links: &[ShortenedLink]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(links)?;
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!("Saved {} link(s) to {}", links.len(), self.path.display());
        Ok(())
    }
}
