use anyhow::{Context, Result};
use std::path::PathBuf;

/// Which backend holds the link collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Process memory, reset on restart.
    Memory,
    /// Pretty-printed JSON array on disk.
    File { path: PathBuf },
    /// SQLite connection string, e.g. "sqlite:./shortly.db"
    Sqlite { database_url: String },
    /// Another instance's `/urls` API.
    Remote { base_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public origin used when generating short URLs, e.g. "https://sho.rt".
    /// Never has a trailing slash. When unset the origin is taken from the
    /// request's Host header.
    pub base_url: Option<String>,

    pub storage: StorageConfig,

    /// Where "/" redirects to. When unset "/" answers with the service name.
    pub root_redirect_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Empty values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let port = var("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let storage = match var("STORAGE").as_deref().unwrap_or("file") {
            "memory" => StorageConfig::Memory,
            "file" => StorageConfig::File {
                path: var("STORAGE_PATH")
                    .unwrap_or_else(|| "./urls.json".into())
                    .into(),
            },
            "sqlite" => StorageConfig::Sqlite {
                database_url: var("DATABASE_URL")
                    .unwrap_or_else(|| "sqlite:./shortly.db".into()),
            },
            "remote" => StorageConfig::Remote {
                base_url: var("REMOTE_URL")
                    .context("REMOTE_URL must be set when STORAGE=remote")?
                    .trim_end_matches('/')
                    .to_owned(),
            },
            other => anyhow::bail!(
                "STORAGE must be one of memory, file, sqlite, remote (got '{other}')"
            ),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            base_url: var("BASE_URL").map(|u| u.trim_end_matches('/').to_owned()),
            storage,
            root_redirect_url: var("ROOT_REDIRECT_URL"),
        })
    }

    /// Origin used when neither BASE_URL nor a Host header is available.
    pub fn fallback_origin(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            base_url: None,
            storage: StorageConfig::Memory,
            root_redirect_url: None,
        }
    }
}
