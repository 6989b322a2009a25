use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use super::{LinkStore, StoreError};
use crate::models::ShortenedLink;

/// SQLite-backed store. Each `save` rewrites the `links` table inside one
/// transaction.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating the file if needed) and apply the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(
                database_url
                    .parse::<SqliteConnectOptions>()?
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal),
            )
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
        Ok(Self { pool })
    }
}

#[async_trait]
impl LinkStore for SqliteStore {
    async fn load(&self) -> Result<Vec<ShortenedLink>, StoreError> {
        let links: Vec<ShortenedLink> = sqlx::query_as(
            "SELECT short_id, original_url, short_url, username, password,
                    created_at, total_clicks, last_clicked_at
             FROM links ORDER BY position ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn save(&self, links: &[ShortenedLink]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM links").execute(&mut *tx).await?;

        for (position, link) in links.iter().enumerate() {
            sqlx::query(
                "INSERT INTO links
                     (short_id, original_url, short_url, username, password,
                      created_at, total_clicks, last_clicked_at, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .bind(&link.short_id)
            .bind(&link.original_url)
            .bind(&link.short_url)
            .bind(link.username.as_deref())
            .bind(link.password.as_deref())
            .bind(link.created_at)
            .bind(link.total_clicks)
            .bind(link.last_clicked_at)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
