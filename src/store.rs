//! Manual record store
//!
//! SQLite-backed table of spreadsheet-sourced video rows. The upload path
//! replaces the entire table in one transaction; the combined search reads
//! it back. Nothing else touches this table.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// A spreadsheet-sourced row as persisted.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ManualVideo {
    pub id: i64,
    pub title: String,
    pub channel: String,
    pub published: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub url: String,
    pub keywords: String,
}

/// Field values for a row about to be inserted (the id is assigned by the
/// database).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewManualVideo {
    pub title: String,
    pub channel: String,
    pub published: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub url: String,
    pub keywords: String,
}

#[derive(Clone)]
pub struct ManualStore {
    pool: SqlitePool,
}

impl ManualStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS manual_videos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL DEFAULT '',
                channel TEXT NOT NULL DEFAULT '',
                published TEXT NOT NULL DEFAULT '0000-00-00',
                views INTEGER NOT NULL DEFAULT 0,
                likes INTEGER NOT NULL DEFAULT 0,
                comments INTEGER NOT NULL DEFAULT 0,
                url TEXT NOT NULL DEFAULT '',
                keywords TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace every stored row with the new batch. Delete and insert run
    /// in one transaction, so readers never observe stale and new rows
    /// mixed, and a failed insert rolls back to the previous upload.
    pub async fn replace_all(&self, rows: &[NewManualVideo]) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM manual_videos")
            .execute(&mut *tx)
            .await?;

        for row in rows {
            sqlx::query(
                "INSERT INTO manual_videos \
                 (title, channel, published, views, likes, comments, url, keywords) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&row.title)
            .bind(&row.channel)
            .bind(&row.published)
            .bind(row.views)
            .bind(row.likes)
            .bind(row.comments)
            .bind(&row.url)
            .bind(&row.keywords)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Replaced manual records: {} rows", rows.len());
        Ok(rows.len())
    }

    pub async fn list_all(&self) -> Result<Vec<ManualVideo>, sqlx::Error> {
        sqlx::query_as::<_, ManualVideo>(
            "SELECT id, title, channel, published, views, likes, comments, url, keywords \
             FROM manual_videos ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// In-memory store for tests. A single connection, because every
    /// `sqlite::memory:` connection gets its own database.
    #[cfg(test)]
    pub(crate) async fn connect_in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }
}
