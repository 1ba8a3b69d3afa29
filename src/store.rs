//! Document store for catalog records.
//!
//! [`CatalogStore`] is the only persistence contract the rest of the crate
//! sees: append a record, list every record in insertion order. The default
//! implementation keeps each record as a JSON document in SQLite, so the
//! persisted shape is exactly the serde shape of [`CatalogRecord`].
//!
//! Migrations are embedded at compile time with `sqlx::migrate!` and run on
//! [`SqliteCatalogStore::connect`]. Queries use the runtime-checked
//! `sqlx::query` form, so no `DATABASE_URL` is needed to build.

use crate::error::CatalogError;
use crate::record::CatalogRecord;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

/// Append-only collection of catalog records.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist one record.
    async fn insert_one(&self, record: &CatalogRecord) -> Result<(), CatalogError>;

    /// Every stored record, oldest first.
    async fn find_all(&self) -> Result<Vec<CatalogRecord>, CatalogError>;
}

/// SQLite-backed [`CatalogStore`].
#[derive(Clone, Debug)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// `url` is a sqlx SQLite URL such as `sqlite://catalog.db` or
    /// `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self, CatalogError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = pool_options(url).connect_with(options).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| CatalogError::Store(e.into()))?;

        info!("Catalog store ready at {}", url);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Pool settings for `url`.
///
/// An in-memory database lives and dies with its connection, so it gets
/// exactly one connection that is never reaped for idleness or age.
fn pool_options(url: &str) -> SqlitePoolOptions {
    if url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn insert_one(&self, record: &CatalogRecord) -> Result<(), CatalogError> {
        let document = serde_json::to_string(record)?;
        sqlx::query("INSERT INTO catalog_entries (document, created_at) VALUES (?1, ?2)")
            .bind(&document)
            .bind(record.timestamp.to_rfc3339())
            .execute(&self.pool)
            .await?;
        debug!("Stored catalog entry for {}", record.filename);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT document FROM catalog_entries ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(document,)| serde_json::from_str(&document).map_err(CatalogError::from))
            .collect()
    }
}
