//! Database operations for Crosspost
//!
//! A thin layer over SQLite. Each table family lives in its own submodule as an
//! `impl Database` block; all of them share one connection pool.

mod accounts;
mod posts;
mod sessions;
mod users;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::error::{DbError, Result};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file and run migrations
    pub async fn new(db_path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(DbError::IoError)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(DbError::SqlxError)?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database, used by tests and throwaway runs
    ///
    /// Every SQLite memory connection is its own database, so the pool is pinned
    /// to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let options = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()
            .map_err(DbError::SqlxError)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(DbError::SqlxError)?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(DbError::MigrationError)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

pub(crate) fn to_millis(at: &DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| DbError::Decode(format!("timestamp out of range: {}", millis)).into())
}

pub(crate) fn decode_enum<T>(column: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse::<T>()
        .map_err(|e| DbError::Decode(format!("{}: {}", column, e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrosspostError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_new_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("dir").join("crosspost.db");

        let db = Database::new(db_path.to_str().unwrap()).await;
        assert!(db.is_ok());
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_reopen_runs_migrations_idempotently() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("crosspost.db");
        let path = db_path.to_str().unwrap();

        Database::new(path).await.unwrap();
        assert!(Database::new(path).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_path_is_database_error() {
        #[cfg(unix)]
        let invalid_path = "/proc/crosspost-cannot-create/test.db";

        #[cfg(windows)]
        let invalid_path = "C:\\invalid<>path\\test.db";

        let result = Database::new(invalid_path).await;
        assert!(matches!(result, Err(CrosspostError::Database(_))));
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let db = Database::in_memory().await.unwrap();

        let result = sqlx::query(
            "INSERT INTO sessions (sid, user_id, expire) VALUES ('sid', 'no-such-user', 0)",
        )
        .execute(db.pool())
        .await;

        assert!(result.is_err(), "orphan session should violate the foreign key");
    }

    #[test]
    fn test_millis_round_trip() {
        let at = from_millis(1_700_000_000_123).unwrap();
        assert_eq!(to_millis(&at), 1_700_000_000_123);
    }
}
