use chrono::{DateTime, Utc};
use sqlx::Row;

use super::{to_millis, Database};
use crate::error::{DbError, Result};

impl Database {
    pub async fn create_session(
        &self,
        sid: &str,
        user_id: &str,
        expire: &DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("INSERT INTO sessions (sid, user_id, expire) VALUES (?, ?, ?)")
            .bind(sid)
            .bind(user_id)
            .bind(to_millis(expire))
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// User id behind a session that has not expired at `now`
    pub async fn get_session_user(&self, sid: &str, now: &DateTime<Utc>) -> Result<Option<String>> {
        let row = sqlx::query("SELECT user_id FROM sessions WHERE sid = ? AND expire > ?")
            .bind(sid)
            .bind(to_millis(now))
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(row.map(|r| r.get("user_id")))
    }

    pub async fn delete_session(&self, sid: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE sid = ?")
            .bind(sid)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Remove every session expired at `now`, returning how many went
    pub async fn delete_expired_sessions(&self, now: &DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expire <= ?")
            .bind(to_millis(now))
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(result.rows_affected())
    }
}
