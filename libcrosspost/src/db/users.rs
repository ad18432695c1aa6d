use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{from_millis, to_millis, Database};
use crate::error::{DbError, Result};
use crate::types::{now, UpsertUser, User};

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        profile_image_url: row.get("profile_image_url"),
        created_at: from_millis(row.get("created_at"))?,
        updated_at: from_millis(row.get("updated_at"))?,
    })
}

impl Database {
    /// Insert the user or refresh their profile fields
    pub async fn upsert_user(&self, user: &UpsertUser) -> Result<User> {
        let now = to_millis(&now());

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, profile_image_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                profile_image_url = excluded.profile_image_url,
                updated_at = excluded.updated_at
            RETURNING id, email, first_name, last_name, profile_image_url, created_at, updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.profile_image_url)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        user_from_row(&row)
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, first_name, last_name, profile_image_url, created_at, updated_at
            FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        row.as_ref().map(user_from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(id: &str, email: &str) -> UpsertUser {
        UpsertUser {
            id: id.to_string(),
            email: Some(email.to_string()),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            profile_image_url: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let db = Database::in_memory().await.unwrap();

        let created = db.upsert_user(&claims("user-1", "ada@example.com")).await.unwrap();
        assert_eq!(created.email.as_deref(), Some("ada@example.com"));

        let mut changed = claims("user-1", "ada@newmail.example");
        changed.first_name = Some("Augusta".to_string());
        let updated = db.upsert_user(&changed).await.unwrap();

        assert_eq!(updated.id, "user-1");
        assert_eq!(updated.first_name.as_deref(), Some("Augusta"));
        assert_eq!(updated.email.as_deref(), Some("ada@newmail.example"));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_get_user_missing() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.get_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let db = Database::in_memory().await.unwrap();
        db.upsert_user(&claims("user-1", "same@example.com")).await.unwrap();

        let result = db.upsert_user(&claims("user-2", "same@example.com")).await;
        assert!(result.is_err());
    }
}
