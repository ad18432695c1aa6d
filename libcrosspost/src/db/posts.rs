use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{decode_enum, from_millis, to_millis, Database};
use crate::error::{DbError, Result};
use crate::types::{Platform, Post, PostStatus, PublishingResult};

const POST_COLUMNS: &str =
    "id, user_id, content, image_url, platforms, status, published_at, created_at";

const RESULT_COLUMNS: &str = "id, post_id, platform, status, platform_post_id, platform_post_url, \
     error_message, created_at";

fn post_from_row(row: &SqliteRow) -> Result<Post> {
    let platforms_json: String = row.get("platforms");
    let platforms: Vec<Platform> = serde_json::from_str(&platforms_json)
        .map_err(|e| DbError::Decode(format!("platforms: {}", e)))?;
    let status: String = row.get("status");

    Ok(Post {
        id: row.get("id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        platforms,
        status: decode_enum("status", &status)?,
        published_at: from_millis(row.get("published_at"))?,
        created_at: from_millis(row.get("created_at"))?,
    })
}

fn result_from_row(row: &SqliteRow) -> Result<PublishingResult> {
    let platform: String = row.get("platform");
    let status: String = row.get("status");

    Ok(PublishingResult {
        id: row.get("id"),
        post_id: row.get("post_id"),
        platform: decode_enum("platform", &platform)?,
        status: decode_enum("status", &status)?,
        platform_post_id: row.get("platform_post_id"),
        platform_post_url: row.get("platform_post_url"),
        error_message: row.get("error_message"),
        created_at: from_millis(row.get("created_at"))?,
    })
}

impl Database {
    pub async fn create_post(&self, post: &Post) -> Result<()> {
        let platforms_json = serde_json::to_string(&post.platforms)
            .map_err(|e| DbError::Encode(format!("platforms: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, content, image_url, platforms, status, published_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.user_id)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(platforms_json)
        .bind(post.status.as_str())
        .bind(to_millis(&post.published_at))
        .bind(to_millis(&post.created_at))
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Set the aggregate status; `None` if the post does not exist
    pub async fn update_post_status(&self, id: &str, status: PostStatus) -> Result<Option<Post>> {
        let result = sqlx::query("UPDATE posts SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post(id).await
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        row.as_ref().map(post_from_row).transpose()
    }

    /// A user's posts, most recently published first
    pub async fn list_posts(&self, user_id: &str) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE user_id = ? ORDER BY published_at DESC, rowid DESC",
            POST_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        rows.iter().map(post_from_row).collect()
    }

    pub async fn count_posts(&self, user_id: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM posts WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(row.get("count"))
    }

    pub async fn create_publishing_result(&self, result: &PublishingResult) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO publishing_results (
                id, post_id, platform, status, platform_post_id, platform_post_url,
                error_message, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.id)
        .bind(&result.post_id)
        .bind(result.platform.as_str())
        .bind(result.status.as_str())
        .bind(&result.platform_post_id)
        .bind(&result.platform_post_url)
        .bind(&result.error_message)
        .bind(to_millis(&result.created_at))
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Results for one post in the order they were recorded
    pub async fn get_publishing_results(&self, post_id: &str) -> Result<Vec<PublishingResult>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM publishing_results WHERE post_id = ? ORDER BY created_at ASC, rowid ASC",
            RESULT_COLUMNS
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        rows.iter().map(result_from_row).collect()
    }
}
