//! History service for querying published posts

use std::sync::Arc;

use crate::error::CrosspostError;
use crate::types::{Post, PostWithResults};
use crate::{Database, Result};

#[derive(Clone)]
pub struct HistoryService {
    db: Arc<Database>,
}

impl HistoryService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All of a user's posts, most recently published first
    pub async fn list_posts(&self, user_id: &str) -> Result<Vec<Post>> {
        self.db.list_posts(user_id).await
    }

    /// A single post with its per-platform results
    pub async fn get_post(&self, user_id: &str, post_id: &str) -> Result<PostWithResults> {
        let post = self
            .db
            .get_post(post_id)
            .await?
            .ok_or_else(|| CrosspostError::NotFound("Post not found".to_string()))?;

        if post.user_id != user_id {
            return Err(CrosspostError::Forbidden("Forbidden".to_string()));
        }

        let results = self.db.get_publishing_results(&post.id).await?;
        Ok(PostWithResults { post, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Platform, PublishingResult, UpsertUser};

    async fn setup() -> (HistoryService, Arc<Database>) {
        let db = Arc::new(Database::in_memory().await.unwrap());
        for id in ["user-1", "user-2"] {
            db.upsert_user(&UpsertUser {
                id: id.to_string(),
                email: None,
                first_name: None,
                last_name: None,
                profile_image_url: None,
            })
            .await
            .unwrap();
        }
        (HistoryService::new(db.clone()), db)
    }

    #[tokio::test]
    async fn test_get_post_with_results() {
        let (service, db) = setup().await;
        let post = Post::new("user-1".to_string(), "Hi".to_string(), vec![Platform::Twitter]);
        db.create_post(&post).await.unwrap();
        db.create_publishing_result(&PublishingResult::success(
            &post.id,
            Platform::Twitter,
            "twitter_1".to_string(),
            None,
        ))
        .await
        .unwrap();

        let found = service.get_post("user-1", &post.id).await.unwrap();
        assert_eq!(found.post.id, post.id);
        assert_eq!(found.results.len(), 1);
    }

    #[tokio::test]
    async fn test_get_post_ownership() {
        let (service, db) = setup().await;
        let post = Post::new("user-1".to_string(), "Hi".to_string(), vec![Platform::Twitter]);
        db.create_post(&post).await.unwrap();

        assert!(matches!(
            service.get_post("user-2", &post.id).await,
            Err(CrosspostError::Forbidden(_))
        ));
        assert!(matches!(
            service.get_post("user-1", "missing").await,
            Err(CrosspostError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_posts_only_own() {
        let (service, db) = setup().await;
        db.create_post(&Post::new("user-1".to_string(), "mine".to_string(), vec![Platform::Facebook]))
            .await
            .unwrap();
        db.create_post(&Post::new("user-2".to_string(), "theirs".to_string(), vec![Platform::Facebook]))
            .await
            .unwrap();

        let posts = service.list_posts("user-1").await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].content, "mine");
    }
}
