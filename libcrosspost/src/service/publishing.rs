//! Publish orchestration
//!
//! Validates a compose request, stores the post, fans out one attempt per
//! platform, and settles the post's aggregate status.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{CrosspostError, PlatformError};
use crate::platforms::PublisherRegistry;
use crate::types::{
    ConnectedAccount, ImageUpload, Platform, Post, PostStatus, PublishingResult,
};
use crate::{Config, Database, Result};

/// Publish orchestrator
#[derive(Clone)]
pub struct PublishingService {
    db: Arc<Database>,
    config: Arc<Config>,
    registry: PublisherRegistry,
}

/// Request to publish content
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub user_id: String,
    pub content: String,
    pub platforms: Vec<Platform>,
    pub image: Option<ImageUpload>,
}

/// Outcome of a publish request
///
/// `results` follows the order platforms were requested in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub post: Post,
    pub results: Vec<PublishingResult>,
    pub status: PostStatus,
}

impl PublishingService {
    pub fn new(db: Arc<Database>, config: Arc<Config>, registry: PublisherRegistry) -> Self {
        Self {
            db,
            config,
            registry,
        }
    }

    /// Publish content to every requested platform
    ///
    /// # Errors
    ///
    /// Returns `Validation` before anything is written when the content is
    /// empty, no platform is selected, a platform's character limit is
    /// exceeded, an account is missing, or the image is unacceptable.
    /// Individual platform failures are not errors; they are recorded as failed
    /// results.
    pub async fn publish(&self, request: PublishRequest) -> Result<PublishResponse> {
        let platforms = self.validate(&request)?;

        let accounts = self.db.list_accounts(&request.user_id).await?;
        let targets = match_accounts(&platforms, accounts)?;

        let image_url = match &request.image {
            Some(image) => {
                self.validate_image(image)?;
                Some(image.to_data_uri())
            }
            None => None,
        };

        let mut post = Post::new(request.user_id, request.content, platforms);
        post.image_url = image_url;
        self.db.create_post(&post).await?;

        info!(post_id = %post.id, platforms = post.platforms.len(), "Publishing post");

        let futures = targets
            .iter()
            .map(|(platform, account)| self.publish_to_platform(&post, *platform, account));
        let results = join_all(futures)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        let status = PostStatus::aggregate(&results);
        let post = self
            .db
            .update_post_status(&post.id, status)
            .await?
            .ok_or_else(|| CrosspostError::NotFound("Post not found".to_string()))?;

        info!(post_id = %post.id, status = %status, "Publish finished");

        Ok(PublishResponse {
            post,
            results,
            status,
        })
    }

    /// Check content and platform selection, returning the deduplicated platforms
    pub fn validate(&self, request: &PublishRequest) -> Result<Vec<Platform>> {
        if request.content.trim().is_empty() {
            return Err(CrosspostError::Validation("Content is required".to_string()));
        }

        let mut platforms: Vec<Platform> = Vec::with_capacity(request.platforms.len());
        for platform in &request.platforms {
            if !platforms.contains(platform) {
                platforms.push(*platform);
            }
        }
        if platforms.is_empty() {
            return Err(CrosspostError::Validation(
                "At least one platform must be selected".to_string(),
            ));
        }

        let length = request.content.chars().count();
        for platform in &platforms {
            let limit = self
                .registry
                .get(*platform)
                .map(|publisher| publisher.character_limit())
                .unwrap_or_else(|| platform.character_limit());

            if length > limit {
                return Err(CrosspostError::Validation(format!(
                    "Content exceeds the {} limit of {} characters (currently {})",
                    platform.label(),
                    limit,
                    length
                )));
            }
        }

        Ok(platforms)
    }

    fn validate_image(&self, image: &ImageUpload) -> Result<()> {
        if !image.is_image() {
            return Err(CrosspostError::Validation(
                "Only image files are allowed".to_string(),
            ));
        }

        let max = self.config.publishing.max_image_bytes;
        if image.len() > max {
            return Err(CrosspostError::Validation(format!(
                "Image exceeds the maximum size of {} bytes",
                max
            )));
        }

        Ok(())
    }

    /// One attempt; always leaves exactly one result row behind
    async fn publish_to_platform(
        &self,
        post: &Post,
        platform: Platform,
        account: &ConnectedAccount,
    ) -> Result<PublishingResult> {
        let result = match self.registry.get(platform) {
            Some(publisher) => match publisher.publish(account, post).await {
                Ok(published) => {
                    info!("Published to {}: {}", platform, published.platform_post_id);
                    PublishingResult::success(
                        &post.id,
                        platform,
                        published.platform_post_id,
                        published.platform_post_url,
                    )
                }
                Err(e) => {
                    warn!("Failed to publish to {}: {}", platform, e);
                    PublishingResult::failure(&post.id, platform, failure_message(e))
                }
            },
            None => {
                let error = PlatformError::NotConfigured(platform.label().to_string());
                warn!("{}", error);
                PublishingResult::failure(&post.id, platform, error.to_string())
            }
        };

        self.db.create_publishing_result(&result).await?;
        Ok(result)
    }
}

/// Pair each platform with the user's active account on it
fn match_accounts(
    platforms: &[Platform],
    accounts: Vec<ConnectedAccount>,
) -> Result<Vec<(Platform, ConnectedAccount)>> {
    let mut active: Vec<ConnectedAccount> = accounts.into_iter().filter(|a| a.is_active).collect();

    platforms
        .iter()
        .map(|platform| {
            let index = active
                .iter()
                .position(|a| a.platform == *platform)
                .ok_or_else(|| {
                    CrosspostError::Validation(format!(
                        "You don't have a connected {} account",
                        platform
                    ))
                })?;
            Ok((*platform, active.swap_remove(index)))
        })
        .collect()
}

fn failure_message(error: CrosspostError) -> String {
    match error {
        CrosspostError::Platform(e) => e.to_string(),
        other => other.to_string(),
    }
}
