//! Mock publisher for testing
//!
//! A configurable publisher that can succeed, fail, or stall, and that records
//! every call. Integration tests swap it into a [`super::PublisherRegistry`] to
//! exercise the orchestrator without the simulated delay.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::{PlatformPublisher, PublishedPost};
use crate::error::{PlatformError, Result};
use crate::types::{ConnectedAccount, Platform, Post};

/// Configuration for mock publisher behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub platform: Platform,

    /// Whether publishing should succeed
    pub publish_succeeds: bool,

    /// Error to return on failure
    pub publish_error: Option<String>,

    /// Delay before completing (simulates network latency)
    pub delay: Duration,

    /// Number of times publish has been called
    pub publish_call_count: Arc<AtomicUsize>,

    /// Post contents seen, in call order
    pub published_content: Arc<Mutex<Vec<String>>>,
}

impl MockConfig {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            publish_succeeds: true,
            publish_error: None,
            delay: Duration::from_millis(0),
            publish_call_count: Arc::new(AtomicUsize::new(0)),
            published_content: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

pub struct MockPublisher {
    config: MockConfig,
}

impl MockPublisher {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Always succeeds
    pub fn success(platform: Platform) -> Self {
        Self::new(MockConfig::new(platform))
    }

    /// Always fails with the given message
    pub fn failure(platform: Platform, error: &str) -> Self {
        Self::new(MockConfig {
            publish_succeeds: false,
            publish_error: Some(error.to_string()),
            ..MockConfig::new(platform)
        })
    }

    /// Succeeds after a delay
    pub fn with_delay(platform: Platform, delay: Duration) -> Self {
        Self::new(MockConfig {
            delay,
            ..MockConfig::new(platform)
        })
    }

    pub fn publish_call_count(&self) -> usize {
        self.config.publish_call_count.load(Ordering::SeqCst)
    }

    pub fn published_content(&self) -> Vec<String> {
        self.config
            .published_content
            .lock()
            .map(|content| content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PlatformPublisher for MockPublisher {
    fn platform(&self) -> Platform {
        self.config.platform
    }

    async fn publish(&self, _account: &ConnectedAccount, post: &Post) -> Result<PublishedPost> {
        self.config.publish_call_count.fetch_add(1, Ordering::SeqCst);

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if !self.config.publish_succeeds {
            let message = self
                .config
                .publish_error
                .clone()
                .unwrap_or_else(|| "Mock publishing failed".to_string());
            return Err(PlatformError::Posting(message).into());
        }

        if let Ok(mut content) = self.config.published_content.lock() {
            content.push(post.content.clone());
        }

        let id = format!("{}:mock-{}", self.config.platform, uuid::Uuid::new_v4());
        Ok(PublishedPost {
            platform_post_url: Some(format!("https://mock.invalid/{}", id)),
            platform_post_id: id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrosspostError;
    use crate::types::now;
    use secrecy::SecretString;

    fn account() -> ConnectedAccount {
        ConnectedAccount {
            id: "acc-1".to_string(),
            user_id: "user-1".to_string(),
            platform: Platform::Twitter,
            account_id: "demo".to_string(),
            account_name: None,
            account_profile_url: None,
            access_token: SecretString::from("token".to_string()),
            refresh_token: None,
            token_expires_at: None,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn post() -> Post {
        Post::new("user-1".to_string(), "Hello mock".to_string(), vec![Platform::Twitter])
    }

    #[tokio::test]
    async fn test_mock_success_records_call() {
        let mock = MockPublisher::success(Platform::Twitter);
        let published = mock.publish(&account(), &post()).await.unwrap();

        assert!(published.platform_post_id.starts_with("twitter:mock-"));
        assert_eq!(mock.publish_call_count(), 1);
        assert_eq!(mock.published_content(), vec!["Hello mock".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockPublisher::failure(Platform::Twitter, "Rate limited");
        let result = mock.publish(&account(), &post()).await;

        match result {
            Err(CrosspostError::Platform(PlatformError::Posting(msg))) => {
                assert_eq!(msg, "Rate limited")
            }
            other => panic!("expected posting error, got {:?}", other),
        }
        assert_eq!(mock.publish_call_count(), 1);
        assert!(mock.published_content().is_empty());
    }

    #[tokio::test]
    async fn test_shared_counters_survive_clone() {
        let config = MockConfig::new(Platform::Twitter);
        let counter = config.publish_call_count.clone();
        let mock = MockPublisher::new(config);

        mock.publish(&account(), &post()).await.unwrap();
        mock.publish(&account(), &post()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
