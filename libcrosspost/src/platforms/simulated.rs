//! Stand-in publisher used until real platform clients exist

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::sleep;

use super::{PlatformPublisher, PublishedPost};
use crate::error::Result;
use crate::types::{ConnectedAccount, Platform, Post};

/// Waits a fixed delay, then reports success with a synthetic id and URL
#[derive(Debug, Clone)]
pub struct SimulatedPublisher {
    platform: Platform,
    delay: Duration,
}

impl SimulatedPublisher {
    pub fn new(platform: Platform, delay: Duration) -> Self {
        Self { platform, delay }
    }
}

#[async_trait]
impl PlatformPublisher for SimulatedPublisher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn publish(&self, account: &ConnectedAccount, post: &Post) -> Result<PublishedPost> {
        tracing::debug!(
            platform = %self.platform,
            account = %account.account_id,
            post_id = %post.id,
            "Simulating publish"
        );

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let millis = Utc::now().timestamp_millis();
        let name = self.platform.as_str();

        Ok(PublishedPost {
            platform_post_id: format!("{}_{}", name, millis),
            platform_post_url: Some(format!("https://{}.com/post/{}", name, millis)),
        })
    }
}
