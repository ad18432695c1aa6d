//! Platform publishers
//!
//! Each social network is reached through a [`PlatformPublisher`]. The publish
//! orchestrator never talks to a network directly; it looks the publisher up in
//! a [`PublisherRegistry`] and records whatever comes back.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use libcrosspost::platforms::PublisherRegistry;
//! use libcrosspost::Platform;
//!
//! let registry = PublisherRegistry::simulated(Duration::from_millis(500));
//! let publisher = registry.get(Platform::Twitter).expect("twitter publisher");
//! assert_eq!(publisher.character_limit(), 280);
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ConnectedAccount, Platform, Post};

pub mod mock;
pub mod simulated;

pub use simulated::SimulatedPublisher;

/// Identifiers the platform assigned to a published post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub platform_post_id: String,
    pub platform_post_url: Option<String>,
}

/// Publishing capability for one platform
///
/// Implementations receive the account to post as and the stored post. A
/// returned error is recorded as a failed result for that platform only; it
/// never aborts the other attempts of the same request.
#[async_trait]
pub trait PlatformPublisher: Send + Sync {
    /// Platform this publisher posts to
    fn platform(&self) -> Platform;

    /// Maximum post length in characters
    fn character_limit(&self) -> usize {
        self.platform().character_limit()
    }

    /// Publish the post on behalf of the account
    async fn publish(&self, account: &ConnectedAccount, post: &Post) -> Result<PublishedPost>;
}

/// One publisher per platform
#[derive(Clone, Default)]
pub struct PublisherRegistry {
    publishers: HashMap<Platform, Arc<dyn PlatformPublisher>>,
}

impl PublisherRegistry {
    /// Empty registry; every attempt fails until publishers are added
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated publishers for every supported platform
    pub fn simulated(delay: Duration) -> Self {
        Platform::ALL.iter().fold(Self::new(), |registry, platform| {
            registry.with_publisher(Arc::new(SimulatedPublisher::new(*platform, delay)))
        })
    }

    /// Register a publisher, replacing any previous one for its platform
    pub fn with_publisher(mut self, publisher: Arc<dyn PlatformPublisher>) -> Self {
        self.publishers.insert(publisher.platform(), publisher);
        self
    }

    pub fn get(&self, platform: Platform) -> Option<Arc<dyn PlatformPublisher>> {
        self.publishers.get(&platform).cloned()
    }

    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .iter()
            .copied()
            .filter(|p| self.publishers.contains_key(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock::MockPublisher;

    #[test]
    fn test_simulated_registry_covers_all_platforms() {
        let registry = PublisherRegistry::simulated(Duration::from_millis(0));
        assert_eq!(registry.platforms(), Platform::ALL.to_vec());

        for platform in Platform::ALL {
            let publisher = registry.get(platform).unwrap();
            assert_eq!(publisher.platform(), platform);
            assert_eq!(publisher.character_limit(), platform.character_limit());
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = PublisherRegistry::new();
        assert!(registry.get(Platform::LinkedIn).is_none());
        assert!(registry.platforms().is_empty());
    }

    #[test]
    fn test_with_publisher_replaces_existing() {
        let mock = Arc::new(MockPublisher::failure(Platform::Twitter, "down"));
        let registry = PublisherRegistry::simulated(Duration::from_millis(0)).with_publisher(mock);

        assert_eq!(registry.platforms().len(), 3);
        assert_eq!(registry.get(Platform::Twitter).unwrap().platform(), Platform::Twitter);
    }
}
