//! Service layer for Crosspost
//!
//! Business logic shared by every interface on top of the library. The facade
//! `CrosspostService` owns the shared resources and hands out sub-services:
//!
//! - `PublishingService`: validation, concurrent fan-out, aggregate status
//! - `AccountService`: connected account lifecycle
//! - `HistoryService`: past posts and their results
//! - `SessionService`: login sessions
//!
//! # Example
//!
//! ```no_run
//! use libcrosspost::service::CrosspostService;
//! use libcrosspost::service::publishing::PublishRequest;
//! use libcrosspost::Platform;
//!
//! # async fn example() -> libcrosspost::Result<()> {
//! let service = CrosspostService::new().await?;
//!
//! let request = PublishRequest {
//!     user_id: "user-1".to_string(),
//!     content: "Hello from everywhere".to_string(),
//!     platforms: vec![Platform::LinkedIn, Platform::Twitter],
//!     image: None,
//! };
//!
//! let response = service.publishing().publish(request).await?;
//! println!("{} on {} platforms", response.status, response.results.len());
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod history;
pub mod publishing;
pub mod sessions;

use std::sync::Arc;

use self::accounts::AccountService;
use self::history::HistoryService;
use self::publishing::PublishingService;
use self::sessions::SessionService;
use crate::error::{ConfigError, CrosspostError};
use crate::platforms::PublisherRegistry;
use crate::{Config, Database, Result};

/// Main service facade
///
/// All sub-services share the same `Arc<Database>` and `Arc<Config>`; cloning
/// the facade is cheap.
#[derive(Clone)]
pub struct CrosspostService {
    db: Arc<Database>,
    config: Arc<Config>,
    publishing: PublishingService,
    accounts: AccountService,
    history: HistoryService,
    sessions: SessionService,
}

impl CrosspostService {
    /// Create a service from the default configuration file
    pub async fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config).await
    }

    /// Open the configured database and use simulated publishers
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn from_config(config: Config) -> Result<Self> {
        let db_path = config.database_path();
        let db_path_str = db_path.to_str().ok_or_else(|| {
            CrosspostError::Config(ConfigError::InvalidValue("database.path".to_string()))
        })?;
        let db = Database::new(db_path_str).await?;
        let registry = PublisherRegistry::simulated(config.publishing.delay);

        Ok(Self::with_database(db, config, registry))
    }

    /// Assemble the service from already-built parts
    pub fn with_database(db: Database, config: Config, registry: PublisherRegistry) -> Self {
        let db = Arc::new(db);
        let config = Arc::new(config);

        let publishing = PublishingService::new(Arc::clone(&db), Arc::clone(&config), registry);
        let accounts = AccountService::new(Arc::clone(&db));
        let history = HistoryService::new(Arc::clone(&db));
        let sessions = SessionService::new(Arc::clone(&db), Arc::clone(&config));

        Self {
            db,
            config,
            publishing,
            accounts,
            history,
            sessions,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn publishing(&self) -> &PublishingService {
        &self.publishing
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn history(&self) -> &HistoryService {
        &self.history
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }
}
