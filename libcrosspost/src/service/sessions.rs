//! Login sessions
//!
//! The cookie carries a random token; only its SHA-256 is stored, so a leaked
//! database does not yield usable sessions.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::ConfigError;
use crate::types::{now, UpsertUser, User};
use crate::{Config, Database, Result};

#[derive(Clone)]
pub struct SessionService {
    db: Arc<Database>,
    config: Arc<Config>,
}

impl SessionService {
    pub fn new(db: Arc<Database>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Upsert the user from identity claims and open a session
    ///
    /// Returns the user and the raw token to hand to the client.
    pub async fn login(&self, claims: &UpsertUser) -> Result<(User, String)> {
        let user = self.db.upsert_user(claims).await?;

        let ttl = chrono::Duration::from_std(self.config.auth.session_ttl)
            .map_err(|_| ConfigError::InvalidValue("auth.session_ttl".to_string()))?;
        let token = generate_token();
        self.db
            .create_session(&hash_token(&token), &user.id, &(now() + ttl))
            .await?;

        debug!(user_id = %user.id, "Opened session");
        Ok((user, token))
    }

    /// Resolve a token to its user, if the session is still live
    pub async fn authenticate(&self, token: &str) -> Result<Option<User>> {
        let sid = hash_token(token);
        match self.db.get_session_user(&sid, &now()).await? {
            Some(user_id) => self.db.get_user(&user_id).await,
            None => {
                // Expired rows are dropped on first sight
                self.db.delete_session(&sid).await?;
                Ok(None)
            }
        }
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.db.delete_session(&hash_token(token)).await
    }

    /// Drop every expired session
    pub async fn purge_expired(&self) -> Result<u64> {
        self.db.delete_expired_sessions(&now()).await
    }
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn claims() -> UpsertUser {
        UpsertUser {
            id: "user-1".to_string(),
            email: Some("ada@example.com".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: None,
            profile_image_url: None,
        }
    }

    async fn setup(ttl: Duration) -> SessionService {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let mut config = Config::default();
        config.auth.session_ttl = ttl;
        SessionService::new(db, Arc::new(config))
    }

    #[tokio::test]
    async fn test_login_then_authenticate() {
        let service = setup(Duration::from_secs(3600)).await;
        let (user, token) = service.login(&claims()).await.unwrap();

        assert_eq!(token.len(), 64);
        let found = service.authenticate(&token).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let service = setup(Duration::from_secs(3600)).await;
        assert!(service.authenticate("not-a-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let service = setup(Duration::from_secs(3600)).await;
        let (_, token) = service.login(&claims()).await.unwrap();

        service.logout(&token).await.unwrap();
        assert!(service.authenticate(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_expires() {
        let service = setup(Duration::from_millis(20)).await;
        let (_, token) = service.login(&claims()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(service.authenticate(&token).await.unwrap().is_none());
        assert_eq!(service.purge_expired().await.unwrap(), 0);
    }

    #[test]
    fn test_token_is_stored_hashed() {
        let token = generate_token();
        let hashed = hash_token(&token);
        assert_ne!(hashed, token);
        assert_eq!(hashed, hash_token(&token));
        assert_ne!(generate_token(), token);
    }
}
