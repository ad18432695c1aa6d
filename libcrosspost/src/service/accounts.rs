//! Connected account lifecycle

use std::sync::Arc;

use tracing::info;

use crate::error::CrosspostError;
use crate::types::{AccountUpdate, ConnectedAccount, NewConnectedAccount, Platform};
use crate::{Database, Result};

#[derive(Clone)]
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The user's accounts, newest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<ConnectedAccount>> {
        self.db.list_accounts(user_id).await
    }

    pub async fn create(
        &self,
        user_id: &str,
        account: NewConnectedAccount,
    ) -> Result<ConnectedAccount> {
        if account.account_id.trim().is_empty() {
            return Err(CrosspostError::Validation("accountId is required".to_string()));
        }
        if account.access_token.trim().is_empty() {
            return Err(CrosspostError::Validation("accessToken is required".to_string()));
        }
        if account.is_active {
            self.ensure_no_active(user_id, account.platform, None).await?;
        }

        let created = self.db.create_account(user_id, &account).await?;
        info!(account_id = %created.id, platform = %created.platform, "Connected account");
        Ok(created)
    }

    /// Connect a demo account standing in for a completed OAuth flow
    pub async fn connect_demo(&self, user_id: &str, platform: Platform) -> Result<ConnectedAccount> {
        self.create(user_id, NewConnectedAccount::demo(platform)).await
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        update: AccountUpdate,
    ) -> Result<ConnectedAccount> {
        let account = self.owned(user_id, id).await?;

        if update.is_active == Some(true) && !account.is_active {
            self.ensure_no_active(user_id, account.platform, Some(id)).await?;
        }

        self.db
            .update_account(id, &update)
            .await?
            .ok_or_else(|| CrosspostError::NotFound("Account not found".to_string()))
    }

    /// Remove an account the user owns
    ///
    /// Someone else's account yields `Forbidden` and is left untouched.
    pub async fn disconnect(&self, user_id: &str, id: &str) -> Result<()> {
        self.owned(user_id, id).await?;
        self.db.delete_account(id).await?;
        info!(account_id = %id, "Disconnected account");
        Ok(())
    }

    async fn owned(&self, user_id: &str, id: &str) -> Result<ConnectedAccount> {
        let account = self
            .db
            .get_account(id)
            .await?
            .ok_or_else(|| CrosspostError::NotFound("Account not found".to_string()))?;

        if account.user_id != user_id {
            return Err(CrosspostError::Forbidden("Forbidden".to_string()));
        }
        Ok(account)
    }

    async fn ensure_no_active(
        &self,
        user_id: &str,
        platform: Platform,
        except: Option<&str>,
    ) -> Result<()> {
        let existing = self.db.list_accounts(user_id).await?;
        let taken = existing
            .iter()
            .any(|a| a.platform == platform && a.is_active && Some(a.id.as_str()) != except);

        if taken {
            return Err(CrosspostError::Validation("Account already connected".to_string()));
        }
        Ok(())
    }
}
