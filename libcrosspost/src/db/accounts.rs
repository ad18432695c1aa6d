use secrecy::SecretString;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{decode_enum, from_millis, to_millis, Database};
use crate::error::{CrosspostError, DbError, Result};
use crate::types::{now, AccountUpdate, ConnectedAccount, NewConnectedAccount};

const ACCOUNT_COLUMNS: &str = "id, user_id, platform, account_id, account_name, account_profile_url, \
     access_token, refresh_token, token_expires_at, is_active, created_at, updated_at";

fn account_from_row(row: &SqliteRow) -> Result<ConnectedAccount> {
    let platform: String = row.get("platform");
    let access_token: String = row.get("access_token");
    let refresh_token: Option<String> = row.get("refresh_token");
    let token_expires_at: Option<i64> = row.get("token_expires_at");

    Ok(ConnectedAccount {
        id: row.get("id"),
        user_id: row.get("user_id"),
        platform: decode_enum("platform", &platform)?,
        account_id: row.get("account_id"),
        account_name: row.get("account_name"),
        account_profile_url: row.get("account_profile_url"),
        access_token: SecretString::from(access_token),
        refresh_token: refresh_token.map(SecretString::from),
        token_expires_at: token_expires_at.map(from_millis).transpose()?,
        is_active: row.get("is_active"),
        created_at: from_millis(row.get("created_at"))?,
        updated_at: from_millis(row.get("updated_at"))?,
    })
}

/// Unique index violations mean a second active account for the platform
fn map_account_write_error(err: sqlx::Error) -> CrosspostError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            CrosspostError::Validation("Account already connected".to_string())
        }
        _ => DbError::SqlxError(err).into(),
    }
}

impl Database {
    /// All accounts of a user, newest first
    pub async fn list_accounts(&self, user_id: &str) -> Result<Vec<ConnectedAccount>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM connected_accounts WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            ACCOUNT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        rows.iter().map(account_from_row).collect()
    }

    pub async fn get_account(&self, id: &str) -> Result<Option<ConnectedAccount>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM connected_accounts WHERE id = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        row.as_ref().map(account_from_row).transpose()
    }

    pub async fn create_account(
        &self,
        user_id: &str,
        account: &NewConnectedAccount,
    ) -> Result<ConnectedAccount> {
        let id = Uuid::new_v4().to_string();
        let now = to_millis(&now());

        sqlx::query(
            r#"
            INSERT INTO connected_accounts (
                id, user_id, platform, account_id, account_name, account_profile_url,
                access_token, refresh_token, token_expires_at, is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(account.platform.as_str())
        .bind(&account.account_id)
        .bind(&account.account_name)
        .bind(&account.account_profile_url)
        .bind(&account.access_token)
        .bind(&account.refresh_token)
        .bind(account.token_expires_at.as_ref().map(to_millis))
        .bind(account.is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_account_write_error)?;

        self.get_account(&id)
            .await?
            .ok_or_else(|| DbError::Decode(format!("account {} vanished after insert", id)).into())
    }

    /// Apply a partial update; `None` if the account does not exist
    pub async fn update_account(
        &self,
        id: &str,
        update: &AccountUpdate,
    ) -> Result<Option<ConnectedAccount>> {
        let result = sqlx::query(
            r#"
            UPDATE connected_accounts
            SET account_name = COALESCE(?, account_name),
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.account_name)
        .bind(update.is_active)
        .bind(to_millis(&now()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_account_write_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_account(id).await
    }

    /// Hard delete; returns whether a row was removed
    pub async fn delete_account(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM connected_accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Platform, UpsertUser};
    use secrecy::ExposeSecret;

    async fn setup() -> Database {
        let db = Database::in_memory().await.unwrap();
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
        db
    }

    #[tokio::test]
    async fn test_create_and_get_account() {
        let db = setup().await;
        let created = db
            .create_account("user-1", &NewConnectedAccount::demo(Platform::Twitter))
            .await
            .unwrap();

        let fetched = db.get_account(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.user_id, "user-1");
        assert_eq!(fetched.platform, Platform::Twitter);
        assert!(fetched.is_active);
        assert!(fetched.access_token.expose_secret().starts_with("demo_token_twitter_"));
    }

    #[tokio::test]
    async fn test_list_accounts_scoped_to_user() {
        let db = setup().await;
        db.create_account("user-1", &NewConnectedAccount::demo(Platform::Twitter))
            .await
            .unwrap();
        db.create_account("user-1", &NewConnectedAccount::demo(Platform::LinkedIn))
            .await
            .unwrap();
        db.create_account("user-2", &NewConnectedAccount::demo(Platform::Facebook))
            .await
            .unwrap();

        let accounts = db.list_accounts("user-1").await.unwrap();
        assert_eq!(accounts.len(), 2);
        // Newest first
        assert_eq!(accounts[0].platform, Platform::LinkedIn);
        assert_eq!(accounts[1].platform, Platform::Twitter);
    }

    #[tokio::test]
    async fn test_second_active_account_violates_index() {
        let db = setup().await;
        db.create_account("user-1", &NewConnectedAccount::demo(Platform::Facebook))
            .await
            .unwrap();

        let result = db
            .create_account("user-1", &NewConnectedAccount::demo(Platform::Facebook))
            .await;
        assert!(matches!(result, Err(CrosspostError::Validation(_))));

        // Inactive duplicates are fine
        let mut inactive = NewConnectedAccount::demo(Platform::Facebook);
        inactive.is_active = false;
        assert!(db.create_account("user-1", &inactive).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_account() {
        let db = setup().await;
        let created = db
            .create_account("user-1", &NewConnectedAccount::demo(Platform::LinkedIn))
            .await
            .unwrap();

        let updated = db
            .update_account(
                &created.id,
                &AccountUpdate {
                    account_name: Some("Work profile".to_string()),
                    is_active: Some(false),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.account_name.as_deref(), Some("Work profile"));
        assert!(!updated.is_active);

        // Omitted fields are left alone
        let renamed_only = db
            .update_account(&created.id, &AccountUpdate::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed_only.account_name.as_deref(), Some("Work profile"));
    }

    #[tokio::test]
    async fn test_update_missing_account() {
        let db = setup().await;
        let result = db.update_account("missing", &AccountUpdate::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_account() {
        let db = setup().await;
        let created = db
            .create_account("user-1", &NewConnectedAccount::demo(Platform::Twitter))
            .await
            .unwrap();

        assert!(db.delete_account(&created.id).await.unwrap());
        assert!(!db.delete_account(&created.id).await.unwrap());
        assert!(db.get_account(&created.id).await.unwrap().is_none());
    }
}
