//! Per-user key/value settings.
//!
//! The only structured settings are the default GL accounts used when
//! invoices are booked.

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, UserId};
use uuid::Uuid;

use crate::entities::{accounts, settings};

/// Setting key of the accounts receivable account.
pub const AR_KEY: &str = "ar_account_id";
/// Setting key of the accounts payable account.
pub const AP_KEY: &str = "ap_account_id";

/// Error types for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Referenced account does not exist.
    #[error("The selected {key} is invalid")]
    AccountNotFound {
        /// Setting being written.
        key: &'static str,
        /// Account that was not found.
        account_id: AccountId,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Default GL accounts of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlAccounts {
    /// Accounts receivable.
    pub ar_account_id: Option<AccountId>,
    /// Accounts payable.
    pub ap_account_id: Option<AccountId>,
}

/// Settings repository.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    db: DatabaseConnection,
}

impl SettingsRepository {
    /// Creates a new settings repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All settings of a user, by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn all(&self, user_id: UserId) -> Result<BTreeMap<String, Option<String>>, SettingsError> {
        let rows = settings::Entity::find()
            .filter(settings::Column::UserId.eq(user_id.into_inner()))
            .order_by_asc(settings::Column::Key)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    /// The user's default GL accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn gl_accounts(&self, user_id: UserId) -> Result<GlAccounts, SettingsError> {
        Ok(GlAccounts {
            ar_account_id: account_setting(&self.db, user_id, AR_KEY).await?,
            ap_account_id: account_setting(&self.db, user_id, AP_KEY).await?,
        })
    }

    /// Stores the user's default GL accounts. Every given account must exist.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account; nothing is written then.
    pub async fn set_gl_accounts(
        &self,
        user_id: UserId,
        input: GlAccounts,
    ) -> Result<GlAccounts, SettingsError> {
        let txn = self.db.begin().await?;

        for (key, account_id) in [(AR_KEY, input.ar_account_id), (AP_KEY, input.ap_account_id)] {
            if let Some(account_id) = account_id {
                let exists = accounts::Entity::find_by_id(account_id.into_inner())
                    .count(&txn)
                    .await?
                    > 0;
                if !exists {
                    return Err(SettingsError::AccountNotFound { key, account_id });
                }
            }
            upsert(&txn, user_id, key, account_id.map(|id| id.to_string())).await?;
        }

        txn.commit().await?;
        Ok(input)
    }
}

/// Reads a setting holding an account id. Unparseable values read as unset.
pub(crate) async fn account_setting<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    key: &str,
) -> Result<Option<AccountId>, DbErr> {
    let row = settings::Entity::find()
        .filter(settings::Column::UserId.eq(user_id.into_inner()))
        .filter(settings::Column::Key.eq(key))
        .one(conn)
        .await?;
    Ok(row.and_then(|r| r.value).and_then(|v| v.parse().ok()))
}

async fn upsert<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    key: &str,
    value: Option<String>,
) -> Result<(), DbErr> {
    let now = Utc::now().into();
    let existing = settings::Entity::find()
        .filter(settings::Column::UserId.eq(user_id.into_inner()))
        .filter(settings::Column::Key.eq(key))
        .one(conn)
        .await?;

    match existing {
        Some(row) => {
            let mut active: settings::ActiveModel = row.into();
            active.value = Set(value);
            active.updated_at = Set(now);
            active.update(conn).await?;
        }
        None => {
            settings::ActiveModel {
                id: Set(Uuid::now_v7()),
                user_id: Set(user_id.into_inner()),
                key: Set(key.to_string()),
                value: Set(value),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gl_accounts_json_shape() {
        let ar = AccountId::new();
        let json = serde_json::to_value(GlAccounts {
            ar_account_id: Some(ar),
            ap_account_id: None,
        })
        .unwrap();
        assert_eq!(json["ar_account_id"], ar.to_string());
        assert!(json["ap_account_id"].is_null());
    }

    #[test]
    fn test_error_names_the_key() {
        let err = SettingsError::AccountNotFound {
            key: AR_KEY,
            account_id: AccountId::new(),
        };
        assert_eq!(err.to_string(), "The selected ar_account_id is invalid");
    }
}
