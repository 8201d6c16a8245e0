//! Account model for gallery administrators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A person who may administer the gallery. Accounts are created at
/// initialization and never mutated or deleted in normal operation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    /// Argon2id hash in PHC string format. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Public account info returned by auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            is_admin: account.is_admin,
        }
    }
}
