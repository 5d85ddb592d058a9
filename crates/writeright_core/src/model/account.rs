//! Account and session records.

use serde::{Deserialize, Serialize};

use super::goal::UserId;

/// Registered account, without credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub user_id: UserId,
    /// Trimmed, lowercased email. Unique across accounts.
    pub email: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Active signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
}

impl From<&Account> for Session {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.user_id,
            email: account.email.clone(),
        }
    }
}

/// Normalizes email input for storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
