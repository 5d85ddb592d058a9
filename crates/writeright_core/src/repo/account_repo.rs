//! Account repository over the `accounts` table.
//!
//! Stores password hashes only; plaintext passwords never reach this layer.

use crate::model::account::Account;
use crate::repo::goal_repo::{parse_uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

/// Stored credential material for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub account: Account,
    /// Argon2id PHC string, salt and cost parameters included.
    pub password_hash: String,
}

/// Outcome of an insert that may collide on the unique email column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertAccountOutcome {
    Created,
    EmailTaken,
}

pub trait AccountRepository {
    fn insert_account(&self, credential: &StoredCredential) -> RepoResult<InsertAccountOutcome>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<StoredCredential>>;
}

pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn insert_account(&self, credential: &StoredCredential) -> RepoResult<InsertAccountOutcome> {
        let result = self.conn.execute(
            "INSERT INTO accounts (user_id, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                credential.account.user_id.to_string(),
                credential.account.email.as_str(),
                credential.password_hash.as_str(),
                credential.account.created_at,
            ],
        );

        match result {
            Ok(_) => Ok(InsertAccountOutcome::Created),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Ok(InsertAccountOutcome::EmailTaken)
            }
            Err(err) => Err(RepoError::from(err)),
        }
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<StoredCredential>> {
        let row = self
            .conn
            .query_row(
                "SELECT user_id, email, password_hash, created_at
                 FROM accounts
                 WHERE email = ?1;",
                [email],
                |row| Ok(read_credential_row(row)),
            )
            .optional()?;

        row.transpose()
    }
}

fn read_credential_row(row: &Row<'_>) -> RepoResult<StoredCredential> {
    Ok(StoredCredential {
        account: Account {
            user_id: parse_uuid_column(row, "user_id")?,
            email: row.get("email")?,
            created_at: row.get("created_at")?,
        },
        password_hash: row.get("password_hash")?,
    })
}
