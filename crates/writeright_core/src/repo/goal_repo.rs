//! Goal repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/update/delete and owner-filtered listing over `goals`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Goal::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `user_id` and `created_at` are never rewritten by updates.
//! - Every goal is owned by an existing account.

use crate::db::DbError;
use crate::model::goal::{now_epoch_ms, Goal, GoalId, GoalValidationError, UserId};
use rusqlite::{ffi, params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    word_goal,
    progress,
    created_at,
    updated_at
FROM goals";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for goal and account persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(GoalValidationError),
    Db(DbError),
    NotFound(GoalId),
    /// No account exists for the goal's `user_id`.
    UnknownOwner(UserId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "goal not found: {id}"),
            Self::UnknownOwner(id) => write!(f, "no account for user id {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::UnknownOwner(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<GoalValidationError> for RepoError {
    fn from(value: GoalValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Document-store style CRUD over goals.
pub trait GoalRepository {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId>;
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>>;
    /// Overwrites title, word goal and progress. Returns the stored record.
    fn update_goal(&self, goal: &Goal) -> RepoResult<Goal>;
    fn delete_goal(&self, id: GoalId) -> RepoResult<()>;
    /// Lists one owner's goals ordered by `created_at ASC, id ASC`.
    fn list_goals_for_user(&self, user_id: UserId) -> RepoResult<Vec<Goal>>;
}

/// SQLite-backed goal repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId> {
        goal.validate()?;

        let result = self.conn.execute(
            "INSERT INTO goals (
                id,
                user_id,
                title,
                word_goal,
                progress,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                goal.id.to_string(),
                goal.user_id.to_string(),
                goal.title.as_str(),
                goal.word_goal,
                goal.progress,
                goal.created_at,
                goal.updated_at,
            ],
        );

        match result {
            Ok(_) => Ok(goal.id),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Err(RepoError::UnknownOwner(goal.user_id))
            }
            Err(err) => Err(RepoError::from(err)),
        }
    }

    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_goal_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_goal(&self, goal: &Goal) -> RepoResult<Goal> {
        goal.validate()?;

        let changed = self.conn.execute(
            "UPDATE goals
             SET
                title = ?1,
                word_goal = ?2,
                progress = ?3,
                updated_at = ?4
             WHERE id = ?5;",
            params![
                goal.title.as_str(),
                goal.word_goal,
                goal.progress,
                now_epoch_ms().max(goal.updated_at),
                goal.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(goal.id));
        }

        self.get_goal(goal.id)?.ok_or(RepoError::NotFound(goal.id))
    }

    fn delete_goal(&self, id: GoalId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_goals_for_user(&self, user_id: UserId) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let id = parse_uuid_column(row, "id")?;
    let user_id = parse_uuid_column(row, "user_id")?;
    let word_goal = parse_count_column(row, "word_goal")?;
    let progress = parse_count_column(row, "progress")?;

    let goal = Goal {
        id,
        title: row.get("title")?,
        word_goal,
        progress,
        user_id,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    if goal.word_goal == 0 || goal.progress > goal.word_goal {
        return Err(RepoError::InvalidData(format!(
            "goal {} has progress {} outside word goal {}",
            goal.id, goal.progress, goal.word_goal
        )));
    }
    Ok(goal)
}

pub(crate) fn parse_uuid_column(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {column}")))
}

fn parse_count_column(row: &Row<'_>, column: &str) -> RepoResult<u32> {
    let value: i64 = row.get(column)?;
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid count `{value}` in goals.{column}")))
}
