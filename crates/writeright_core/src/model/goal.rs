//! Goal domain model.
//!
//! # Responsibility
//! - Define the writing-goal record owned by one account.
//! - Validate the progress/target invariant before any write.
//!
//! # Invariants
//! - `id` is stable and never reused for another goal.
//! - `user_id` and `created_at` never change after creation.
//! - `word_goal > 0` and `progress <= word_goal`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one goal.
pub type GoalId = Uuid;

/// Stable identifier for one account.
pub type UserId = Uuid;

/// Title shown for records whose stored title is blank.
pub const UNTITLED_GOAL: &str = "Untitled Goal";

/// Validation failures for goal writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    EmptyTitle,
    NonPositiveWordGoal,
    ProgressExceedsGoal { progress: u32, word_goal: u32 },
    InvalidWordGoal(String),
}

impl Display for GoalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "goal title cannot be empty"),
            Self::NonPositiveWordGoal => write!(f, "word goal must be a positive number"),
            Self::ProgressExceedsGoal {
                progress,
                word_goal,
            } => write!(
                f,
                "progress {progress} cannot exceed word goal {word_goal}"
            ),
            Self::InvalidWordGoal(raw) => write!(f, "word goal `{raw}` is not a number"),
        }
    }
}

impl Error for GoalValidationError {}

/// A user's writing task with a target word count and accumulated progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    pub word_goal: u32,
    /// Words credited so far. Never above `word_goal`.
    pub progress: u32,
    pub user_id: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed by storage on every write.
    pub updated_at: i64,
}

impl Goal {
    /// Creates a fresh goal with zero progress and a generated id.
    ///
    /// The title is trimmed. Call [`Goal::validate`] before persisting.
    pub fn new(user_id: UserId, title: impl Into<String>, word_goal: u32) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            title: title.into().trim().to_string(),
            word_goal,
            progress: 0,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks the write-time invariants.
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        validate_fields(&self.title, self.progress, self.word_goal)
    }

    pub fn is_completed(&self) -> bool {
        self.word_goal > 0 && self.progress >= self.word_goal
    }

    /// Progress as a whole percentage in `0..=100`.
    ///
    /// Returns 0 for a zero target so progress bars never divide by zero.
    pub fn completion_percent(&self) -> u8 {
        if self.word_goal == 0 {
            return 0;
        }
        let percent = u64::from(self.progress) * 100 / u64::from(self.word_goal);
        percent.min(100) as u8
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_GOAL
        } else {
            self.title.as_str()
        }
    }
}

/// Full-field overwrite used by the edit flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalEdit {
    pub title: String,
    pub progress: u32,
    pub word_goal: u32,
}

impl GoalEdit {
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        validate_fields(&self.title, self.progress, self.word_goal)
    }
}

/// Parses a user-typed target word count such as `" 300 "`.
pub fn parse_word_goal(raw: &str) -> Result<u32, GoalValidationError> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<i64>()
        .map_err(|_| GoalValidationError::InvalidWordGoal(trimmed.to_string()))?;
    if value <= 0 {
        return Err(GoalValidationError::NonPositiveWordGoal);
    }
    u32::try_from(value).map_err(|_| GoalValidationError::InvalidWordGoal(trimmed.to_string()))
}

fn validate_fields(title: &str, progress: u32, word_goal: u32) -> Result<(), GoalValidationError> {
    if title.trim().is_empty() {
        return Err(GoalValidationError::EmptyTitle);
    }
    if word_goal == 0 {
        return Err(GoalValidationError::NonPositiveWordGoal);
    }
    if progress > word_goal {
        return Err(GoalValidationError::ProgressExceedsGoal {
            progress,
            word_goal,
        });
    }
    Ok(())
}

pub(crate) fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
