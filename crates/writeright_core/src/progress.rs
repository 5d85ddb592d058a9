//! Goal progress tracker.
//!
//! # Responsibility
//! - Word-count a submitted block of text.
//! - Compute the next clamped progress value and the completion flag.
//!
//! # Invariants
//! - `next_progress <= word_goal` for every accepted call.
//! - `next_progress >= current_progress` whenever `current_progress <= word_goal`.
//! - Empty or whitespace-only submissions never change progress.
//! - Pure: no I/O, no shared state.
//!
//! Word counting splits on runs of Unicode whitespace. Hyphenated or
//! punctuation-heavy text is counted by that rule only, so `"well-known"` is
//! one word and a lone `"--"` is one word too.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected tracker inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressError {
    /// Target word count is zero, so there is nothing to clamp against.
    NonPositiveGoal,
}

impl Display for ProgressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveGoal => write!(f, "word goal must be greater than zero"),
        }
    }
}

impl Error for ProgressError {}

/// Result of applying one submission to a goal's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub next_progress: u32,
    pub completed: bool,
    /// Words found in the submission, before clamping.
    pub words_counted: u32,
    /// `false` when the submission was empty and nothing should be persisted.
    pub changed: bool,
}

/// Counts maximal runs of non-whitespace characters.
pub fn count_words(text: &str) -> u32 {
    let count = text.split_whitespace().count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Applies a text submission to `current_progress`.
///
/// Empty submissions return `changed = false` with progress untouched. The
/// completion flag is still reported so callers can render state uniformly.
///
/// # Errors
/// - `ProgressError::NonPositiveGoal` when `word_goal == 0`.
pub fn apply_submission(
    current_progress: u32,
    word_goal: u32,
    submission: &str,
) -> Result<ProgressUpdate, ProgressError> {
    if word_goal == 0 {
        return Err(ProgressError::NonPositiveGoal);
    }

    let trimmed = submission.trim();
    if trimmed.is_empty() {
        return Ok(ProgressUpdate {
            next_progress: current_progress,
            completed: current_progress >= word_goal,
            words_counted: 0,
            changed: false,
        });
    }

    let words_counted = count_words(trimmed);
    let tentative = current_progress.saturating_add(words_counted);
    let next_progress = tentative.min(word_goal);

    Ok(ProgressUpdate {
        next_progress,
        completed: next_progress >= word_goal,
        words_counted,
        changed: true,
    })
}
