//! Goal use-case service.
//!
//! # Responsibility
//! - Provide create / submit-writing / edit / delete / get / list flows.
//! - Run the progress tracker before persisting submitted writing.
//! - Push the owner's full goal list to feed observers after every mutation.
//!
//! # Invariants
//! - Empty submissions never reach storage.
//! - Edits never persist `progress > word_goal`.
//! - A failed feed refresh is logged and never undoes a committed write.

use crate::feed::goal_feed::{GoalFeed, GoalListObserver, SubscriptionId};
use crate::model::goal::{Goal, GoalEdit, GoalId, GoalValidationError, UserId};
use crate::progress::{apply_submission, ProgressError};
use crate::repo::goal_repo::{GoalRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for goal use-cases.
#[derive(Debug)]
pub enum GoalServiceError {
    /// Input rejected before persistence.
    Validation(GoalValidationError),
    /// Target goal does not exist.
    GoalNotFound(GoalId),
    /// Tracker rejected the stored goal shape.
    Progress(ProgressError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for GoalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::Progress(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GoalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Progress(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::GoalNotFound(_) => None,
        }
    }
}

impl From<RepoError> for GoalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::GoalNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<GoalValidationError> for GoalServiceError {
    fn from(value: GoalValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ProgressError> for GoalServiceError {
    fn from(value: ProgressError) -> Self {
        Self::Progress(value)
    }
}

pub type GoalServiceResult<T> = Result<T, GoalServiceError>;

/// What happened to one writing submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Blank submission; nothing was written.
    Ignored,
    Recorded {
        /// Goal as stored after the update.
        goal: Goal,
        words_counted: u32,
        completed: bool,
        /// True only when this submission crossed the target.
        newly_completed: bool,
    },
}

impl SubmissionOutcome {
    /// Congratulation text for a completed goal, if any.
    pub fn completion_message(&self) -> Option<String> {
        match self {
            Self::Recorded {
                goal,
                completed: true,
                ..
            } => Some(format!("You've completed \"{}\"!", goal.display_title())),
            _ => None,
        }
    }
}

/// Goal service facade over a repository and the goal feed.
pub struct GoalService<R: GoalRepository> {
    repo: R,
    feed: GoalFeed,
}

impl<R: GoalRepository> GoalService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            feed: GoalFeed::new(),
        }
    }

    /// Creates a goal with zero progress for `user_id`.
    pub fn create_goal(
        &self,
        user_id: UserId,
        title: impl Into<String>,
        word_goal: u32,
    ) -> GoalServiceResult<Goal> {
        let goal = Goal::new(user_id, title, word_goal);
        goal.validate()?;

        if let Err(err) = self.repo.create_goal(&goal) {
            error!("event=goal_create module=service status=error user_id={user_id} error={err}");
            return Err(err.into());
        }
        info!(
            "event=goal_create module=service status=ok goal_id={} word_goal={}",
            goal.id, goal.word_goal
        );

        self.refresh_feed(user_id);
        Ok(goal)
    }

    pub fn get_goal(&self, goal_id: GoalId) -> GoalServiceResult<Option<Goal>> {
        self.repo.get_goal(goal_id).map_err(|err| {
            error!("event=goal_get module=service status=error goal_id={goal_id} error={err}");
            err.into()
        })
    }

    /// Lists one owner's goals, oldest first.
    pub fn list_goals(&self, user_id: UserId) -> GoalServiceResult<Vec<Goal>> {
        self.repo.list_goals_for_user(user_id).map_err(|err| {
            error!("event=goal_list module=service status=error user_id={user_id} error={err}");
            err.into()
        })
    }

    /// Credits a block of written text to a goal.
    ///
    /// Blank text returns `SubmissionOutcome::Ignored` without touching storage.
    pub fn submit_writing(
        &self,
        goal_id: GoalId,
        submission: &str,
    ) -> GoalServiceResult<SubmissionOutcome> {
        let mut goal = self.require_goal(goal_id)?;
        let was_completed = goal.is_completed();
        let update = apply_submission(goal.progress, goal.word_goal, submission)?;
        if !update.changed {
            return Ok(SubmissionOutcome::Ignored);
        }

        goal.progress = update.next_progress;
        let stored = match self.repo.update_goal(&goal) {
            Ok(stored) => stored,
            Err(err) => {
                error!(
                    "event=goal_submit module=service status=error goal_id={goal_id} error={err}"
                );
                return Err(err.into());
            }
        };
        info!(
            "event=goal_submit module=service status=ok goal_id={goal_id} words={} progress={} completed={}",
            update.words_counted, stored.progress, update.completed
        );

        self.refresh_feed(stored.user_id);
        Ok(SubmissionOutcome::Recorded {
            goal: stored,
            words_counted: update.words_counted,
            completed: update.completed,
            newly_completed: update.completed && !was_completed,
        })
    }

    /// Overwrites title, progress and word goal after validating the invariant.
    pub fn edit_goal(&self, goal_id: GoalId, edit: &GoalEdit) -> GoalServiceResult<Goal> {
        edit.validate()?;

        let mut goal = self.require_goal(goal_id)?;
        goal.title = edit.title.trim().to_string();
        goal.progress = edit.progress;
        goal.word_goal = edit.word_goal;

        let stored = match self.repo.update_goal(&goal) {
            Ok(stored) => stored,
            Err(err) => {
                error!("event=goal_edit module=service status=error goal_id={goal_id} error={err}");
                return Err(err.into());
            }
        };
        info!("event=goal_edit module=service status=ok goal_id={goal_id}");

        self.refresh_feed(stored.user_id);
        Ok(stored)
    }

    pub fn delete_goal(&self, goal_id: GoalId) -> GoalServiceResult<()> {
        let goal = self.require_goal(goal_id)?;
        if let Err(err) = self.repo.delete_goal(goal_id) {
            error!("event=goal_delete module=service status=error goal_id={goal_id} error={err}");
            return Err(err.into());
        }
        info!("event=goal_delete module=service status=ok goal_id={goal_id}");

        self.refresh_feed(goal.user_id);
        Ok(())
    }

    /// Subscribes to `user_id`'s goal list.
    ///
    /// The observer receives the current list immediately, then again after
    /// every mutation of that user's goals made through this service.
    pub fn watch_goals(
        &mut self,
        user_id: UserId,
        observer: GoalListObserver,
    ) -> GoalServiceResult<SubscriptionId> {
        let snapshot = self.repo.list_goals_for_user(user_id)?;
        observer(snapshot.as_slice());
        Ok(self.feed.subscribe(user_id, observer))
    }

    pub fn unwatch_goals(&mut self, subscription: SubscriptionId) -> bool {
        self.feed.unsubscribe(subscription)
    }

    pub fn feed(&self) -> &GoalFeed {
        &self.feed
    }

    fn require_goal(&self, goal_id: GoalId) -> GoalServiceResult<Goal> {
        match self.repo.get_goal(goal_id) {
            Ok(Some(goal)) => Ok(goal),
            Ok(None) => Err(GoalServiceError::GoalNotFound(goal_id)),
            Err(err) => {
                error!("event=goal_fetch module=service status=error goal_id={goal_id} error={err}");
                Err(err.into())
            }
        }
    }

    fn refresh_feed(&self, user_id: UserId) {
        if self.feed.subscriber_count(user_id) == 0 {
            return;
        }
        match self.repo.list_goals_for_user(user_id) {
            Ok(goals) => {
                self.feed.publish(user_id, &goals);
            }
            Err(err) => {
                warn!("event=feed_refresh module=service status=error error={err}");
            }
        }
    }
}
