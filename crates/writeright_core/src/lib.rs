//! Core domain logic for WriteRight.
//! This crate is the single source of truth for goal and account invariants.

pub mod auth;
pub mod db;
pub mod feed;
pub mod logging;
pub mod model;
pub mod progress;
pub mod repo;
pub mod service;

pub use auth::{
    AuthError, AuthFlow, AuthResult, IdentityProvider, LocalIdentityProvider, SessionObserver,
    SessionSubscriptionId,
};
pub use feed::goal_feed::{GoalFeed, GoalListObserver, SubscriptionId};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, Session};
pub use model::goal::{parse_word_goal, Goal, GoalEdit, GoalId, GoalValidationError, UserId};
pub use progress::{apply_submission, count_words, ProgressError, ProgressUpdate};
pub use repo::account_repo::{AccountRepository, SqliteAccountRepository};
pub use repo::goal_repo::{GoalRepository, RepoError, RepoResult, SqliteGoalRepository};
pub use service::goal_service::{
    GoalService, GoalServiceError, GoalServiceResult, SubmissionOutcome,
};
pub use service::home::{greeting_name, pick_quote};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
