//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Collapse core errors into the short messages the screens display.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Goal calls require a signed-in session and only touch that user's goals.
//! - Storage failures are logged and returned as `ok = false` envelopes.

use log::error;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use uuid::Uuid;
use writeright_core::db::{open_db, DbError};
use writeright_core::{
    core_version as core_version_inner, greeting_name, init_logging as init_logging_inner,
    parse_word_goal, pick_quote, ping as ping_inner, AuthFlow, AuthResult, Goal, GoalEdit,
    GoalService, GoalServiceError, GoalValidationError, IdentityProvider, LocalIdentityProvider,
    RepoError, Session, SqliteAccountRepository, SqliteGoalRepository, SubmissionOutcome,
};

const DB_FILE_NAME: &str = "writeright.sqlite3";
const DB_PATH_ENV: &str = "WRITERIGHT_DB_PATH";
const NOT_SIGNED_IN_MESSAGE: &str = "Please sign in first.";
const GOAL_NOT_FOUND_MESSAGE: &str = "Goal not found.";
const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Try again.";

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message on failure.
/// Safe to call repeatedly with the same `level + log_dir`.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Signed-in user projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
}

/// Result envelope for sign-in/sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub ok: bool,
    pub user: Option<UserInfo>,
    /// Empty on success, otherwise the single message the screen shows.
    pub message: String,
}

/// Home screen projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeSummary {
    pub signed_in: bool,
    /// `Welcome back, <name>!` when signed in.
    pub greeting: String,
    pub quote: String,
}

/// Goal card projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalItem {
    pub goal_id: String,
    pub title: String,
    pub progress: u32,
    pub word_goal: u32,
    /// Progress bar fill in `0..=100`.
    pub percent: u8,
    pub completed: bool,
    pub created_at: i64,
}

/// Generic action envelope for goal calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalActionResponse {
    pub ok: bool,
    pub goal: Option<GoalItem>,
    pub message: String,
}

impl GoalActionResponse {
    fn success(goal: Option<&Goal>, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            goal: goal.map(to_goal_item),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            goal: None,
            message: message.into(),
        }
    }
}

/// Goal list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalListResponse {
    pub ok: bool,
    pub items: Vec<GoalItem>,
    /// `No goals yet. Add one!` for an empty list.
    pub message: String,
}

/// Writing submission envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitWritingResponse {
    pub ok: bool,
    /// `false` for blank input, which is declined without a write.
    pub recorded: bool,
    pub goal: Option<GoalItem>,
    pub words_counted: u32,
    pub completed: bool,
    /// Congratulation text when the goal is complete, otherwise empty.
    pub message: String,
}

impl SubmitWritingResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            recorded: false,
            goal: None,
            words_counted: 0,
            completed: false,
            message: message.into(),
        }
    }
}

/// Creates an account and signs it in.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_up(email: String, password: String) -> AuthResponse {
    run_auth(AuthFlow::SignUp, |provider| {
        provider.sign_up(email.as_str(), password.as_str())
    })
}

/// Signs in with email and password.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_in(email: String, password: String) -> AuthResponse {
    run_auth(AuthFlow::SignIn, |provider| {
        provider.sign_in(email.as_str(), password.as_str())
    })
}

/// Ends the current session. No-op when signed out.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_out() {
    if let Err(err) = with_identity_provider(|provider| provider.sign_out()) {
        error!("event=auth_sign_out module=ffi status=error error_code=db_open_failed error={err}");
        *session_guard() = None;
    }
}

/// Returns the signed-in user, used by the shell to gate navigation.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_current_user() -> Option<UserInfo> {
    current_session().map(|session| to_user_info(&session))
}

/// Greeting and a random quote for the home screen.
#[flutter_rust_bridge::frb(sync)]
pub fn home_summary() -> HomeSummary {
    let quote = pick_quote().to_string();
    match current_session() {
        Some(session) => HomeSummary {
            signed_in: true,
            greeting: format!("Welcome back, {}!", greeting_name(&session.email)),
            quote,
        },
        None => HomeSummary {
            signed_in: false,
            greeting: "Shape Your Words, Reach Your Goals".to_string(),
            quote,
        },
    }
}

/// Creates a goal for the signed-in user from raw form input.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_create(title: String, word_goal: String) -> GoalActionResponse {
    let Some(session) = current_session() else {
        return GoalActionResponse::failure(NOT_SIGNED_IN_MESSAGE);
    };
    let target = match parse_word_goal(word_goal.as_str()) {
        Ok(target) => target,
        Err(err) => return GoalActionResponse::failure(validation_message(&err)),
    };

    match with_goal_service(|service| service.create_goal(session.user_id, title, target)) {
        Ok(goal) => GoalActionResponse::success(Some(&goal), "Goal created."),
        Err(err) => GoalActionResponse::failure(service_failure_message("goal_create", &err)),
    }
}

/// Lists the signed-in user's goals, oldest first.
#[flutter_rust_bridge::frb(sync)]
pub fn goals_list() -> GoalListResponse {
    let Some(session) = current_session() else {
        return GoalListResponse {
            ok: false,
            items: Vec::new(),
            message: NOT_SIGNED_IN_MESSAGE.to_string(),
        };
    };

    match with_goal_service(|service| service.list_goals(session.user_id)) {
        Ok(goals) => {
            let items = goals.iter().map(to_goal_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No goals yet. Add one!".to_string()
            } else {
                String::new()
            };
            GoalListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => GoalListResponse {
            ok: false,
            items: Vec::new(),
            message: service_failure_message("goals_list", &err),
        },
    }
}

/// Loads one goal for the edit screen.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_get(goal_id: String) -> GoalActionResponse {
    match with_owned_goal(goal_id.as_str(), |_, goal| Ok(goal)) {
        Ok(goal) => GoalActionResponse::success(Some(&goal), ""),
        Err(message) => GoalActionResponse::failure(message),
    }
}

/// Credits submitted text to a goal.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_submit_writing(goal_id: String, text: String) -> SubmitWritingResponse {
    let outcome = with_owned_goal(goal_id.as_str(), |service, goal| {
        service.submit_writing(goal.id, text.as_str())
    });

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(message) => return SubmitWritingResponse::failure(message),
    };
    let message = outcome.completion_message().unwrap_or_default();
    match outcome {
        SubmissionOutcome::Ignored => SubmitWritingResponse {
            ok: true,
            recorded: false,
            goal: None,
            words_counted: 0,
            completed: false,
            message,
        },
        SubmissionOutcome::Recorded {
            goal,
            words_counted,
            completed,
            ..
        } => SubmitWritingResponse {
            ok: true,
            recorded: true,
            goal: Some(to_goal_item(&goal)),
            words_counted,
            completed,
            message,
        },
    }
}

/// Overwrites title, progress and word goal from the edit form.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_update(
    goal_id: String,
    title: String,
    progress: String,
    word_goal: String,
) -> GoalActionResponse {
    let progress = match progress.trim().parse::<u32>() {
        Ok(value) => value,
        Err(_) => return GoalActionResponse::failure("Progress must be a whole number."),
    };
    let word_goal = match parse_word_goal(word_goal.as_str()) {
        Ok(value) => value,
        Err(err) => return GoalActionResponse::failure(validation_message(&err)),
    };
    let edit = GoalEdit {
        title,
        progress,
        word_goal,
    };

    match with_owned_goal(goal_id.as_str(), |service, goal| {
        service.edit_goal(goal.id, &edit)
    }) {
        Ok(goal) => GoalActionResponse::success(Some(&goal), "Goal updated."),
        Err(message) => GoalActionResponse::failure(message),
    }
}

/// Deletes one goal.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_delete(goal_id: String) -> GoalActionResponse {
    match with_owned_goal(goal_id.as_str(), |service, goal| {
        service.delete_goal(goal.id)
    }) {
        Ok(()) => GoalActionResponse::success(None, "Goal deleted."),
        Err(message) => GoalActionResponse::failure(message),
    }
}

fn run_auth(
    flow: AuthFlow,
    f: impl FnOnce(&mut LocalIdentityProvider<SqliteAccountRepository<'_>>) -> AuthResult<Session>,
) -> AuthResponse {
    let failure = || AuthResponse {
        ok: false,
        user: None,
        message: flow.failure_message().to_string(),
    };

    match with_identity_provider(f) {
        Ok(Ok(signed_in)) => AuthResponse {
            ok: true,
            user: Some(to_user_info(&signed_in)),
            message: String::new(),
        },
        Ok(Err(_)) => failure(),
        Err(err) => {
            error!("event=auth module=ffi status=error error_code=db_open_failed error={err}");
            failure()
        }
    }
}

/// Rebuilds the identity provider around the process-wide session, runs `f`
/// and stores the resulting session back.
fn with_identity_provider<T>(
    f: impl FnOnce(&mut LocalIdentityProvider<SqliteAccountRepository<'_>>) -> T,
) -> Result<T, DbError> {
    let conn = open_db(resolve_db_path())?;
    let mut session = session_guard();
    let mut provider =
        LocalIdentityProvider::with_session(SqliteAccountRepository::new(&conn), session.take());
    let result = f(&mut provider);
    *session = provider.into_session();
    Ok(result)
}

fn with_goal_service<T>(
    f: impl FnOnce(&GoalService<SqliteGoalRepository<'_>>) -> Result<T, GoalServiceError>,
) -> Result<T, GoalServiceError> {
    let conn = open_db(resolve_db_path())
        .map_err(|err| GoalServiceError::Repo(RepoError::Db(err)))?;
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    f(&service)
}

/// Runs `f` on a goal owned by the signed-in user.
///
/// Goals of other users are reported as not found.
fn with_owned_goal<T>(
    goal_id: &str,
    f: impl FnOnce(&GoalService<SqliteGoalRepository<'_>>, Goal) -> Result<T, GoalServiceError>,
) -> Result<T, String> {
    let Some(session) = current_session() else {
        return Err(NOT_SIGNED_IN_MESSAGE.to_string());
    };
    let Ok(goal_id) = Uuid::parse_str(goal_id.trim()) else {
        return Err(GOAL_NOT_FOUND_MESSAGE.to_string());
    };

    with_goal_service(|service| {
        let goal = service
            .get_goal(goal_id)?
            .filter(|goal| goal.user_id == session.user_id)
            .ok_or(GoalServiceError::GoalNotFound(goal_id))?;
        f(service, goal)
    })
    .map_err(|err| service_failure_message("goal_call", &err))
}

fn service_failure_message(operation: &str, err: &GoalServiceError) -> String {
    match err {
        GoalServiceError::Validation(validation) => validation_message(validation),
        GoalServiceError::GoalNotFound(_) => GOAL_NOT_FOUND_MESSAGE.to_string(),
        GoalServiceError::Progress(_) | GoalServiceError::Repo(_) => {
            error!("event={operation} module=ffi status=error error={err}");
            GENERIC_FAILURE_MESSAGE.to_string()
        }
    }
}

fn validation_message(err: &GoalValidationError) -> String {
    match err {
        GoalValidationError::EmptyTitle => "Please enter a title.".to_string(),
        GoalValidationError::NonPositiveWordGoal | GoalValidationError::InvalidWordGoal(_) => {
            "Word goal must be a positive number.".to_string()
        }
        GoalValidationError::ProgressExceedsGoal { .. } => {
            "Progress cannot exceed your word goal.".to_string()
        }
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn session_guard() -> MutexGuard<'static, Option<Session>> {
    SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn current_session() -> Option<Session> {
    session_guard().clone()
}

fn to_user_info(session: &Session) -> UserInfo {
    UserInfo {
        user_id: session.user_id.to_string(),
        email: session.email.clone(),
    }
}

fn to_goal_item(goal: &Goal) -> GoalItem {
    GoalItem {
        goal_id: goal.id.to_string(),
        title: goal.display_title().to_string(),
        progress: goal.progress,
        word_goal: goal.word_goal,
        percent: goal.completion_percent(),
        completed: goal.is_completed(),
        created_at: goal.created_at,
    }
}
