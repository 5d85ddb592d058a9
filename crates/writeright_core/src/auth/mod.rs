//! Identity seam: sign up, sign in, sign out and session observers.
//!
//! # Responsibility
//! - Define the `IdentityProvider` contract the UI gates navigation on.
//! - Provide a local SQLite-backed implementation with Argon2id password hashes.
//!
//! # Invariants
//! - Passwords are never stored or logged in plaintext.
//! - Session observers fire only when the signed-in user actually changes.

mod credentials;
mod local;

pub use credentials::{hash_password, verify_password};
pub use local::LocalIdentityProvider;

use crate::model::account::Session;
use crate::repo::goal_repo::RepoError;
use argon2::password_hash::Error as HashError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum accepted password length.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Shown for any failed sign-in.
pub const SIGN_IN_FAILED_MESSAGE: &str = "Invalid email or password.";
/// Shown for any failed sign-up.
pub const SIGN_UP_FAILED_MESSAGE: &str = "Something went wrong. Try again.";

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug)]
pub enum AuthError {
    InvalidEmail,
    WeakPassword,
    EmailTaken,
    InvalidCredentials,
    /// Hashing failed or a stored hash could not be parsed.
    Credential(HashError),
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is malformed"),
            Self::WeakPassword => write!(
                f,
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            ),
            Self::EmailTaken => write!(f, "email address is already registered"),
            Self::InvalidCredentials => write!(f, "email or password does not match"),
            Self::Credential(err) => write!(f, "password hash error: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Credential(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HashError> for AuthError {
    fn from(value: HashError) -> Self {
        Self::Credential(value)
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Which auth screen a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    SignIn,
    SignUp,
}

impl AuthFlow {
    /// Collapses any failure into the single message the screen shows.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::SignIn => SIGN_IN_FAILED_MESSAGE,
            Self::SignUp => SIGN_UP_FAILED_MESSAGE,
        }
    }
}

/// Handle returned by [`IdentityProvider::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionSubscriptionId(pub(crate) u64);

/// Session-state observer. `None` means signed out.
pub type SessionObserver = Box<dyn Fn(Option<&Session>)>;

/// External identity contract consumed by the app shell.
pub trait IdentityProvider {
    /// Creates an account and signs it in.
    fn sign_up(&mut self, email: &str, password: &str) -> AuthResult<Session>;
    /// Validates credentials and signs the account in.
    fn sign_in(&mut self, email: &str, password: &str) -> AuthResult<Session>;
    /// Ends the current session, if any.
    fn sign_out(&mut self);
    fn current_session(&self) -> Option<&Session>;
    /// Registers an observer and immediately reports the current state.
    fn subscribe(&mut self, observer: SessionObserver) -> SessionSubscriptionId;
    fn unsubscribe(&mut self, id: SessionSubscriptionId) -> bool;
}
