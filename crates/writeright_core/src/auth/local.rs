//! Local identity provider over an `AccountRepository`.

use super::credentials::{hash_password, verify_password};
use super::{
    AuthError, AuthResult, IdentityProvider, SessionObserver, SessionSubscriptionId,
    MIN_PASSWORD_CHARS,
};
use crate::model::account::{normalize_email, Account, Session};
use crate::model::goal::now_epoch_ms;
use crate::repo::account_repo::{AccountRepository, InsertAccountOutcome, StoredCredential};
use log::{error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex"));

/// Identity provider that keeps accounts in local storage and the active
/// session in memory.
pub struct LocalIdentityProvider<R: AccountRepository> {
    repo: R,
    session: Option<Session>,
    observers: BTreeMap<SessionSubscriptionId, SessionObserver>,
    next_observer_id: u64,
}

impl<R: AccountRepository> LocalIdentityProvider<R> {
    pub fn new(repo: R) -> Self {
        Self::with_session(repo, None)
    }

    /// Restores a provider with a session kept by the host process.
    pub fn with_session(repo: R, session: Option<Session>) -> Self {
        Self {
            repo,
            session,
            observers: BTreeMap::new(),
            next_observer_id: 0,
        }
    }

    /// Consumes the provider and returns the session to keep across calls.
    pub fn into_session(self) -> Option<Session> {
        self.session
    }

    fn set_session(&mut self, next: Option<Session>) {
        if self.session == next {
            return;
        }
        self.session = next;
        for observer in self.observers.values() {
            observer(self.session.as_ref());
        }
    }
}

impl<R: AccountRepository> IdentityProvider for LocalIdentityProvider<R> {
    fn sign_up(&mut self, email: &str, password: &str) -> AuthResult<Session> {
        let email = normalize_email(email);
        if !EMAIL_RE.is_match(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword);
        }

        let password_hash = match hash_password(password) {
            Ok(hash) => hash,
            Err(err) => {
                error!("event=auth_sign_up module=auth status=error error_code=hash_failed error={err}");
                return Err(err.into());
            }
        };
        let credential = StoredCredential {
            account: Account {
                user_id: Uuid::new_v4(),
                email,
                created_at: now_epoch_ms(),
            },
            password_hash,
        };

        match self.repo.insert_account(&credential)? {
            InsertAccountOutcome::Created => {}
            InsertAccountOutcome::EmailTaken => {
                warn!("event=auth_sign_up module=auth status=error error_code=email_taken");
                return Err(AuthError::EmailTaken);
            }
        }

        let session = Session::from(&credential.account);
        info!(
            "event=auth_sign_up module=auth status=ok user_id={}",
            session.user_id
        );
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    fn sign_in(&mut self, email: &str, password: &str) -> AuthResult<Session> {
        let email = normalize_email(email);
        let Some(stored) = self.repo.find_by_email(&email)? else {
            warn!("event=auth_sign_in module=auth status=error error_code=invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        };
        let matches = match verify_password(password, &stored.password_hash) {
            Ok(matches) => matches,
            Err(err) => {
                error!(
                    "event=auth_sign_in module=auth status=error error_code=stored_hash_invalid user_id={} error={err}",
                    stored.account.user_id
                );
                return Err(err.into());
            }
        };
        if !matches {
            warn!("event=auth_sign_in module=auth status=error error_code=invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session::from(&stored.account);
        info!(
            "event=auth_sign_in module=auth status=ok user_id={}",
            session.user_id
        );
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    fn sign_out(&mut self) {
        if let Some(session) = self.session.as_ref() {
            info!(
                "event=auth_sign_out module=auth status=ok user_id={}",
                session.user_id
            );
        }
        self.set_session(None);
    }

    fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn subscribe(&mut self, observer: SessionObserver) -> SessionSubscriptionId {
        self.next_observer_id += 1;
        let id = SessionSubscriptionId(self.next_observer_id);
        observer(self.session.as_ref());
        self.observers.insert(id, observer);
        id
    }

    fn unsubscribe(&mut self, id: SessionSubscriptionId) -> bool {
        self.observers.remove(&id).is_some()
    }
}
