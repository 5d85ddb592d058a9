use std::cell::RefCell;
use std::rc::Rc;
use writeright_core::db::open_db_in_memory;
use writeright_core::{
    AuthError, AuthFlow, IdentityProvider, LocalIdentityProvider, SqliteAccountRepository,
};

#[test]
fn sign_up_creates_account_and_signs_in() {
    let conn = open_db_in_memory().unwrap();
    let mut provider = LocalIdentityProvider::new(SqliteAccountRepository::new(&conn));

    let session = provider.sign_up(" Writer@Example.com ", "secret1").unwrap();
    assert_eq!(session.email, "writer@example.com");
    assert_eq!(provider.current_session(), Some(&session));

    let stored: String = conn
        .query_row("SELECT password_hash FROM accounts;", [], |row| row.get(0))
        .unwrap();
    assert!(stored.starts_with("$argon2id$"));
    assert!(!stored.contains("secret1"));
}

#[test]
fn sign_in_accepts_correct_password_and_rejects_wrong_one() {
    let conn = open_db_in_memory().unwrap();
    let mut provider = LocalIdentityProvider::new(SqliteAccountRepository::new(&conn));
    let created = provider.sign_up("poet@example.com", "secret1").unwrap();
    provider.sign_out();

    assert!(matches!(
        provider.sign_in("poet@example.com", "wrong-pass"),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        provider.sign_in("nobody@example.com", "secret1"),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(provider.current_session().is_none());

    let session = provider.sign_in("POET@example.com", "secret1").unwrap();
    assert_eq!(session.user_id, created.user_id);
}

#[test]
fn sign_up_rejects_duplicates_and_malformed_input() {
    let conn = open_db_in_memory().unwrap();
    let mut provider = LocalIdentityProvider::new(SqliteAccountRepository::new(&conn));
    provider.sign_up("dup@example.com", "secret1").unwrap();

    assert!(matches!(
        provider.sign_up("DUP@example.com", "another1"),
        Err(AuthError::EmailTaken)
    ));
    assert!(matches!(
        provider.sign_up("not-an-email", "secret1"),
        Err(AuthError::InvalidEmail)
    ));
    assert!(matches!(
        provider.sign_up("short@example.com", "abc"),
        Err(AuthError::WeakPassword)
    ));
}

#[test]
fn observers_see_initial_state_and_changes_only() {
    let conn = open_db_in_memory().unwrap();
    let mut provider = LocalIdentityProvider::new(SqliteAccountRepository::new(&conn));
    let seen: Rc<RefCell<Vec<Option<String>>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    let id = provider.subscribe(Box::new(move |session| {
        sink.borrow_mut()
            .push(session.map(|session| session.email.clone()))
    }));

    provider.sign_up("obs@example.com", "secret1").unwrap();
    provider.sign_in("obs@example.com", "secret1").unwrap();
    provider.sign_out();
    provider.sign_out();

    assert_eq!(
        *seen.borrow(),
        vec![None, Some("obs@example.com".to_string()), None]
    );

    assert!(provider.unsubscribe(id));
    provider.sign_in("obs@example.com", "secret1").unwrap();
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn restored_session_survives_provider_rebuild() {
    let conn = open_db_in_memory().unwrap();
    let mut provider = LocalIdentityProvider::new(SqliteAccountRepository::new(&conn));
    let session = provider.sign_up("keep@example.com", "secret1").unwrap();

    let kept = provider.into_session();
    let rebuilt = LocalIdentityProvider::with_session(SqliteAccountRepository::new(&conn), kept);
    assert_eq!(rebuilt.current_session(), Some(&session));
}

#[test]
fn corrupted_stored_hash_fails_sign_in_without_signing_in() {
    let conn = open_db_in_memory().unwrap();
    let mut provider = LocalIdentityProvider::new(SqliteAccountRepository::new(&conn));
    provider.sign_up("broken@example.com", "secret1").unwrap();
    provider.sign_out();
    conn.execute("UPDATE accounts SET password_hash = 'garbage';", [])
        .unwrap();

    assert!(matches!(
        provider.sign_in("broken@example.com", "secret1"),
        Err(AuthError::Credential(_))
    ));
    assert!(provider.current_session().is_none());
}

#[test]
fn failure_messages_are_collapsed_per_flow() {
    assert_eq!(AuthFlow::SignIn.failure_message(), "Invalid email or password.");
    assert_eq!(
        AuthFlow::SignUp.failure_message(),
        "Something went wrong. Try again."
    );
}
