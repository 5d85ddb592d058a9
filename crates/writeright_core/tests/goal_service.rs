use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;
use writeright_core::db::open_db_in_memory;
use writeright_core::{
    GoalEdit, GoalService, GoalServiceError, GoalValidationError, RepoError,
    SqliteGoalRepository, SubmissionOutcome, UserId,
};

fn seed_account(conn: &Connection) -> UserId {
    let user_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO accounts (user_id, email, password_hash, created_at)
         VALUES (?1, ?1 || '@example.com', 'unused', 0);",
        [user_id.to_string()],
    )
    .unwrap();
    user_id
}

#[test]
fn submit_writing_counts_words_and_persists_progress() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let goal = service.create_goal(seed_account(&conn), "Essay", 300).unwrap();

    let outcome = service
        .submit_writing(goal.id, "the quick brown fox")
        .unwrap();
    match &outcome {
        SubmissionOutcome::Recorded {
            goal: stored,
            words_counted,
            completed,
            newly_completed,
        } => {
            assert_eq!(stored.progress, 4);
            assert_eq!(*words_counted, 4);
            assert!(!completed);
            assert!(!newly_completed);
        }
        SubmissionOutcome::Ignored => panic!("submission should be recorded"),
    }
    assert!(outcome.completion_message().is_none());

    let reloaded = service.get_goal(goal.id).unwrap().unwrap();
    assert_eq!(reloaded.progress, 4);
}

#[test]
fn submit_writing_clamps_and_reports_completion_once() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let goal = service.create_goal(seed_account(&conn), "Chapter", 300).unwrap();
    service
        .edit_goal(
            goal.id,
            &GoalEdit {
                title: "Chapter".to_string(),
                progress: 295,
                word_goal: 300,
            },
        )
        .unwrap();

    let outcome = service
        .submit_writing(goal.id, "one two three four five six")
        .unwrap();
    assert!(matches!(
        outcome,
        SubmissionOutcome::Recorded {
            completed: true,
            newly_completed: true,
            ..
        }
    ));
    assert_eq!(
        outcome.completion_message().as_deref(),
        Some("You've completed \"Chapter\"!")
    );

    let again = service.submit_writing(goal.id, "more words").unwrap();
    match again {
        SubmissionOutcome::Recorded {
            goal,
            completed,
            newly_completed,
            ..
        } => {
            assert_eq!(goal.progress, 300);
            assert!(completed);
            assert!(!newly_completed);
        }
        SubmissionOutcome::Ignored => panic!("non-empty text should be recorded"),
    }
}

#[test]
fn blank_submission_is_ignored_without_write() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let goal = service.create_goal(seed_account(&conn), "Diary", 300).unwrap();
    conn.execute("UPDATE goals SET updated_at = 5;", []).unwrap();

    let outcome = service.submit_writing(goal.id, " \n\t ").unwrap();
    assert_eq!(outcome, SubmissionOutcome::Ignored);

    let reloaded = service.get_goal(goal.id).unwrap().unwrap();
    assert_eq!(reloaded.progress, 0);
    assert_eq!(reloaded.updated_at, 5);
}

#[test]
fn submit_to_missing_goal_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let missing = Uuid::new_v4();

    let err = service.submit_writing(missing, "words").unwrap_err();
    assert!(matches!(err, GoalServiceError::GoalNotFound(id) if id == missing));
}

#[test]
fn create_for_unknown_account_is_a_repo_error() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let stranger = Uuid::new_v4();

    assert!(matches!(
        service.create_goal(stranger, "Orphan", 100),
        Err(GoalServiceError::Repo(RepoError::UnknownOwner(id))) if id == stranger
    ));
}

#[test]
fn corrupted_rows_surface_as_repo_errors_on_reads() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let user = seed_account(&conn);
    let goal = service.create_goal(user, "Script", 100).unwrap();
    conn.pragma_update(None, "ignore_check_constraints", true)
        .unwrap();
    conn.execute("UPDATE goals SET progress = 500;", []).unwrap();

    assert!(matches!(
        service.get_goal(goal.id),
        Err(GoalServiceError::Repo(RepoError::InvalidData(_)))
    ));
    assert!(matches!(
        service.list_goals(user),
        Err(GoalServiceError::Repo(RepoError::InvalidData(_)))
    ));
}

#[test]
fn create_rejects_blank_title_and_zero_goal() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let user = seed_account(&conn);

    assert!(matches!(
        service.create_goal(user, "   ", 100),
        Err(GoalServiceError::Validation(GoalValidationError::EmptyTitle))
    ));
    assert!(matches!(
        service.create_goal(user, "ok", 0),
        Err(GoalServiceError::Validation(
            GoalValidationError::NonPositiveWordGoal
        ))
    ));
    assert!(service.list_goals(user).unwrap().is_empty());
}

#[test]
fn edit_rejects_progress_above_goal_and_keeps_record() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let goal = service.create_goal(seed_account(&conn), "Blog", 100).unwrap();

    let err = service
        .edit_goal(
            goal.id,
            &GoalEdit {
                title: "Blog".to_string(),
                progress: 150,
                word_goal: 100,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        GoalServiceError::Validation(GoalValidationError::ProgressExceedsGoal { .. })
    ));

    let edited = service
        .edit_goal(
            goal.id,
            &GoalEdit {
                title: "  Blog post ".to_string(),
                progress: 80,
                word_goal: 200,
            },
        )
        .unwrap();
    assert_eq!(edited.title, "Blog post");
    assert_eq!(edited.progress, 80);
    assert_eq!(edited.word_goal, 200);
}

#[test]
fn delete_removes_goal_and_reports_missing_afterwards() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let user = seed_account(&conn);
    let goal = service.create_goal(user, "Poem", 20).unwrap();

    service.delete_goal(goal.id).unwrap();
    assert!(service.list_goals(user).unwrap().is_empty());
    assert!(matches!(
        service.delete_goal(goal.id),
        Err(GoalServiceError::GoalNotFound(_))
    ));
}

#[test]
fn watchers_receive_snapshot_then_owner_updates_only() {
    let conn = open_db_in_memory().unwrap();
    let mut service = GoalService::new(SqliteGoalRepository::new(&conn));
    let alice = seed_account(&conn);
    let bob = seed_account(&conn);
    service.create_goal(alice, "Existing", 50).unwrap();
    conn.execute("UPDATE goals SET created_at = 1;", []).unwrap();

    let alice_lists: Rc<RefCell<Vec<Vec<u32>>>> = Rc::new(RefCell::new(Vec::new()));
    let bob_calls = Rc::new(RefCell::new(0));

    let sink = Rc::clone(&alice_lists);
    let subscription = service
        .watch_goals(
            alice,
            Box::new(move |goals| {
                sink.borrow_mut()
                    .push(goals.iter().map(|goal| goal.progress).collect())
            }),
        )
        .unwrap();
    let counter = Rc::clone(&bob_calls);
    service
        .watch_goals(bob, Box::new(move |_| *counter.borrow_mut() += 1))
        .unwrap();

    let second = service.create_goal(alice, "New", 10).unwrap();
    service.submit_writing(second.id, "a b c").unwrap();
    service.submit_writing(second.id, "   ").unwrap();
    service.delete_goal(second.id).unwrap();

    assert_eq!(
        *alice_lists.borrow(),
        vec![vec![0], vec![0, 0], vec![0, 3], vec![0]]
    );
    assert_eq!(*bob_calls.borrow(), 1);

    assert!(service.unwatch_goals(subscription));
    service.create_goal(alice, "Unseen", 10).unwrap();
    assert_eq!(alice_lists.borrow().len(), 4);
    assert_eq!(service.feed().len(), 1);
}
