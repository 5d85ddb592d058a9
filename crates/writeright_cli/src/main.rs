//! Developer CLI over WriteRight core.
//!
//! # Responsibility
//! - Drive the same goal/account use-cases the mobile shell calls.
//! - Keep output line-oriented for quick local checks and scripting.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;
use writeright_core::db::open_db;
use writeright_core::{
    default_log_level, init_logging, parse_word_goal, pick_quote, Goal, GoalEdit, GoalService,
    IdentityProvider, LocalIdentityProvider, SqliteAccountRepository, SqliteGoalRepository,
    SubmissionOutcome,
};

#[derive(Debug, Parser)]
#[command(name = "writeright", version, about = "Track writing goals from the terminal")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "WRITERIGHT_DB_PATH", default_value = "writeright.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging stays off when unset.
    #[arg(long, env = "WRITERIGHT_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage info.
    Ping,
    /// Register an account and print its user id.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Check credentials and print the user id.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a goal with zero progress.
    Create {
        #[arg(long)]
        user: Uuid,
        title: String,
        word_goal: String,
    },
    /// List one user's goals.
    List {
        #[arg(long)]
        user: Uuid,
    },
    /// Show one goal.
    Show { goal_id: Uuid },
    /// Credit written text to a goal.
    Submit {
        goal_id: Uuid,
        /// Text to count. Multiple arguments are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Overwrite title, progress and word goal.
    Edit {
        goal_id: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long)]
        progress: u32,
        #[arg(long)]
        word_goal: u32,
    },
    /// Delete a goal.
    Delete { goal_id: Uuid },
    /// Print a random writing quote.
    Quote,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir).map_err(|err| anyhow!(err))?;
    }

    match cli.command {
        Command::Ping => {
            println!("writeright_core ping={}", writeright_core::ping());
            println!("writeright_core version={}", writeright_core::core_version());
        }
        Command::Quote => println!("{}", pick_quote()),
        Command::Signup { email, password } => {
            let conn = open_db(&cli.db).context("failed to open database")?;
            let mut provider = LocalIdentityProvider::new(SqliteAccountRepository::new(&conn));
            let session = provider
                .sign_up(&email, &password)
                .context("sign up failed")?;
            println!("{}", session.user_id);
        }
        Command::Login { email, password } => {
            let conn = open_db(&cli.db).context("failed to open database")?;
            let mut provider = LocalIdentityProvider::new(SqliteAccountRepository::new(&conn));
            let session = provider
                .sign_in(&email, &password)
                .context("sign in failed")?;
            println!("{}", session.user_id);
        }
        Command::Create {
            user,
            title,
            word_goal,
        } => {
            let conn = open_db(&cli.db).context("failed to open database")?;
            let service = GoalService::new(SqliteGoalRepository::new(&conn));
            let goal = service.create_goal(user, title, parse_word_goal(&word_goal)?)?;
            print_goal(&goal);
        }
        Command::List { user } => {
            let conn = open_db(&cli.db).context("failed to open database")?;
            let service = GoalService::new(SqliteGoalRepository::new(&conn));
            let goals = service.list_goals(user)?;
            if goals.is_empty() {
                println!("No goals yet. Add one!");
            }
            for goal in &goals {
                print_goal(goal);
            }
        }
        Command::Show { goal_id } => {
            let conn = open_db(&cli.db).context("failed to open database")?;
            let service = GoalService::new(SqliteGoalRepository::new(&conn));
            match service.get_goal(goal_id)? {
                Some(goal) => print_goal(&goal),
                None => bail!("goal not found: {goal_id}"),
            }
        }
        Command::Submit { goal_id, text } => {
            let conn = open_db(&cli.db).context("failed to open database")?;
            let service = GoalService::new(SqliteGoalRepository::new(&conn));
            let outcome = service.submit_writing(goal_id, &text.join(" "))?;
            let message = outcome.completion_message();
            match outcome {
                SubmissionOutcome::Ignored => println!("nothing to count"),
                SubmissionOutcome::Recorded {
                    goal,
                    words_counted,
                    ..
                } => {
                    println!("+{words_counted} words");
                    print_goal(&goal);
                }
            }
            if let Some(message) = message {
                println!("{message}");
            }
        }
        Command::Edit {
            goal_id,
            title,
            progress,
            word_goal,
        } => {
            let conn = open_db(&cli.db).context("failed to open database")?;
            let service = GoalService::new(SqliteGoalRepository::new(&conn));
            let goal = service.edit_goal(
                goal_id,
                &GoalEdit {
                    title,
                    progress,
                    word_goal,
                },
            )?;
            print_goal(&goal);
        }
        Command::Delete { goal_id } => {
            let conn = open_db(&cli.db).context("failed to open database")?;
            let service = GoalService::new(SqliteGoalRepository::new(&conn));
            service.delete_goal(goal_id)?;
            println!("deleted {goal_id}");
        }
    }

    Ok(())
}

fn print_goal(goal: &Goal) {
    println!(
        "{}  {}  {} / {} words ({}%){}",
        goal.id,
        goal.display_title(),
        goal.progress,
        goal.word_goal,
        goal.completion_percent(),
        if goal.is_completed() { "  done" } else { "" }
    );
}
