use std::fmt;
use std::io;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use quiz_core::model::Subject;
use services::{Clock, QuestionStore, QuizService, ShuffleSource};
use storage::repository::Storage;
use storage::sqlite::SqliteRepository;
use tracing_subscriber::EnvFilter;

mod menu;
mod prompt;
mod seed;
mod take;

#[derive(Parser, Debug)]
#[command(name = "quiz", about = "Take multiple-choice quizzes and manage the question bank")]
struct Cli {
    /// SQLite database URL or file path.
    #[arg(long, global = true, env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3")]
    db: String,
    /// Fixed seed for question and choice shuffles.
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Take a quiz (default).
    Take,
    /// Add, remove and list questions interactively.
    Manage,
    /// Print the questions of one subject, or of every subject.
    List {
        subject: Option<String>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Insert sample questions into every empty subject.
    Seed,
    /// Copy questions from the old one-table-per-subject layout.
    ImportLegacy,
}

#[derive(Debug)]
enum ArgsError {
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Logs go to stderr so they never interleave with prompts; `RUST_LOG` overrides the `warn` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn list(
    store: &QuestionStore,
    subject: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let groups = match subject {
        Some(raw) => {
            let subject = Subject::normalize(raw.trim())?;
            vec![(subject, store.list_subject(subject).await?)]
        }
        None => store.list_grouped().await?,
    };

    let mut out = io::stdout().lock();
    if json {
        let questions: Vec<_> = groups.into_iter().flat_map(|(_, qs)| qs).collect();
        serde_json::to_writer_pretty(&mut out, &questions)?;
        io::Write::write_all(&mut out, b"\n")?;
    } else {
        for (subject, questions) in &groups {
            menu::print_group(&mut out, *subject, questions)?;
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let db_url = normalize_sqlite_url(cli.db);
    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url).await?;
    let store = QuestionStore::new(Arc::clone(&storage.questions));

    match cli.command.unwrap_or(Command::Take) {
        Command::Take => {
            let shuffle = cli.seed.map_or(ShuffleSource::Thread, ShuffleSource::Seeded);
            let service = QuizService::new(Clock::System, store).with_shuffle(shuffle);
            take::run(&service, &mut io::stdin().lock(), &mut io::stdout().lock()).await?;
        }
        Command::Manage => {
            menu::run(&store, &mut io::stdin().lock(), &mut io::stdout().lock()).await?;
        }
        Command::List { subject, json } => list(&store, subject.as_deref(), json).await?,
        Command::Seed => {
            let seeded = seed::seed_empty_subjects(&store).await?;
            if seeded.is_empty() {
                println!("Every subject already has questions; nothing seeded.");
            }
            for (subject, count) in seeded {
                println!("Seeded {count} questions into {subject}");
            }
        }
        Command::ImportLegacy => {
            let repo = SqliteRepository::connect(&db_url).await?;
            let report = repo.import_legacy_tables().await?;
            if report.imported.is_empty() && report.already_imported.is_empty() {
                println!("No legacy subject tables found in {db_url}");
            }
            for (subject, count) in &report.imported {
                println!("Imported {count} questions into {subject}");
            }
            for (subject, count) in &report.skipped {
                println!("Skipped {count} {subject} rows with a blank field");
            }
            for subject in &report.already_imported {
                println!("{subject} was already imported; left unchanged");
            }
            tracing::info!(
                total = report.total(),
                skipped = report.total_skipped(),
                "legacy import finished"
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/q.db".into()),
            "sqlite:///tmp/q.db"
        );
        assert_eq!(normalize_sqlite_url("/tmp/q.db".into()), "sqlite:///tmp/q.db");
        assert_eq!(
            normalize_sqlite_url("sqlite:/var/q.db".into()),
            "sqlite:///var/q.db"
        );

        let relative = normalize_sqlite_url("quiz.sqlite3".into());
        assert!(relative.starts_with("sqlite://"));
        assert!(relative.ends_with("/quiz.sqlite3"));
    }

    #[test]
    fn prepare_rejects_non_file_urls() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
        assert!(prepare_sqlite_file("postgres://x").is_err());
        assert!(prepare_sqlite_file("sqlite://").is_err());
    }

    #[test]
    fn take_is_the_default_command() {
        let cli = Cli::try_parse_from(["quiz", "--seed", "3"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.seed, Some(3));

        let cli = Cli::try_parse_from(["quiz", "list", "m", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::List { subject: Some(ref s), json: true }) if s == "m"
        ));
    }
}
