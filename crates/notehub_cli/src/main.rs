//! NoteHub command line front end.
//!
//! # Responsibility
//! - Drive the home and trash tab state from a terminal.
//! - Share configuration and logging setup with the FFI surface.
//!
//! # Invariants
//! - Row numbers are 1-based and follow display order (most recent first).
//! - Output is deterministic for a given database state.

use clap::{Parser, Subcommand};
use log::info;
use notehub_core::config::{DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
use notehub_core::db::open_db;
use notehub_core::{
    core_version, default_log_level, init_logging_from_config, ActiveListView, CoreConfig,
    KvNoteRepository, NoteRepository, NoteRow, NoteService, SqliteKvStore, TrashListView,
};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "notehub")]
#[command(about = "Local notes with a recoverable trash")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database file
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = LOG_LEVEL_ENV)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = LOG_DIR_ENV)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List active notes, most recent first
    List,
    /// List trashed notes, most recently trashed first
    Trash,
    /// Add a note
    Add {
        /// Note text
        text: String,
    },
    /// Replace the text of the note at row N
    Edit {
        /// Row number shown by `list`
        row: usize,
        /// New note text
        text: String,
    },
    /// Move the note at row N to trash
    Delete {
        /// Row number shown by `list`
        row: usize,
    },
    /// Move the trashed note at row N back to the active list
    Recover {
        /// Row number shown by `trash`
        row: usize,
    },
    /// Delete the trashed note at row N for good
    Purge {
        /// Row number shown by `trash`
        row: usize,
    },
    /// Delete every trashed note for good
    EmptyTrash,
    /// Print the core version
    Version,
}

#[derive(Debug)]
enum CliError {
    Open(String),
    EmptyText,
    NoSuchRow(usize),
    Failed(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(message) => write!(f, "cannot open notes: {message}"),
            Self::EmptyText => write!(f, "note text is empty"),
            Self::NoSuchRow(row) => write!(f, "no note at row {row}"),
            Self::Failed(message) => write!(f, "operation failed: {message}"),
        }
    }
}

impl std::error::Error for CliError {}

type CliResult<T> = Result<T, CliError>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> CoreConfig {
    // Flags already absorb the env vars; only the defaults come from config.
    let defaults = CoreConfig::from_lookup(|_| None);
    CoreConfig {
        db_path: cli.db.clone().unwrap_or(defaults.db_path),
        log_level: cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string()),
        log_dir: cli.log_dir.clone(),
    }
}

fn run(command: Command, config: &CoreConfig) -> CliResult<()> {
    if matches!(command, Command::Version) {
        println!("notehub {}", core_version());
        return Ok(());
    }

    let mut conn = open_db(&config.db_path).map_err(|err| CliError::Open(err.to_string()))?;
    let store = SqliteKvStore::try_new(&mut conn).map_err(|err| CliError::Open(err.to_string()))?;
    let mut service = NoteService::new(KvNoteRepository::new(store));
    info!(
        "event=cli_command module=cli status=start db_path={}",
        config.db_path.display()
    );

    let mut home = ActiveListView::new();
    let mut trash = TrashListView::new();
    match command {
        Command::List => {
            home.on_focus(&mut service);
            check(&service)?;
            print_rows(home.rows(), home.empty_label());
        }
        Command::Trash => {
            trash.on_focus(&mut service);
            check(&service)?;
            print_rows(trash.rows(), trash.empty_label());
        }
        Command::Add { text } => {
            if text.is_empty() {
                return Err(CliError::EmptyText);
            }
            home.on_focus(&mut service);
            home.open_new();
            home.set_draft(text);
            if !home.submit(&mut service) {
                return Err(failure(&service));
            }
            print_rows(home.rows(), home.empty_label());
        }
        Command::Edit { row, text } => {
            if text.is_empty() {
                return Err(CliError::EmptyText);
            }
            home.on_focus(&mut service);
            check(&service)?;
            if !home.select(display_index(row)?) {
                return Err(CliError::NoSuchRow(row));
            }
            home.set_draft(text);
            if !home.submit(&mut service) {
                return Err(failure(&service));
            }
            print_rows(home.rows(), home.empty_label());
        }
        Command::Delete { row } => {
            home.on_focus(&mut service);
            check(&service)?;
            if !home.select(display_index(row)?) {
                return Err(CliError::NoSuchRow(row));
            }
            if !home.delete_selected(&mut service) {
                return Err(failure(&service));
            }
            print_rows(home.rows(), home.empty_label());
        }
        Command::Recover { row } => {
            trash.on_focus(&mut service);
            check(&service)?;
            let index = display_index(row)?;
            if index >= trash.rows().len() {
                return Err(CliError::NoSuchRow(row));
            }
            if !trash.recover(&mut service, index) {
                return Err(failure(&service));
            }
            print_rows(trash.rows(), trash.empty_label());
        }
        Command::Purge { row } => {
            trash.on_focus(&mut service);
            check(&service)?;
            let index = display_index(row)?;
            if index >= trash.rows().len() {
                return Err(CliError::NoSuchRow(row));
            }
            if !trash.delete_forever(&mut service, index) {
                return Err(failure(&service));
            }
            print_rows(trash.rows(), trash.empty_label());
        }
        Command::EmptyTrash => {
            if !trash.delete_all(&mut service) {
                return Err(failure(&service));
            }
            print_rows(trash.rows(), trash.empty_label());
        }
        Command::Version => {}
    }
    Ok(())
}

fn display_index(row: usize) -> CliResult<usize> {
    row.checked_sub(1).ok_or(CliError::NoSuchRow(row))
}

fn check<R: NoteRepository>(service: &NoteService<R>) -> CliResult<()> {
    match service.last_error() {
        None => Ok(()),
        Some(err) => Err(CliError::Failed(err.to_string())),
    }
}

fn failure<R: NoteRepository>(service: &NoteService<R>) -> CliError {
    match service.last_error() {
        Some(err) => CliError::Failed(err.to_string()),
        None => CliError::Failed("nothing changed".to_string()),
    }
}

fn print_rows(rows: &[NoteRow], empty_label: Option<&str>) {
    if let Some(label) = empty_label {
        println!("{label}");
        return;
    }
    for (position, row) in rows.iter().enumerate() {
        println!("{:>3}. {}", position + 1, row.preview);
    }
}

#[cfg(test)]
mod tests {
    use super::{display_index, Cli, CliError, Command};
    use clap::Parser;

    #[test]
    fn row_numbers_are_one_based() {
        assert_eq!(display_index(1).unwrap(), 0);
        assert!(matches!(display_index(0), Err(CliError::NoSuchRow(0))));
    }

    #[test]
    fn parses_edit_with_global_db_flag() {
        let cli = Cli::try_parse_from(["notehub", "edit", "2", "new text", "--db", "/tmp/n.db"])
            .expect("valid args");
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/n.db")));
        match cli.command {
            Command::Edit { row, text } => {
                assert_eq!(row, 2);
                assert_eq!(text, "new text");
            }
            _ => panic!("expected edit command"),
        }
    }

    #[test]
    fn parses_empty_trash_subcommand() {
        let cli = Cli::try_parse_from(["notehub", "empty-trash"]).expect("valid args");
        assert!(matches!(cli.command, Command::EmptyTrash));
    }
}
