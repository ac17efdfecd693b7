//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the home/trash tab operations to Dart via FRB.
//! - Map core degrade semantics onto simple envelopes for the UI.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the configured database, so consecutive calls always
//!   observe each other's writes.
//! - Lists are returned in display order (most recent first).
//! - Rejected input still returns the current list, so the shell never
//!   renders an empty placeholder over existing notes.

use notehub_core::db::open_db;
use notehub_core::view::rows_most_recent_first;
use notehub_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, KvNoteRepository, NoteId, NoteRow, NoteService, Notebook, SqliteKvStore,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
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
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One note row as rendered by the home or trash tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    /// Stable note ID in string form.
    pub note_id: String,
    /// Full note text.
    pub text: String,
    /// Single-line summary.
    pub preview: String,
}

/// List envelope returned by every tab call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesResponse {
    /// Whether the requested operation took effect (or was a no-op).
    pub ok: bool,
    /// Rows in display order; the last known state when `ok` is false.
    /// Empty only when the database cannot be opened.
    pub items: Vec<NoteItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl NotesResponse {
    fn from_rows(ok: bool, rows: Vec<NoteRow>, message: String) -> Self {
        Self {
            ok,
            items: rows.into_iter().map(to_note_item).collect(),
            message,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message,
        }
    }
}

/// Which collection a call renders.
#[derive(Debug, Clone, Copy)]
enum Tab {
    Home,
    Trash,
}

impl Tab {
    fn rows(self, notebook: &Notebook) -> Vec<NoteRow> {
        match self {
            Self::Home => rows_most_recent_first(&notebook.active),
            Self::Trash => rows_most_recent_first(&notebook.trash),
        }
    }
}

/// What a call did, before the service's error state is folded in.
enum Outcome {
    Done(Vec<NoteRow>, &'static str),
    Rejected(Vec<NoteRow>, String),
}

/// Lists active notes for the home tab.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesResponse {
    with_note_service("notes_list", |service| {
        let active = service.load_active();
        Outcome::Done(rows_most_recent_first(&active), "Notes loaded.")
    })
}

/// Lists trashed notes for the trash tab.
#[flutter_rust_bridge::frb(sync)]
pub fn trash_list() -> NotesResponse {
    with_note_service("trash_list", |service| {
        let trash = service.load_trash();
        Outcome::Done(rows_most_recent_first(&trash), "Trash loaded.")
    })
}

/// Saves a new note, or edits `edit_note_id` in place when given.
///
/// Empty text is a successful no-op. Returns the refreshed home list.
#[flutter_rust_bridge::frb(sync)]
pub fn note_save(text: String, edit_note_id: Option<String>) -> NotesResponse {
    with_note_service("note_save", |service| {
        let current = service.refresh();
        let edit = match edit_note_id.as_deref().map(parse_note_id).transpose() {
            Ok(edit) => edit,
            Err(message) => return Outcome::Rejected(Tab::Home.rows(&current), message),
        };
        if text.is_empty() {
            return Outcome::Done(Tab::Home.rows(&current), "Nothing to save.");
        }
        let active = service.save_note(&text, edit);
        Outcome::Done(rows_most_recent_first(&active), "Note saved.")
    })
}

/// Moves one active note to trash; returns the refreshed home list.
#[flutter_rust_bridge::frb(sync)]
pub fn note_move_to_trash(note_id: String) -> NotesResponse {
    with_parsed_id("note_move_to_trash", &note_id, Tab::Home, |service, id| {
        let notebook = service.move_to_trash(id);
        (Tab::Home.rows(&notebook), "Note moved to trash.")
    })
}

/// Recovers one trashed note; returns the refreshed trash list.
#[flutter_rust_bridge::frb(sync)]
pub fn trash_recover(note_id: String) -> NotesResponse {
    with_parsed_id("trash_recover", &note_id, Tab::Trash, |service, id| {
        let notebook = service.recover_note(id);
        (Tab::Trash.rows(&notebook), "Note recovered.")
    })
}

/// Deletes one trashed note for good; returns the refreshed trash list.
#[flutter_rust_bridge::frb(sync)]
pub fn trash_delete_forever(note_id: String) -> NotesResponse {
    with_parsed_id("trash_delete_forever", &note_id, Tab::Trash, |service, id| {
        let trash = service.delete_permanently(id);
        (rows_most_recent_first(&trash), "Note deleted.")
    })
}

/// Empties the trash; returns the (empty) trash list.
#[flutter_rust_bridge::frb(sync)]
pub fn trash_delete_all() -> NotesResponse {
    with_note_service("trash_delete_all", |service| {
        let trash = service.delete_all_trash();
        Outcome::Done(rows_most_recent_first(&trash), "Trash emptied.")
    })
}

fn resolve_db_path() -> PathBuf {
    if let Some(path) = db_path_override() {
        return path;
    }
    DB_PATH
        .get_or_init(|| CoreConfig::from_env().db_path)
        .clone()
}

#[cfg(test)]
fn db_path_override() -> Option<PathBuf> {
    tests::TEST_DB_PATH.with(|path| path.borrow().clone())
}

#[cfg(not(test))]
fn db_path_override() -> Option<PathBuf> {
    None
}

type FfiService<'conn> = NoteService<KvNoteRepository<SqliteKvStore<'conn>>>;

fn with_note_service(op: &str, f: impl FnOnce(&mut FfiService<'_>) -> Outcome) -> NotesResponse {
    let db_path = resolve_db_path();
    let mut conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            warn!("event=ffi_call module=ffi op={} status=error error={}", op, err);
            return NotesResponse::failure(format!("{op} failed: DB open failed: {err}"));
        }
    };
    let store = match SqliteKvStore::try_new(&mut conn) {
        Ok(store) => store,
        Err(err) => {
            warn!("event=ffi_call module=ffi op={} status=error error={}", op, err);
            return NotesResponse::failure(format!("{op} failed: store init failed: {err}"));
        }
    };
    let mut service = NoteService::new(KvNoteRepository::new(store));

    match f(&mut service) {
        Outcome::Rejected(rows, message) => {
            warn!("event=ffi_call module=ffi op={} status=rejected", op);
            NotesResponse::from_rows(false, rows, format!("{op} rejected: {message}"))
        }
        Outcome::Done(rows, success_message) => match service.last_error() {
            None => NotesResponse::from_rows(true, rows, success_message.to_string()),
            Some(err) => {
                warn!("event=ffi_call module=ffi op={} status=error error={}", op, err);
                NotesResponse::from_rows(false, rows, format!("{op} failed: {err}"))
            }
        },
    }
}

fn with_parsed_id(
    op: &str,
    raw_id: &str,
    tab: Tab,
    f: impl FnOnce(&mut FfiService<'_>, NoteId) -> (Vec<NoteRow>, &'static str),
) -> NotesResponse {
    with_note_service(op, |service| {
        let current = service.refresh();
        match parse_note_id(raw_id) {
            Ok(id) => {
                let (rows, message) = f(service, id);
                Outcome::Done(rows, message)
            }
            Err(message) => Outcome::Rejected(tab.rows(&current), message),
        }
    })
}

fn parse_note_id(raw: &str) -> Result<NoteId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid note id `{raw}`"))
}

fn to_note_item(row: NoteRow) -> NoteItem {
    NoteItem {
        note_id: row.id.to_string(),
        text: row.text,
        preview: row.preview,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, note_move_to_trash, note_save, notes_list, ping,
        trash_delete_all, trash_delete_forever, trash_list, trash_recover,
    };
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::TempDir;

    thread_local! {
        pub(super) static TEST_DB_PATH: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
    }

    /// Points this test thread at a fresh database removed with the dir.
    fn scoped_db() -> TempDir {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("notehub.sqlite3");
        TEST_DB_PATH.with(|slot| *slot.borrow_mut() = Some(path));
        dir
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn empty_save_is_ok_and_keeps_current_items() {
        let _db = scoped_db();
        assert!(note_save("keep".to_string(), None).ok);

        let response = note_save(String::new(), None);
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].text, "keep");
    }

    #[test]
    fn whitespace_save_creates_a_note() {
        let _db = scoped_db();
        let response = note_save("   ".to_string(), None);
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.items.len(), 1);
    }

    #[test]
    fn invalid_ids_are_rejected_with_current_items() {
        let _db = scoped_db();
        let created = note_save("keep".to_string(), None);
        let id = created.items[0].note_id.clone();
        assert!(note_move_to_trash(id).ok);
        assert!(note_save("home".to_string(), None).ok);

        let edit = note_save("x".to_string(), Some("not-a-uuid".to_string()));
        assert!(!edit.ok);
        assert!(edit.message.contains("invalid note id"));
        assert_eq!(edit.items.len(), 1);
        assert_eq!(edit.items[0].text, "home");

        let recover = trash_recover("not-a-uuid".to_string());
        assert!(!recover.ok);
        assert_eq!(recover.items.len(), 1);
        assert_eq!(recover.items[0].text, "keep");
    }

    #[test]
    fn save_trash_recover_and_delete_flow() {
        let _db = scoped_db();
        let created = note_save("draft".to_string(), None);
        assert!(created.ok, "{}", created.message);
        let item = created.items[0].clone();

        let edited = note_save("draft edited".to_string(), Some(item.note_id.clone()));
        assert!(edited.ok, "{}", edited.message);
        assert_eq!(edited.items.len(), 1);
        assert_eq!(edited.items[0].note_id, item.note_id);
        assert_eq!(edited.items[0].text, "draft edited");

        let moved = note_move_to_trash(item.note_id.clone());
        assert!(moved.ok, "{}", moved.message);
        assert!(moved.items.is_empty());
        assert_eq!(trash_list().items[0].note_id, item.note_id);

        let recovered = trash_recover(item.note_id.clone());
        assert!(recovered.ok, "{}", recovered.message);
        assert!(recovered.items.is_empty());
        assert_eq!(notes_list().items[0].note_id, item.note_id);

        assert!(note_move_to_trash(item.note_id.clone()).ok);
        let deleted = trash_delete_forever(item.note_id.clone());
        assert!(deleted.ok, "{}", deleted.message);
        assert!(deleted.items.is_empty());

        let missing = trash_recover(item.note_id);
        assert!(!missing.ok);
    }

    #[test]
    fn trash_delete_all_leaves_trash_empty() {
        let _db = scoped_db();
        for text in ["one", "two"] {
            let created = note_save(text.to_string(), None);
            let id = created.items[0].note_id.clone();
            assert!(note_move_to_trash(id).ok);
        }
        assert_eq!(trash_list().items.len(), 2);

        let response = trash_delete_all();
        assert!(response.ok, "{}", response.message);
        assert!(response.items.is_empty());
    }
}
