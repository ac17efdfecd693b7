//! Note and notebook domain model.
//!
//! # Responsibility
//! - Define the note record shared by the active and trash collections.
//! - Own the collection-level move/recover/purge rules as pure operations.
//!
//! # Invariants
//! - `NoteId` is stable and never reused for another note.
//! - A note id lives in at most one collection, at most once.
//! - `trashed_at` is `Some` exactly for notes held in `Notebook::trash`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier assigned to every note at creation.
pub type NoteId = Uuid;

/// Version of the persisted `Notebook` record written by this build.
pub const NOTEBOOK_FORMAT_VERSION: u32 = 1;

/// One user note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Note body as typed by the user.
    pub text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last text change.
    pub updated_at: i64,
    /// Unix epoch milliseconds when the note was moved to trash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trashed_at: Option<i64>,
}

impl Note {
    /// Creates a new active note with a generated id.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), text, now_epoch_ms())
    }

    /// Creates an active note with a caller-provided id and creation time.
    ///
    /// Used by the legacy import path and by tests.
    pub fn with_id(id: NoteId, text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            text: text.into(),
            created_at,
            updated_at: created_at,
            trashed_at: None,
        }
    }

    /// Replaces the body and bumps `updated_at`.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.updated_at = now_epoch_ms();
    }

    pub fn is_trashed(&self) -> bool {
        self.trashed_at.is_some()
    }
}

/// Validation failures for a decoded notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotebookValidationError {
    /// The same id occurs twice across both collections.
    DuplicateId(NoteId),
    /// An active note carries `trashed_at`, or a trashed one lacks it.
    MisplacedNote(NoteId),
}

impl Display for NotebookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "note id {id} appears more than once"),
            Self::MisplacedNote(id) => {
                write!(f, "note {id} trash marker does not match its collection")
            }
        }
    }
}

impl Error for NotebookValidationError {}

/// Composite record holding both collections.
///
/// Persisted as one value so a move between collections is a single write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub version: u32,
    /// Active notes in creation order.
    #[serde(default)]
    pub active: Vec<Note>,
    /// Trashed notes in trashing order.
    #[serde(default)]
    pub trash: Vec<Note>,
}

impl Default for Notebook {
    fn default() -> Self {
        Self {
            version: NOTEBOOK_FORMAT_VERSION,
            active: Vec::new(),
            trash: Vec::new(),
        }
    }
}

impl Notebook {
    /// Checks the collection invariants.
    pub fn validate(&self) -> Result<(), NotebookValidationError> {
        let mut seen = std::collections::HashSet::new();
        for note in &self.active {
            if !seen.insert(note.id) {
                return Err(NotebookValidationError::DuplicateId(note.id));
            }
            if note.is_trashed() {
                return Err(NotebookValidationError::MisplacedNote(note.id));
            }
        }
        for note in &self.trash {
            if !seen.insert(note.id) {
                return Err(NotebookValidationError::DuplicateId(note.id));
            }
            if !note.is_trashed() {
                return Err(NotebookValidationError::MisplacedNote(note.id));
            }
        }
        Ok(())
    }

    pub fn active_position(&self, id: NoteId) -> Option<usize> {
        self.active.iter().position(|note| note.id == id)
    }

    pub fn trash_position(&self, id: NoteId) -> Option<usize> {
        self.trash.iter().position(|note| note.id == id)
    }

    /// Appends a new active note and returns its id.
    pub fn push_active(&mut self, note: Note) -> NoteId {
        let id = note.id;
        self.active.push(note);
        id
    }

    /// Replaces the text of an active note in place.
    ///
    /// Returns `false` when `id` is not an active note.
    pub fn edit_active(&mut self, id: NoteId, text: &str) -> bool {
        match self.active.iter_mut().find(|note| note.id == id) {
            Some(note) => {
                note.set_text(text);
                true
            }
            None => false,
        }
    }

    /// Moves an active note to the end of the trash.
    pub fn trash_note(&mut self, id: NoteId) -> bool {
        let Some(position) = self.active_position(id) else {
            return false;
        };
        let mut note = self.active.remove(position);
        note.trashed_at = Some(now_epoch_ms());
        self.trash.push(note);
        true
    }

    /// Moves a trashed note to the end of the active collection.
    pub fn recover_note(&mut self, id: NoteId) -> bool {
        let Some(position) = self.trash_position(id) else {
            return false;
        };
        let mut note = self.trash.remove(position);
        note.trashed_at = None;
        self.active.push(note);
        true
    }

    /// Removes a trashed note for good.
    pub fn purge_note(&mut self, id: NoteId) -> bool {
        let Some(position) = self.trash_position(id) else {
            return false;
        };
        self.trash.remove(position);
        true
    }

    /// Drops every trashed note and returns how many were removed.
    pub fn clear_trash(&mut self) -> usize {
        let removed = self.trash.len();
        self.trash.clear();
        removed
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{Note, Notebook, NotebookValidationError};

    #[test]
    fn trash_then_recover_appends_to_the_end() {
        let mut notebook = Notebook::default();
        let first = notebook.push_active(Note::new("first"));
        let second = notebook.push_active(Note::new("second"));

        assert!(notebook.trash_note(first));
        assert_eq!(notebook.active.len(), 1);
        assert!(notebook.trash[0].trashed_at.is_some());

        assert!(notebook.recover_note(first));
        let order: Vec<_> = notebook.active.iter().map(|note| note.id).collect();
        assert_eq!(order, vec![second, first]);
        assert!(notebook.active[1].trashed_at.is_none());
        notebook.validate().unwrap();
    }

    #[test]
    fn operations_on_unknown_ids_report_false() {
        let mut notebook = Notebook::default();
        let id = notebook.push_active(Note::new("only"));

        assert!(!notebook.recover_note(id));
        assert!(!notebook.purge_note(id));
        assert!(!notebook.edit_active(uuid::Uuid::new_v4(), "x"));
        assert_eq!(notebook.active.len(), 1);
    }

    #[test]
    fn validate_rejects_duplicate_ids_across_collections() {
        let mut notebook = Notebook::default();
        let note = Note::new("twin");
        let mut twin = note.clone();
        twin.trashed_at = Some(1);
        notebook.active.push(note.clone());
        notebook.trash.push(twin);

        assert_eq!(
            notebook.validate(),
            Err(NotebookValidationError::DuplicateId(note.id))
        );
    }

    #[test]
    fn validate_rejects_trash_marker_in_active() {
        let mut notebook = Notebook::default();
        let mut note = Note::new("stray");
        note.trashed_at = Some(5);
        notebook.active.push(note.clone());

        assert_eq!(
            notebook.validate(),
            Err(NotebookValidationError::MisplacedNote(note.id))
        );
    }
}
