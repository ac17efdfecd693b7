//! Note use-case service.
//!
//! # Responsibility
//! - Expose the note operations views call on focus and on user actions.
//! - Apply the degrade policy: failures are logged, never surfaced, and the
//!   last known state is returned instead.
//! - Resolve storage-order positions to stable ids for positional callers.
//!
//! # Invariants
//! - Every public operation returns a collection, never an error.
//! - The in-memory notebook only changes after a successful read or write,
//!   except after a `Conflict`, which triggers a best-effort reload.
//! - `last_error` reflects the most recent operation only.

use crate::model::note::{Note, NoteId, Notebook};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_MAX_CHARS: usize = 80;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    notebook: Notebook,
    last_error: Option<RepoError>,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service with an empty in-memory notebook.
    ///
    /// Nothing is read until the first `load_*` call.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            notebook: Notebook::default(),
            last_error: None,
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    /// Last known state of both collections.
    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    /// Failure of the most recent operation, if it failed.
    pub fn last_error(&self) -> Option<&RepoError> {
        self.last_error.as_ref()
    }

    /// Reloads both collections; keeps the last known state on failure.
    pub fn refresh(&mut self) -> Notebook {
        let result = self.repo.load_notebook();
        self.settle("load_notebook", result);
        self.notebook.clone()
    }

    /// Reads active notes in creation order.
    pub fn load_active(&mut self) -> Vec<Note> {
        self.refresh().active
    }

    /// Reads trashed notes in trashing order.
    pub fn load_trash(&mut self) -> Vec<Note> {
        self.refresh().trash
    }

    /// Appends a note, or replaces the text of `edit` in place.
    ///
    /// Empty text leaves everything untouched; whitespace is a note.
    pub fn save_note(&mut self, text: &str, edit: Option<NoteId>) -> Vec<Note> {
        if text.is_empty() {
            self.last_error = None;
            return self.notebook.active.clone();
        }
        let result = self.repo.save_note(text, edit);
        self.settle("save_note", result);
        self.notebook.active.clone()
    }

    /// Positional form of `save_note`; `edit_index` is in storage order.
    pub fn save_note_at(&mut self, text: &str, edit_index: Option<usize>) -> Vec<Note> {
        if text.is_empty() {
            return self.save_note(text, None);
        }
        let edit = match edit_index {
            None => None,
            Some(index) => match self.active_id_at("save_note", index) {
                Some(id) => Some(id),
                None => return self.notebook.active.clone(),
            },
        };
        self.save_note(text, edit)
    }

    /// Replaces the text of the note with `id`, keeping its position.
    pub fn save_edited_note(&mut self, text: &str, id: NoteId) -> Vec<Note> {
        let result = self.repo.save_edited_note(text, id);
        self.settle("save_edited_note", result);
        self.notebook.active.clone()
    }

    /// Positional form of `save_edited_note`; `index` is in storage order.
    pub fn save_edited_note_at(&mut self, text: &str, index: usize) -> Vec<Note> {
        if let Some(id) = self.active_id_at("save_edited_note", index) {
            return self.save_edited_note(text, id);
        }
        self.notebook.active.clone()
    }

    /// Moves one active note to the end of the trash.
    pub fn move_to_trash(&mut self, id: NoteId) -> Notebook {
        let result = self.repo.move_to_trash(id);
        self.settle("move_to_trash", result);
        self.notebook.clone()
    }

    /// Positional form of `move_to_trash`; `index` is in storage order.
    pub fn move_to_trash_at(&mut self, index: usize) -> Notebook {
        if let Some(id) = self.active_id_at("move_to_trash", index) {
            return self.move_to_trash(id);
        }
        self.notebook.clone()
    }

    /// Moves one trashed note to the end of the active collection.
    pub fn recover_note(&mut self, id: NoteId) -> Notebook {
        let result = self.repo.recover_note(id);
        self.settle("recover_note", result);
        self.notebook.clone()
    }

    /// Positional form of `recover_note`; `index` is in trashing order.
    pub fn recover_note_at(&mut self, index: usize) -> Notebook {
        if let Some(id) = self.trash_id_at("recover_note", index) {
            return self.recover_note(id);
        }
        self.notebook.clone()
    }

    /// Drops one trashed note for good.
    pub fn delete_permanently(&mut self, id: NoteId) -> Vec<Note> {
        let result = self.repo.delete_permanently(id);
        self.settle("delete_permanently", result);
        self.notebook.trash.clone()
    }

    /// Positional form of `delete_permanently`; `index` is in trashing order.
    pub fn delete_permanently_at(&mut self, index: usize) -> Vec<Note> {
        if let Some(id) = self.trash_id_at("delete_permanently", index) {
            return self.delete_permanently(id);
        }
        self.notebook.trash.clone()
    }

    /// Empties the trash.
    pub fn delete_all_trash(&mut self) -> Vec<Note> {
        let result = self.repo.delete_all_trash();
        self.settle("delete_all_trash", result);
        self.notebook.trash.clone()
    }

    fn active_id_at(&mut self, op: &'static str, index: usize) -> Option<NoteId> {
        let found = self.notebook.active.get(index).map(|note| note.id);
        if found.is_none() {
            self.record_index_miss(op, index, self.notebook.active.len());
        }
        found
    }

    fn trash_id_at(&mut self, op: &'static str, index: usize) -> Option<NoteId> {
        let found = self.notebook.trash.get(index).map(|note| note.id);
        if found.is_none() {
            self.record_index_miss(op, index, self.notebook.trash.len());
        }
        found
    }

    fn record_index_miss(&mut self, op: &'static str, index: usize, len: usize) {
        let err = RepoError::IndexOutOfRange { index, len };
        warn!(
            "event=note_service module=service op={} status=degraded error={}",
            op, err
        );
        self.last_error = Some(err);
    }

    fn settle(&mut self, op: &'static str, result: RepoResult<Notebook>) {
        match result {
            Ok(notebook) => {
                self.notebook = notebook;
                self.last_error = None;
            }
            Err(err) => {
                warn!(
                    "event=note_service module=service op={} status=degraded error={}",
                    op, err
                );
                if matches!(err, RepoError::Conflict) {
                    if let Ok(fresh) = self.repo.load_notebook() {
                        self.notebook = fresh;
                    }
                }
                self.last_error = Some(err);
            }
        }
    }
}

/// Single-line summary for list rows.
///
/// Whitespace runs collapse to one space; text is cut to 80 chars with a
/// trailing ellipsis when longer.
pub fn derive_preview(text: &str) -> String {
    let normalized = WHITESPACE_RE.replace_all(text.trim(), " ");
    let mut preview: String = normalized.chars().take(PREVIEW_MAX_CHARS).collect();
    if normalized.chars().count() > PREVIEW_MAX_CHARS {
        preview.push('…');
    }
    preview
}
