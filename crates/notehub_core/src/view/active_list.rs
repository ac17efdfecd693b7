//! Home tab: active notes plus the create/edit flow.

use super::{rows_most_recent_first, NoteRow};
use crate::model::note::NoteId;
use crate::repo::note_repo::NoteRepository;
use crate::service::note_service::NoteService;

/// Placeholder shown when there are no active notes.
pub const EMPTY_NOTES_LABEL: &str = "Empty Notes";

/// Editor sheet state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    /// Composing a new note.
    Creating { draft: String },
    /// Editing an existing note, seeded with its text at selection time.
    Editing { id: NoteId, draft: String },
}

/// State rendered by the home tab.
#[derive(Debug, Clone, Default)]
pub struct ActiveListView {
    rows: Vec<NoteRow>,
    editor: EditorState,
}

impl ActiveListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in display order, most recent first.
    pub fn rows(&self) -> &[NoteRow] {
        &self.rows
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// Placeholder text when the list is empty.
    pub fn empty_label(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(EMPTY_NOTES_LABEL)
    }

    /// Reloads rows when the tab gains focus.
    pub fn on_focus<R: NoteRepository>(&mut self, service: &mut NoteService<R>) {
        let active = service.load_active();
        self.rows = rows_most_recent_first(&active);
    }

    /// Opens an empty editor for a new note.
    pub fn open_new(&mut self) {
        self.editor = EditorState::Creating {
            draft: String::new(),
        };
    }

    /// Opens the editor on the row at `display_index`.
    ///
    /// Returns `false` when no such row exists.
    pub fn select(&mut self, display_index: usize) -> bool {
        let Some(row) = self.rows.get(display_index) else {
            return false;
        };
        self.editor = EditorState::Editing {
            id: row.id,
            draft: row.text.clone(),
        };
        true
    }

    /// Replaces the editor draft; ignored while the editor is closed.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        match &mut self.editor {
            EditorState::Closed => {}
            EditorState::Creating { draft } | EditorState::Editing { draft, .. } => {
                *draft = text.into();
            }
        }
    }

    pub fn cancel(&mut self) {
        self.editor = EditorState::Closed;
    }

    /// Saves the draft and closes the editor on success.
    ///
    /// An empty draft keeps the editor open. Returns whether the note was
    /// persisted.
    pub fn submit<R: NoteRepository>(&mut self, service: &mut NoteService<R>) -> bool {
        let active = match &self.editor {
            EditorState::Closed => return false,
            EditorState::Creating { draft } | EditorState::Editing { draft, .. }
                if draft.is_empty() =>
            {
                return false;
            }
            EditorState::Creating { draft } => service.save_note(draft, None),
            EditorState::Editing { id, draft } => service.save_edited_note(draft, *id),
        };

        self.rows = rows_most_recent_first(&active);
        let saved = service.last_error().is_none();
        if saved {
            self.editor = EditorState::Closed;
        }
        saved
    }

    /// Moves the note being edited to trash and closes the editor.
    pub fn delete_selected<R: NoteRepository>(&mut self, service: &mut NoteService<R>) -> bool {
        let EditorState::Editing { id, .. } = &self.editor else {
            return false;
        };
        let notebook = service.move_to_trash(*id);
        self.rows = rows_most_recent_first(&notebook.active);
        let moved = service.last_error().is_none();
        if moved {
            self.editor = EditorState::Closed;
        }
        moved
    }
}
