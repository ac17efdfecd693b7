//! Trash tab: trashed notes with recover and delete-forever actions.

use super::{rows_most_recent_first, NoteRow};
use crate::repo::note_repo::NoteRepository;
use crate::service::note_service::NoteService;

/// Placeholder shown when the trash is empty.
pub const EMPTY_TRASH_LABEL: &str = "Empty Trash";

/// State rendered by the trash tab.
#[derive(Debug, Clone, Default)]
pub struct TrashListView {
    rows: Vec<NoteRow>,
}

impl TrashListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in display order, most recently trashed first.
    pub fn rows(&self) -> &[NoteRow] {
        &self.rows
    }

    pub fn empty_label(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(EMPTY_TRASH_LABEL)
    }

    pub fn on_focus<R: NoteRepository>(&mut self, service: &mut NoteService<R>) {
        let trash = service.load_trash();
        self.rows = rows_most_recent_first(&trash);
    }

    /// Moves the row at `display_index` back to the active list.
    pub fn recover<R: NoteRepository>(
        &mut self,
        service: &mut NoteService<R>,
        display_index: usize,
    ) -> bool {
        let Some(id) = self.rows.get(display_index).map(|row| row.id) else {
            return false;
        };
        let notebook = service.recover_note(id);
        self.rows = rows_most_recent_first(&notebook.trash);
        service.last_error().is_none()
    }

    /// Drops the row at `display_index` for good.
    pub fn delete_forever<R: NoteRepository>(
        &mut self,
        service: &mut NoteService<R>,
        display_index: usize,
    ) -> bool {
        let Some(id) = self.rows.get(display_index).map(|row| row.id) else {
            return false;
        };
        let trash = service.delete_permanently(id);
        self.rows = rows_most_recent_first(&trash);
        service.last_error().is_none()
    }

    /// Empties the trash.
    pub fn delete_all<R: NoteRepository>(&mut self, service: &mut NoteService<R>) -> bool {
        let trash = service.delete_all_trash();
        self.rows = rows_most_recent_first(&trash);
        service.last_error().is_none()
    }
}
