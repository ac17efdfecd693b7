//! View state for the two note tabs.
//!
//! # Responsibility
//! - Hold the state a screen renders, derived only from service results.
//! - Translate display positions (most recent first) into stable note ids.
//!
//! # Invariants
//! - Rows are rebuilt from the collection a service call returns; views
//!   never edit rows in place.
//! - Rendering concerns (layout, styling, navigation) live in the shell.

pub mod active_list;
pub mod trash_list;

use crate::model::note::{Note, NoteId};
use crate::service::note_service::derive_preview;

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: NoteId,
    pub text: String,
    /// Single-line summary for compact layouts.
    pub preview: String,
}

impl NoteRow {
    pub fn from_note(note: &Note) -> Self {
        Self {
            id: note.id,
            text: note.text.clone(),
            preview: derive_preview(&note.text),
        }
    }
}

/// Builds rows in display order: most recent first.
pub fn rows_most_recent_first(notes: &[Note]) -> Vec<NoteRow> {
    notes.iter().rev().map(NoteRow::from_note).collect()
}
