//! Flutter bridge surface for NoteHub.

pub mod api;
