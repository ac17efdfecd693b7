//! Domain model for the active/trash note collections.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`, never by position.
//! - Moving a note between collections is one change to one `Notebook`.

pub mod note;
