//! Repository layer over the key-value store.
//!
//! # Responsibility
//! - Define the note collection access contract (`NoteRepository`).
//! - Keep the persisted record format inside `notebook_codec`.
//!
//! # Invariants
//! - Repository APIs return typed errors; degrading to defaults is the
//!   service layer's job, except for corrupt records which read as empty.

pub mod note_repo;
pub mod notebook_codec;
