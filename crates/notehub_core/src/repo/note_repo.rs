//! Note repository contract and key-value implementation.
//!
//! # Responsibility
//! - Read and mutate the active/trash collections through a `KeyValueStore`.
//! - Apply every mutation as one read-modify-write of the composite record.
//!
//! # Invariants
//! - A mutation commits with compare-and-swap; a concurrent writer yields
//!   `RepoError::Conflict`, never a silent overwrite.
//! - A missing record reads as an empty notebook; a corrupt one reads as
//!   empty and is logged.
//! - A record from a newer format version is never overwritten.
//! - A legacy import commits only if the legacy keys still hold the values
//!   it was built from; otherwise the composite write is undone and the
//!   mutation fails with `Conflict`.
//! - Note text is never written to logs.

use crate::model::note::{now_epoch_ms, Note, NoteId, Notebook};
use crate::repo::notebook_codec::{
    decode_legacy_collection, decode_notebook, encode_notebook, LEGACY_ACTIVE_KEY,
    LEGACY_TRASH_KEY, NOTEBOOK_KEY,
};
use crate::store::{KeyValueStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and mutation.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying store failed.
    Store(StoreError),
    /// Stored JSON does not match the expected shape.
    Codec(serde_json::Error),
    /// Stored record was written by a newer build.
    UnsupportedVersion { found: u32, supported: u32 },
    /// Target note does not exist in the expected collection.
    NotFound(NoteId),
    /// Positional lookup past the end of a collection.
    IndexOutOfRange { index: usize, len: usize },
    /// Another writer changed the record between read and write.
    Conflict,
    /// Stored record breaks notebook invariants.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "invalid notebook json: {err}"),
            Self::UnsupportedVersion { found, supported } => write!(
                f,
                "notebook format version {found} is newer than supported {supported}"
            ),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "note index {index} out of range for {len} note(s)")
            }
            Self::Conflict => write!(f, "notebook changed concurrently; reload and retry"),
            Self::InvalidData(message) => write!(f, "invalid persisted notebook: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(value)
    }
}

/// Repository interface for the active/trash note collections.
///
/// Mutators return the full notebook after the write so callers can
/// re-render both collections without another read.
pub trait NoteRepository {
    /// Reads both collections.
    fn load_notebook(&self) -> RepoResult<Notebook>;
    /// Reads active notes in creation order.
    fn load_active(&self) -> RepoResult<Vec<Note>> {
        Ok(self.load_notebook()?.active)
    }
    /// Reads trashed notes in trashing order.
    fn load_trash(&self) -> RepoResult<Vec<Note>> {
        Ok(self.load_notebook()?.trash)
    }
    /// Appends a new note, or replaces the text of `edit` in place.
    ///
    /// Empty text is a no-op that returns the stored notebook.
    fn save_note(&mut self, text: &str, edit: Option<NoteId>) -> RepoResult<Notebook>;
    /// Replaces the text of one active note, keeping its position.
    fn save_edited_note(&mut self, text: &str, id: NoteId) -> RepoResult<Notebook>;
    /// Moves one active note to the end of the trash.
    fn move_to_trash(&mut self, id: NoteId) -> RepoResult<Notebook>;
    /// Moves one trashed note to the end of the active collection.
    fn recover_note(&mut self, id: NoteId) -> RepoResult<Notebook>;
    /// Drops one trashed note for good.
    fn delete_permanently(&mut self, id: NoteId) -> RepoResult<Notebook>;
    /// Drops every trashed note.
    fn delete_all_trash(&mut self) -> RepoResult<Notebook>;
}

/// Stored record as read, with what is needed to commit a mutation.
struct Snapshot {
    raw: Option<String>,
    notebook: Notebook,
    /// Legacy keys and the raw values the notebook was imported from.
    legacy: Vec<(&'static str, Option<String>)>,
}

/// Note repository persisting one composite record in a key-value store.
pub struct KvNoteRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvNoteRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn read_snapshot(&self) -> RepoResult<Snapshot> {
        if let Some(raw) = self.store.get(NOTEBOOK_KEY)? {
            let notebook = match decode_notebook(&raw) {
                Ok(notebook) => notebook,
                Err(err @ RepoError::UnsupportedVersion { .. }) => return Err(err),
                Err(err) => {
                    warn!(
                        "event=notebook_read module=repo status=degraded error_code=notebook_corrupt error={}",
                        err
                    );
                    Notebook::default()
                }
            };
            return Ok(Snapshot {
                raw: Some(raw),
                notebook,
                legacy: Vec::new(),
            });
        }

        let legacy_active = self.store.get(LEGACY_ACTIVE_KEY)?;
        let legacy_trash = self.store.get(LEGACY_TRASH_KEY)?;
        if legacy_active.is_none() && legacy_trash.is_none() {
            return Ok(Snapshot {
                raw: None,
                notebook: Notebook::default(),
                legacy: Vec::new(),
            });
        }

        let now = now_epoch_ms();
        let mut notebook = Notebook::default();
        if let Some(raw) = legacy_active.as_deref() {
            notebook.active = import_legacy(LEGACY_ACTIVE_KEY, raw, now, None);
        }
        if let Some(raw) = legacy_trash.as_deref() {
            notebook.trash = import_legacy(LEGACY_TRASH_KEY, raw, now, Some(now));
        }
        info!(
            "event=legacy_import module=repo status=ok active_count={} trash_count={}",
            notebook.active.len(),
            notebook.trash.len()
        );

        Ok(Snapshot {
            raw: None,
            notebook,
            legacy: vec![
                (LEGACY_ACTIVE_KEY, legacy_active),
                (LEGACY_TRASH_KEY, legacy_trash),
            ],
        })
    }

    /// Runs one read-modify-write cycle.
    ///
    /// `apply` returns whether it changed the notebook; unchanged notebooks
    /// are not written back.
    fn mutate(
        &mut self,
        op: &'static str,
        apply: impl FnOnce(&mut Notebook) -> RepoResult<bool>,
    ) -> RepoResult<Notebook> {
        let started_at = Instant::now();
        let result = self.mutate_inner(apply);
        match &result {
            Ok(notebook) => info!(
                "event=note_mutation module=repo op={} status=ok duration_ms={} active_count={} trash_count={}",
                op,
                started_at.elapsed().as_millis(),
                notebook.active.len(),
                notebook.trash.len()
            ),
            Err(err) => warn!(
                "event=note_mutation module=repo op={} status=error duration_ms={} error={}",
                op,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn mutate_inner(
        &mut self,
        apply: impl FnOnce(&mut Notebook) -> RepoResult<bool>,
    ) -> RepoResult<Notebook> {
        let Snapshot {
            raw,
            mut notebook,
            legacy,
        } = self.read_snapshot()?;

        if !apply(&mut notebook)? {
            return Ok(notebook);
        }

        let encoded = encode_notebook(&notebook)?;
        if !self
            .store
            .compare_and_swap(NOTEBOOK_KEY, raw.as_deref(), Some(encoded.as_str()))?
        {
            return Err(RepoError::Conflict);
        }

        if let Err(retired) = self.retire_legacy_keys(&legacy) {
            self.undo_legacy_commit(&encoded, retired);
            return Err(RepoError::Conflict);
        }
        Ok(notebook)
    }

    /// Removes each legacy key that still holds the value read at import.
    ///
    /// Fails with the keys already removed when another writer changed a
    /// legacy key meanwhile.
    fn retire_legacy_keys(
        &mut self,
        legacy: &[(&'static str, Option<String>)],
    ) -> Result<(), Vec<(&'static str, String)>> {
        let mut retired = Vec::new();
        for (key, seen) in legacy {
            let Some(seen) = seen.as_deref() else {
                if matches!(self.store.get(key), Ok(Some(_))) {
                    return Err(retired);
                }
                continue;
            };
            match self.store.compare_and_swap(key, Some(seen), None) {
                Ok(true) => retired.push((*key, seen.to_string())),
                Ok(false) => return Err(retired),
                Err(err) => {
                    // Legacy keys are ignored once the composite record exists.
                    warn!(
                        "event=legacy_cleanup module=repo status=error key={} error={}",
                        key, err
                    );
                }
            }
        }
        Ok(())
    }

    /// Puts retired legacy values back and withdraws the composite record.
    fn undo_legacy_commit(&mut self, encoded: &str, retired: Vec<(&'static str, String)>) {
        for (key, value) in retired {
            if let Err(err) = self.store.compare_and_swap(key, None, Some(value.as_str())) {
                warn!(
                    "event=legacy_import module=repo status=conflict action=restore_failed key={} error={}",
                    key, err
                );
            }
        }
        match self.store.compare_and_swap(NOTEBOOK_KEY, Some(encoded), None) {
            Ok(true) => warn!("event=legacy_import module=repo status=conflict action=rolled_back"),
            Ok(false) => warn!(
                "event=legacy_import module=repo status=conflict action=rollback_skipped reason=record_changed"
            ),
            Err(err) => warn!(
                "event=legacy_import module=repo status=conflict action=rollback_failed error={}",
                err
            ),
        }
    }
}

impl<S: KeyValueStore> NoteRepository for KvNoteRepository<S> {
    fn load_notebook(&self) -> RepoResult<Notebook> {
        Ok(self.read_snapshot()?.notebook)
    }

    fn save_note(&mut self, text: &str, edit: Option<NoteId>) -> RepoResult<Notebook> {
        if text.is_empty() {
            return self.load_notebook();
        }

        self.mutate("save_note", |notebook| match edit {
            Some(id) => {
                if notebook.edit_active(id, text) {
                    Ok(true)
                } else {
                    Err(RepoError::NotFound(id))
                }
            }
            None => {
                notebook.push_active(Note::new(text));
                Ok(true)
            }
        })
    }

    fn save_edited_note(&mut self, text: &str, id: NoteId) -> RepoResult<Notebook> {
        self.mutate("save_edited_note", |notebook| {
            if notebook.edit_active(id, text) {
                Ok(true)
            } else {
                Err(RepoError::NotFound(id))
            }
        })
    }

    fn move_to_trash(&mut self, id: NoteId) -> RepoResult<Notebook> {
        self.mutate("move_to_trash", |notebook| {
            if notebook.trash_note(id) {
                Ok(true)
            } else {
                Err(RepoError::NotFound(id))
            }
        })
    }

    fn recover_note(&mut self, id: NoteId) -> RepoResult<Notebook> {
        self.mutate("recover_note", |notebook| {
            if notebook.recover_note(id) {
                Ok(true)
            } else {
                Err(RepoError::NotFound(id))
            }
        })
    }

    fn delete_permanently(&mut self, id: NoteId) -> RepoResult<Notebook> {
        self.mutate("delete_permanently", |notebook| {
            if notebook.purge_note(id) {
                Ok(true)
            } else {
                Err(RepoError::NotFound(id))
            }
        })
    }

    fn delete_all_trash(&mut self) -> RepoResult<Notebook> {
        self.mutate("delete_all_trash", |notebook| Ok(notebook.clear_trash() > 0))
    }
}

fn import_legacy(key: &str, raw: &str, now: i64, trashed_at: Option<i64>) -> Vec<Note> {
    match decode_legacy_collection(key, raw, now, trashed_at) {
        Ok(import) => {
            if import.skipped > 0 {
                warn!(
                    "event=legacy_import module=repo status=degraded key={} skipped_count={}",
                    key, import.skipped
                );
            }
            import.notes
        }
        Err(err) => {
            warn!(
                "event=legacy_import module=repo status=degraded key={} error_code=legacy_corrupt error={}",
                key, err
            );
            Vec::new()
        }
    }
}
