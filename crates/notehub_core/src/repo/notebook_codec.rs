//! JSON encoding of the persisted notebook record.
//!
//! # Responsibility
//! - Encode/decode the composite `Notebook` stored under `NOTEBOOK_KEY`.
//! - Import the legacy `notes`/`trashNotes` string arrays.
//!
//! # Invariants
//! - Records newer than `NOTEBOOK_FORMAT_VERSION` are rejected, never
//!   reinterpreted.
//! - Legacy entries that are not strings are skipped, not coerced.
//! - Legacy imports derive ids from `(key, position, text)`, so re-reading
//!   unchanged legacy arrays yields the same ids.

use crate::model::note::{Note, Notebook, NOTEBOOK_FORMAT_VERSION};
use crate::repo::note_repo::{RepoError, RepoResult};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// Key holding the composite record.
pub const NOTEBOOK_KEY: &str = "notebook";
/// Legacy key holding the active notes as a JSON string array.
pub const LEGACY_ACTIVE_KEY: &str = "notes";
/// Legacy key holding the trashed notes as a JSON string array.
pub const LEGACY_TRASH_KEY: &str = "trashNotes";

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Serializes one notebook record.
pub fn encode_notebook(notebook: &Notebook) -> RepoResult<String> {
    Ok(serde_json::to_string(notebook)?)
}

/// Parses and validates one notebook record.
///
/// # Errors
/// - `UnsupportedVersion` when the record comes from a newer build.
/// - `Codec` when the JSON does not match the record shape.
/// - `InvalidData` when the collections break notebook invariants.
pub fn decode_notebook(raw: &str) -> RepoResult<Notebook> {
    let probe: VersionProbe = serde_json::from_str(raw)?;
    if probe.version > NOTEBOOK_FORMAT_VERSION {
        return Err(RepoError::UnsupportedVersion {
            found: probe.version,
            supported: NOTEBOOK_FORMAT_VERSION,
        });
    }

    let notebook: Notebook = serde_json::from_str(raw)?;
    notebook
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(notebook)
}

/// Result of importing one legacy string array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyImport {
    pub notes: Vec<Note>,
    /// Entries dropped because they were not plain strings.
    pub skipped: usize,
}

/// Imports a legacy JSON string array stored under `key`.
///
/// `trashed_at` marks every imported note as trashed when set.
pub fn decode_legacy_collection(
    key: &str,
    raw: &str,
    imported_at: i64,
    trashed_at: Option<i64>,
) -> RepoResult<LegacyImport> {
    let values: Vec<Value> = serde_json::from_str(raw)?;
    let mut skipped = 0;
    let mut notes = Vec::with_capacity(values.len());
    for (position, value) in values.into_iter().enumerate() {
        match value {
            Value::String(text) => {
                let id = legacy_note_id(key, position, &text);
                let mut note = Note::with_id(id, text, imported_at);
                note.trashed_at = trashed_at;
                notes.push(note);
            }
            _ => skipped += 1,
        }
    }
    Ok(LegacyImport { notes, skipped })
}

fn legacy_note_id(key: &str, position: usize, text: &str) -> Uuid {
    let name = format!("notehub:{key}:{position}:{text}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::{decode_legacy_collection, decode_notebook, encode_notebook};
    use crate::model::note::{Note, Notebook};
    use crate::repo::note_repo::RepoError;

    #[test]
    fn decode_rejects_newer_version() {
        let err = decode_notebook(r#"{"version":7,"active":[],"trash":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            RepoError::UnsupportedVersion {
                found: 7,
                supported: 1
            }
        ));
    }

    #[test]
    fn decode_rejects_broken_invariants() {
        let mut notebook = Notebook::default();
        let note = Note::new("dup");
        notebook.active.push(note.clone());
        notebook.active.push(note);
        let raw = encode_notebook(&notebook).unwrap();

        assert!(matches!(
            decode_notebook(&raw),
            Err(RepoError::InvalidData(_))
        ));
    }

    #[test]
    fn decode_reports_malformed_json_as_codec_error() {
        assert!(matches!(decode_notebook("{not json"), Err(RepoError::Codec(_))));
    }

    #[test]
    fn legacy_import_skips_non_string_entries() {
        let import = decode_legacy_collection(
            "trashNotes",
            r#"["keep", {"text":"obj","deleted":true}, 3, "also keep"]"#,
            1_000,
            Some(2_000),
        )
        .unwrap();

        let texts: Vec<_> = import.notes.iter().map(|note| note.text.as_str()).collect();
        assert_eq!(texts, vec!["keep", "also keep"]);
        assert_eq!(import.skipped, 2);
        assert!(import
            .notes
            .iter()
            .all(|note| note.created_at == 1_000 && note.trashed_at == Some(2_000)));
        assert_ne!(import.notes[0].id, import.notes[1].id);
    }

    #[test]
    fn legacy_ids_are_stable_across_reads_and_distinct_per_key() {
        let raw = r#"["same", "same"]"#;
        let first = decode_legacy_collection("notes", raw, 1, None).unwrap();
        let second = decode_legacy_collection("notes", raw, 2, None).unwrap();
        let other_key = decode_legacy_collection("trashNotes", raw, 1, Some(1)).unwrap();

        assert_eq!(first.notes[0].id, second.notes[0].id);
        assert_ne!(first.notes[0].id, first.notes[1].id);
        assert_ne!(first.notes[0].id, other_key.notes[0].id);
    }
}
