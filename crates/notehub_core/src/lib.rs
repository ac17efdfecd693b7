//! Core domain logic for NoteHub.
//! This crate is the single source of truth for the active/trash note rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::note::{Note, NoteId, Notebook, NotebookValidationError};
pub use repo::note_repo::{KvNoteRepository, NoteRepository, RepoError, RepoResult};
pub use service::note_service::{derive_preview, NoteService};
pub use store::{KeyValueStore, MemoryKvStore, SqliteKvStore, StoreError, StoreResult};
pub use view::active_list::{ActiveListView, EditorState};
pub use view::trash_list::TrashListView;
pub use view::NoteRow;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
