//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - Resolution never fails; every setting has a default except the log
//!   directory, whose absence disables file logging.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Database file override.
pub const DB_PATH_ENV: &str = "NOTEHUB_DB_PATH";
/// Log level override (`trace|debug|info|warn|error`).
pub const LOG_LEVEL_ENV: &str = "NOTEHUB_LOG_LEVEL";
/// Absolute directory for rolling log files.
pub const LOG_DIR_ENV: &str = "NOTEHUB_LOG_DIR";
/// File name used under the temp dir when no database path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "notehub.sqlite3";

/// Settings shared by the FFI and CLI front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Resolves settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, DEFAULT_DB_FILE_NAME, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = CoreConfig::from_lookup(lookup(&[]));
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
        );
        assert!(!config.log_level.is_empty());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed() {
        let config = CoreConfig::from_lookup(lookup(&[
            (DB_PATH_ENV, " /data/notes.sqlite3 "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/data/logs"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/data/notes.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/data/logs")));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = CoreConfig::from_lookup(lookup(&[(DB_PATH_ENV, "   "), (LOG_DIR_ENV, "")]));
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
        );
        assert_eq!(config.log_dir, None);
    }
}
