//! String key-value store abstraction used for note persistence.
//!
//! # Responsibility
//! - Define the opaque `get/set/remove` persistence contract.
//! - Offer a compare-and-swap primitive so read-modify-write callers can
//!   detect a concurrent writer instead of clobbering it.
//!
//! # Invariants
//! - Removing a missing key is not an error.
//! - `compare_and_swap` writes nothing when the current value differs from
//!   `expected`.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryKvStore;
pub use sqlite_store::SqliteKvStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a store engine.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// The connection lacks a table required by the store.
    MissingRequiredTable(&'static str),
    /// The connection lacks a column required by the store.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Engine-level failure without a richer source (used by `MemoryKvStore`).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "store requires missing table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "store requires missing column `{table}.{column}`")
            }
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Opaque string key-value persistence.
pub trait KeyValueStore {
    /// Reads one value; `None` when the key was never written or removed.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Writes one value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
    /// Deletes one key.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
    /// Writes `new` (or removes the key when `None`) only if the stored value
    /// still equals `expected`. Returns whether the write happened.
    fn compare_and_swap(
        &mut self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> StoreResult<bool>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn compare_and_swap(
        &mut self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> StoreResult<bool> {
        (**self).compare_and_swap(key, expected, new)
    }
}
