//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Persist string values in the `kv_entries` table.
//! - Run compare-and-swap inside an `IMMEDIATE` transaction so concurrent
//!   connections serialize on the write lock.
//!
//! # Invariants
//! - Construction fails fast on connections lacking the migrated schema.

use super::{KeyValueStore, StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

/// Key-value store over a migrated SQLite connection.
pub struct SqliteKvStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        read_value(self.conn, key)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        write_value(self.conn, key, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn compare_and_swap(
        &mut self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> StoreResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = read_value(&tx, key)?;
        if current.as_deref() != expected {
            return Ok(false);
        }

        match new {
            Some(value) => write_value(&tx, key, value)?,
            None => {
                tx.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
            }
        }
        tx.commit()?;
        Ok(true)
    }
}

fn read_value(conn: &Connection, key: &str) -> StoreResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM kv_entries WHERE key = ?1;",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

fn write_value(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO kv_entries (key, value, updated_at)
         VALUES (?1, ?2, strftime('%s', 'now') * 1000)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![key, value],
    )?;
    Ok(())
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    if !table_exists(conn, "kv_entries")? {
        return Err(StoreError::MissingRequiredTable("kv_entries"));
    }

    for column in ["key", "value", "updated_at"] {
        if !table_has_column(conn, "kv_entries", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "kv_entries",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
