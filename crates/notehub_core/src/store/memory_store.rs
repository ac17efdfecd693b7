//! In-memory key-value store.
//!
//! Backs tests and ephemeral sessions. Read and write failures can be
//! injected to drive the degraded paths of the repository and service.

use super::{KeyValueStore, StoreError, StoreResult};
use std::collections::BTreeMap;

/// `BTreeMap`-backed store with optional failure injection.
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    entries: BTreeMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with raw entries.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Makes every subsequent read fail until reset.
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Makes every subsequent write fail until reset.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Raw value access that bypasses failure injection.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("injected read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_read()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.check_write()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.check_write()?;
        self.entries.remove(key);
        Ok(())
    }

    fn compare_and_swap(
        &mut self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> StoreResult<bool> {
        self.check_write()?;
        if self.entries.get(key).map(String::as_str) != expected {
            return Ok(false);
        }
        match new {
            Some(value) => {
                self.entries.insert(key.to_string(), value.to_string());
            }
            None => {
                self.entries.remove(key);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKvStore};

    #[test]
    fn compare_and_swap_only_writes_on_match() {
        let mut store = MemoryKvStore::with_entries([("k", "v1")]);

        assert!(!store.compare_and_swap("k", Some("stale"), Some("v2")).unwrap());
        assert_eq!(store.raw("k"), Some("v1"));

        assert!(store.compare_and_swap("k", Some("v1"), Some("v2")).unwrap());
        assert_eq!(store.raw("k"), Some("v2"));

        assert!(store.compare_and_swap("k", Some("v2"), None).unwrap());
        assert_eq!(store.raw("k"), None);
    }

    #[test]
    fn injected_failures_do_not_touch_entries() {
        let mut store = MemoryKvStore::with_entries([("k", "v1")]);
        store.set_fail_writes(true);
        assert!(store.set("k", "v2").is_err());
        assert!(store.remove("k").is_err());
        assert_eq!(store.raw("k"), Some("v1"));

        store.set_fail_reads(true);
        assert!(store.get("k").is_err());
    }
}
