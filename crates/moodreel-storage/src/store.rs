//! Key-value store abstraction used by the client-side state owners.

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::db::Database;
use crate::models::KvEntry;

/// Persistent string key-value store.
///
/// Writes are best effort from the caller's point of view: callers log a
/// failed `set` and keep their in-memory state.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)
    }
}

/// Process-local store, used for ephemeral runs and tests
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, KvEntry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry, ordered by key
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned
    pub fn entries(&self) -> Result<Vec<KvEntry>> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        Ok(guard.values().cloned().collect())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        Ok(guard.get(key).map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        guard.insert(
            key.to_string(),
            KvEntry::new(key.to_string(), value.to_string()),
        );
        Ok(())
    }
}
