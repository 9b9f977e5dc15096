//! Key-value state store seam.
//!
//! The contract persists everything as JSON documents under string keys:
//! `registry` for the account registry and `round:<id>` for each round.
//! A host environment (ledger, database, test harness) provides the
//! [`StateStore`] implementation.

use std::collections::BTreeMap;

use dauction_types::Result;

/// Storage the contract reads and writes through.
pub trait StateStore {
    /// Value stored under `key`, if any.
    ///
    /// # Errors
    /// `Storage` if the backend fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// `Storage` if the backend fails.
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    /// `Storage` if the backend fails.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Apply several writes as one unit.
    ///
    /// The default applies them in order; backends with transactions should
    /// override this so a failure leaves no write applied.
    ///
    /// # Errors
    /// `Storage` if the backend fails.
    fn put_all(&mut self, writes: Vec<(String, Vec<u8>)>) -> Result<()> {
        for (key, value) in writes {
            self.put(&key, value)?;
        }
        Ok(())
    }

    /// Whether anything is stored under `key`.
    ///
    /// # Errors
    /// `Storage` if the backend fails.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Ordered in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
