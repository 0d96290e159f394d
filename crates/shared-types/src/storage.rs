//! # Storage Interface
//!
//! Persistence is outside the consensus core. Collaborators that need it
//! (transaction self-validation, chain state) receive a [`KeyValueStore`].

use crate::errors::StorageError;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Minimal key-value interface over the node database.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write a value, replacing any previous one.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Whether the key exists.
    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-memory store for tests and single-process runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
