//! In-memory store, the default for tests and benchmarks.

use super::errors::StorageResult;
use super::keyspace::Keyspace;
use super::view::{KvStore, ReadView, ValueCell};

/// Volatile key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keyspace: Keyspace,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`
    pub fn put(&self, key: impl AsRef<[u8]>, value: impl Into<Vec<u8>>) {
        self.keyspace
            .insert(key.as_ref().to_vec(), ValueCell::new(value.into()));
    }

    /// Read back a value, verifying its checksum
    pub fn get(&self, key: impl AsRef<[u8]>) -> StorageResult<Option<Vec<u8>>> {
        let key = key.as_ref();
        match self.keyspace.get(key) {
            Some(cell) => Ok(Some(cell.verified(key)?.to_vec())),
            None => Ok(None),
        }
    }

    /// Remove `key`. Returns whether it existed.
    pub fn delete(&self, key: impl AsRef<[u8]>) -> bool {
        self.keyspace.remove(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.keyspace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyspace.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn view(&self) -> StorageResult<Box<dyn ReadView>> {
        Ok(Box::new(self.keyspace.snapshot()))
    }
}
