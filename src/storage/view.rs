//! Read-only store access
//!
//! The inspector only ever reads through these traits: open a point-in-time
//! view, seek to a key, walk forward, fetch each value.

use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{StorageError, StorageResult};

/// A stored value together with the checksum recorded when it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCell {
    bytes: Vec<u8>,
    checksum: u32,
}

impl ValueCell {
    /// Wrap freshly written bytes, computing their checksum.
    pub fn new(bytes: Vec<u8>) -> Self {
        let checksum = compute_checksum(&bytes);
        Self { bytes, checksum }
    }

    /// Wrap bytes read back from disk with the checksum they were stored under.
    pub fn with_checksum(bytes: Vec<u8>, checksum: u32) -> Self {
        Self { bytes, checksum }
    }

    /// Raw bytes, not verified.
    pub fn raw(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes after checksum verification.
    pub fn verified(&self, key: &[u8]) -> StorageResult<&[u8]> {
        if verify_checksum(&self.bytes, self.checksum) {
            Ok(&self.bytes)
        } else {
            Err(StorageError::corruption_for_key(
                key,
                "value checksum mismatch",
            ))
        }
    }
}

/// One entry yielded by a [`ReadView`] scan.
#[derive(Debug, Clone, Copy)]
pub struct ViewEntry<'a> {
    key: &'a [u8],
    cell: &'a ValueCell,
}

impl<'a> ViewEntry<'a> {
    pub fn new(key: &'a [u8], cell: &'a ValueCell) -> Self {
        Self { key, cell }
    }

    /// The raw key bytes.
    pub fn key(&self) -> &'a [u8] {
        self.key
    }

    /// The value bytes. Fails if the stored value does not match its checksum.
    pub fn value(&self) -> StorageResult<&'a [u8]> {
        self.cell.verified(self.key)
    }
}

/// A consistent, read-only, point-in-time view of a store.
///
/// Holding a view never blocks writers.
pub trait ReadView: Send {
    /// Iterate entries in key order, starting at the first key >= `from`.
    fn seek(&self, from: &[u8]) -> Box<dyn Iterator<Item = ViewEntry<'_>> + '_>;

    /// Iterate entries whose key starts with `prefix`, in key order.
    fn scan_prefix<'a>(&'a self, prefix: &'a [u8]) -> Box<dyn Iterator<Item = ViewEntry<'a>> + 'a> {
        Box::new(
            self.seek(prefix)
                .take_while(move |entry| entry.key().starts_with(prefix)),
        )
    }
}

/// A key-value store the inspector can browse.
pub trait KvStore: Send + Sync {
    /// Open a read-only snapshot.
    fn view(&self) -> StorageResult<Box<dyn ReadView>>;
}
