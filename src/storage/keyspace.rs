//! Copy-on-write ordered keyspace
//!
//! Writers swap in a modified tree under a short write lock. A snapshot is an
//! `Arc` clone of the current tree, so a long scan holds no lock at all; a
//! write that lands while a snapshot is alive clones the tree instead of
//! mutating the one the snapshot sees.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, PoisonError, RwLock};

use super::view::{ReadView, ValueCell, ViewEntry};

type Tree = BTreeMap<Vec<u8>, ValueCell>;

/// Ordered map of key -> value cell with cheap snapshots.
#[derive(Debug, Default)]
pub struct Keyspace {
    tree: RwLock<Arc<Tree>>,
}

impl Keyspace {
    /// Create an empty keyspace
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn insert(&self, key: Vec<u8>, cell: ValueCell) {
        let mut guard = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut guard).insert(key, cell);
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove(&self, key: &[u8]) -> bool {
        let mut guard = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.contains_key(key) {
            return false;
        }
        Arc::make_mut(&mut guard).remove(key).is_some()
    }

    /// Clone out the cell stored under `key`
    pub fn get(&self, key: &[u8]) -> Option<ValueCell> {
        let guard = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(key).cloned()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.tree.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capture the current state.
    pub fn snapshot(&self) -> KeyspaceSnapshot {
        let guard = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        KeyspaceSnapshot {
            tree: Arc::clone(&guard),
        }
    }
}

/// Immutable point-in-time view of a [`Keyspace`].
#[derive(Debug, Clone)]
pub struct KeyspaceSnapshot {
    tree: Arc<Tree>,
}

impl KeyspaceSnapshot {
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl ReadView for KeyspaceSnapshot {
    fn seek(&self, from: &[u8]) -> Box<dyn Iterator<Item = ViewEntry<'_>> + '_> {
        Box::new(
            self.tree
                .range::<[u8], _>((Bound::Included(from), Bound::Unbounded))
                .map(|(key, cell)| ViewEntry::new(key, cell)),
        )
    }
}
