//! In-memory engine
//!
//! BTreeMap-based engine with copy-on-write commits.
//!
//! ## Snapshot Model
//! The committed state is an immutable `Arc<BTreeMap>`. A snapshot is just a
//! clone of that `Arc`, so it never changes after creation. A commit builds
//! a new map from the current one plus the staged writes and swaps it in
//! under the commit lock; readers holding the old `Arc` keep seeing the old
//! state.
//!
//! Commits copy the whole map, so this is meant for tests and small tools,
//! not for large data sets.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::{EngineSnapshot, EngineTxn, KvEngine, KvPair};
use crate::error::{EngineError, EngineResult};

type Map = BTreeMap<Bytes, Bytes>;

/// State shared between the engine and its open transactions
struct Shared {
    /// Latest committed state
    committed: RwLock<Arc<Map>>,

    /// Serializes commits
    commit_lock: Mutex<()>,

    closed: AtomicBool,
}

/// Non-persistent engine
#[derive(Clone)]
pub struct MemoryEngine {
    shared: Arc<Shared>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                committed: RwLock::new(Arc::new(Map::new())),
                commit_lock: Mutex::new(()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Number of committed physical keys
    pub fn len(&self) -> usize {
        self.shared.committed.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_open(&self) -> EngineResult<()> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(EngineError::Closed);
        }
        Ok(())
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl KvEngine for MemoryEngine {
    type Snapshot = MemorySnapshot;
    type Txn = MemoryTxn;

    fn begin_read(&self) -> EngineResult<MemorySnapshot> {
        self.ensure_open()?;
        Ok(MemorySnapshot {
            map: Arc::clone(&self.shared.committed.read()),
        })
    }

    fn begin_write(&self) -> EngineResult<MemoryTxn> {
        self.ensure_open()?;
        Ok(MemoryTxn {
            shared: Arc::clone(&self.shared),
            staged: BTreeMap::new(),
        })
    }

    fn close(&self) -> EngineResult<()> {
        // Wait for an in-flight commit before flipping the flag
        let _commit = self.shared.commit_lock.lock();
        if !self.shared.closed.swap(true, Ordering::AcqRel) {
            debug!("memory engine closed");
        }
        Ok(())
    }
}

/// Frozen view of a [`MemoryEngine`]
pub struct MemorySnapshot {
    map: Arc<Map>,
}

impl EngineSnapshot for MemorySnapshot {
    fn get(&self, key: &[u8]) -> EngineResult<Vec<u8>> {
        self.map
            .get(key)
            .map(|value| value.to_vec())
            .ok_or(EngineError::KeyNotFound)
    }

    fn scan(&self, start: &[u8], end: &[u8], limit: usize) -> EngineResult<Vec<KvPair>> {
        if limit == 0 || start >= end {
            return Ok(Vec::new());
        }

        let range = (
            Bound::Included(Bytes::copy_from_slice(start)),
            Bound::Excluded(Bytes::copy_from_slice(end)),
        );
        Ok(self
            .map
            .range(range)
            .take(limit)
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect())
    }
}

/// Staged writes against a [`MemoryEngine`]
pub struct MemoryTxn {
    shared: Arc<Shared>,

    /// `None` marks a delete. Later stages of the same key replace earlier ones.
    staged: BTreeMap<Bytes, Option<Bytes>>,
}

impl EngineTxn for MemoryTxn {
    fn set(&mut self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        self.staged
            .insert(Bytes::copy_from_slice(key), Some(Bytes::copy_from_slice(value)));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> EngineResult<()> {
        self.staged.insert(Bytes::copy_from_slice(key), None);
        Ok(())
    }

    fn commit(self) -> EngineResult<()> {
        let _commit = self.shared.commit_lock.lock();
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(EngineError::Closed);
        }
        if self.staged.is_empty() {
            return Ok(());
        }

        let mut next = Map::clone(&self.shared.committed.read());
        for (key, value) in self.staged {
            match value {
                Some(value) => {
                    next.insert(key, value);
                }
                None => {
                    next.remove(&key);
                }
            }
        }

        *self.shared.committed.write() = Arc::new(next);
        Ok(())
    }

    fn discard(self) {}
}
