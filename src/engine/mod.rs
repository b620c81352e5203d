//! Engine Module
//!
//! The seam between the storage layer and the embedded key-value engine.
//!
//! ## Responsibilities
//! - Hand out read-only snapshots fixed at creation time
//! - Hand out read-write transactions that commit atomically
//! - Release the engine handle on close
//!
//! The storage layer only ever sees flat physical keys here; column
//! families are encoded before anything reaches an engine.
//!
//! ## Backends
//! - [`RedbEngine`]: on-disk, ACID, MVCC snapshots (production)
//! - [`MemoryEngine`]: copy-on-write map, no persistence (tests, tooling)

mod memory;
mod redb_backend;

pub use memory::{MemoryEngine, MemorySnapshot, MemoryTxn};
pub use redb_backend::{RedbEngine, RedbSnapshot, RedbTxn};

use crate::error::EngineResult;

/// A physical key-value pair
pub type KvPair = (Vec<u8>, Vec<u8>);

/// An embedded transactional key-value engine
pub trait KvEngine: Send + Sync {
    type Snapshot: EngineSnapshot;
    type Txn: EngineTxn;

    /// Open a read-only view of the current committed state
    fn begin_read(&self) -> EngineResult<Self::Snapshot>;

    /// Open a read-write transaction
    fn begin_write(&self) -> EngineResult<Self::Txn>;

    /// Flush and release the engine handle.
    ///
    /// Later `begin_*` calls fail with `EngineError::Closed`.
    fn close(&self) -> EngineResult<()>;
}

/// A frozen point-in-time view of committed data
pub trait EngineSnapshot {
    /// Look up a physical key.
    ///
    /// Absence is reported as `EngineError::KeyNotFound`.
    fn get(&self, key: &[u8]) -> EngineResult<Vec<u8>>;

    /// Up to `limit` pairs with keys in `[start, end)`, ascending
    fn scan(&self, start: &[u8], end: &[u8], limit: usize) -> EngineResult<Vec<KvPair>>;
}

/// Staged writes that become visible together on commit
pub trait EngineTxn {
    fn set(&mut self, key: &[u8], value: &[u8]) -> EngineResult<()>;

    /// Removing an absent key is a no-op
    fn delete(&mut self, key: &[u8]) -> EngineResult<()>;

    fn commit(self) -> EngineResult<()>;

    /// Drop every staged write
    fn discard(self);
}
