//! redb backend
//!
//! All column families share one redb table of raw byte keys; the column
//! family lives in the key prefix. redb gives us:
//! - MVCC read transactions (snapshot fixed at `begin_read`)
//! - A single writer at a time (`begin_write` blocks until the previous
//!   writer finishes), so commits never conflict
//! - Atomic, durable commit

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use redb::{
    Builder, Database, Durability, ReadOnlyTable, ReadableTable, TableDefinition, WriteTransaction,
};
use tracing::{debug, info, warn};

use super::{EngineSnapshot, EngineTxn, KvEngine, KvPair};
use crate::error::{EngineError, EngineResult};

/// The single physical table holding every column family
const KV_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("kv");

/// On-disk engine backed by a redb database file
pub struct RedbEngine {
    /// `None` once closed
    db: RwLock<Option<Database>>,

    /// Database file location
    path: PathBuf,

    /// fsync every commit (`Immediate`) or not (`Eventual`)
    sync_on_commit: bool,
}

impl RedbEngine {
    /// Open or create the database file at `path`
    ///
    /// The parent directory must already exist.
    pub fn open(path: &Path, cache_size: usize, sync_on_commit: bool) -> EngineResult<Self> {
        let db = Builder::new().set_cache_size(cache_size).create(path)?;

        // Read transactions cannot open a table that was never created.
        let txn = db.begin_write()?;
        txn.open_table(KV_TABLE)?;
        txn.commit()?;

        info!(path = %path.display(), cache_size, sync_on_commit, "redb engine opened");

        Ok(Self {
            db: RwLock::new(Some(db)),
            path: path.to_path_buf(),
            sync_on_commit,
        })
    }

    /// Database file location
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvEngine for RedbEngine {
    type Snapshot = RedbSnapshot;
    type Txn = RedbTxn;

    fn begin_read(&self) -> EngineResult<RedbSnapshot> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(EngineError::Closed)?;

        let txn = db.begin_read()?;
        let table = txn.open_table(KV_TABLE)?;
        Ok(RedbSnapshot { table })
    }

    fn begin_write(&self) -> EngineResult<RedbTxn> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(EngineError::Closed)?;

        let mut txn = db.begin_write()?;
        if !self.sync_on_commit {
            txn.set_durability(Durability::Eventual);
        }
        Ok(RedbTxn { txn })
    }

    fn close(&self) -> EngineResult<()> {
        match self.db.write().take() {
            Some(db) => {
                // redb persists on commit; dropping the handle releases the file.
                drop(db);
                info!(path = %self.path.display(), "redb engine closed");
            }
            None => debug!(path = %self.path.display(), "redb engine already closed"),
        }
        Ok(())
    }
}

/// A redb read transaction, opened on the key-value table
pub struct RedbSnapshot {
    /// Keeps the read transaction (and its MVCC snapshot) alive
    table: ReadOnlyTable<&'static [u8], &'static [u8]>,
}

impl EngineSnapshot for RedbSnapshot {
    fn get(&self, key: &[u8]) -> EngineResult<Vec<u8>> {
        match self.table.get(key)? {
            Some(value) => Ok(value.value().to_vec()),
            None => Err(EngineError::KeyNotFound),
        }
    }

    fn scan(&self, start: &[u8], end: &[u8], limit: usize) -> EngineResult<Vec<KvPair>> {
        let mut pairs = Vec::new();
        if limit == 0 || start >= end {
            return Ok(pairs);
        }

        for entry in self.table.range::<&[u8]>(start..end)? {
            let (key, value) = entry?;
            pairs.push((key.value().to_vec(), value.value().to_vec()));
            if pairs.len() >= limit {
                break;
            }
        }
        Ok(pairs)
    }
}

/// A redb write transaction
pub struct RedbTxn {
    txn: WriteTransaction,
}

impl EngineTxn for RedbTxn {
    fn set(&mut self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        let mut table = self.txn.open_table(KV_TABLE)?;
        table.insert(key, value)?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> EngineResult<()> {
        let mut table = self.txn.open_table(KV_TABLE)?;
        table.remove(key)?;
        Ok(())
    }

    fn commit(self) -> EngineResult<()> {
        self.txn.commit()?;
        Ok(())
    }

    fn discard(self) {
        if let Err(e) = self.txn.abort() {
            warn!(error = %e, "failed to abort redb transaction");
        }
    }
}
