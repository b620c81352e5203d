//! Storage Facade
//!
//! Owns the engine handle and is the only way in for reads and writes.
//!
//! ## Responsibilities
//! - Open the engine under the configured data directory
//! - Hand out snapshot readers
//! - Apply batches of modifications atomically
//! - Release the engine on shutdown
//!
//! ## Lifecycle
//! ```text
//!   open() ──► Open ──close()/stop()──► Closed
//! ```
//! There is no way back from `Closed`; every read or write afterwards fails
//! with [`StorageError::Closed`].
//!
//! ## Concurrency
//! All methods take `&self`. Readers and batches may run concurrently from
//! many threads. Batches are serialized by the engine's own transaction
//! mechanism; the facade holds only a shared lifecycle guard while a batch
//! runs, so `close` waits for in-flight batches to finish.

use std::fs;
use std::path::Path;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::codec;
use crate::config::Config;
use crate::engine::{EngineTxn, KvEngine, MemoryEngine, RedbEngine};
use crate::error::{EngineError, Result, StorageError};
use crate::modify::{self, Modification};
use crate::reader::SnapshotReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Open,
    Closed,
}

/// Column-family aware storage over an embedded engine
pub struct Storage<E: KvEngine = RedbEngine> {
    config: Config,
    engine: E,
    state: RwLock<Lifecycle>,
}

impl Storage<RedbEngine> {
    /// Open or create the on-disk store described by `config`
    ///
    /// On startup:
    /// 1. Create `{data_dir}/kv/` if missing
    /// 2. Open (or create) the engine file inside it
    pub fn open(config: Config) -> Result<Self> {
        let kv_dir = config.kv_dir();
        let engine_path = config.engine_path();

        fs::create_dir_all(&kv_dir).map_err(|e| StorageError::Initialization {
            path: kv_dir.clone(),
            source: EngineError::Io(e),
        })?;

        let engine = RedbEngine::open(&engine_path, config.cache_size, config.sync_on_commit)
            .map_err(|source| StorageError::Initialization {
                path: engine_path.clone(),
                source,
            })?;

        info!(data_dir = %config.data_dir.display(), "storage opened");
        Ok(Self::with_engine(engine, config))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::for_path(path))
    }
}

impl Storage<MemoryEngine> {
    /// A fresh, non-persistent store
    pub fn in_memory() -> Self {
        Self::with_engine(MemoryEngine::new(), Config::default())
    }
}

impl<E: KvEngine> Storage<E> {
    /// Wrap an already opened engine
    pub fn with_engine(engine: E, config: Config) -> Self {
        Self {
            config,
            engine,
            state: RwLock::new(Lifecycle::Open),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Lifecycle hook run once after open. Nothing to initialize yet.
    pub fn start(&self) -> Result<()> {
        self.ensure_open()?;
        info!(data_dir = %self.config.data_dir.display(), "storage started");
        Ok(())
    }

    /// Lifecycle hook run once at shutdown; releases the engine
    pub fn stop(&self) -> Result<()> {
        self.close()
    }

    /// Release the engine handle.
    ///
    /// Waits for in-flight batches. Closing twice logs a warning and
    /// succeeds. Readers created before the close keep their snapshot until
    /// they are closed themselves.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.write();
        if *state == Lifecycle::Closed {
            warn!("storage closed twice");
            return Ok(());
        }

        *state = Lifecycle::Closed;
        self.engine.close().map_err(StorageError::EngineUnavailable)?;
        info!(data_dir = %self.config.data_dir.display(), "storage closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        *self.state.read() == Lifecycle::Closed
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Open a reader over the state committed right now
    pub fn new_reader(&self) -> Result<SnapshotReader<E::Snapshot>> {
        let _state = self.ensure_open()?;
        let snapshot = self
            .engine
            .begin_read()
            .map_err(StorageError::EngineUnavailable)?;
        Ok(SnapshotReader::new(snapshot, self.config.scan_batch_size))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Apply `batch` as one atomic transaction.
    ///
    /// Modifications are staged in order, so a later operation on a key wins
    /// over an earlier one. If any modification fails to stage, the
    /// transaction is discarded and nothing becomes visible. Conflicts are
    /// not retried here; a failed batch can be resubmitted whole.
    pub fn write_batch<I>(&self, batch: I) -> Result<()>
    where
        I: IntoIterator<Item = Modification>,
    {
        let _state = self.ensure_open()?;
        let mut txn = self
            .engine
            .begin_write()
            .map_err(StorageError::EngineUnavailable)?;

        let mut staged = 0usize;
        for modification in batch {
            if let Err(e) = stage(&mut txn, &modification) {
                warn!(
                    cf = modification.cf(),
                    staged,
                    error = %e,
                    "staging failed, discarding batch"
                );
                txn.discard();
                return Err(e);
            }
            staged += 1;
        }

        txn.commit().map_err(|e| {
            warn!(staged, error = %e, "batch commit failed");
            StorageError::Transaction(e)
        })?;

        debug!(modifications = staged, "batch committed");
        Ok(())
    }

    // =========================================================================
    // Batch Files
    // =========================================================================

    /// Read a batch file and apply it as one batch
    ///
    /// Returns the number of modifications applied.
    pub fn apply_batch_file(&self, path: &Path) -> Result<usize> {
        let bytes = fs::read(path)?;
        let batch = modify::decode_batch(&bytes)?;
        let count = batch.len();

        self.write_batch(batch)?;
        info!(path = %path.display(), modifications = count, "batch file applied");
        Ok(count)
    }

    /// Write every pair of `cf`, read from one snapshot, to a batch file of puts
    ///
    /// Returns the number of pairs exported.
    pub fn export_cf(&self, cf: &str, path: &Path) -> Result<usize> {
        let mut reader = self.new_reader()?;
        let batch = reader
            .iter(cf)?
            .map(|pair| pair.map(|(key, value)| Modification::put(cf, key, value)))
            .collect::<Result<Vec<_>>>()?;
        reader.close();

        fs::write(path, modify::encode_batch(&batch)?)?;
        info!(cf, path = %path.display(), pairs = batch.len(), "column family exported");
        Ok(batch.len())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// The underlying engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Shared guard proving the store is open for the guard's lifetime
    fn ensure_open(&self) -> Result<RwLockReadGuard<'_, Lifecycle>> {
        let state = self.state.read();
        if *state == Lifecycle::Closed {
            return Err(StorageError::Closed);
        }
        Ok(state)
    }
}

/// Stage one modification into `txn`
fn stage<T: EngineTxn>(txn: &mut T, modification: &Modification) -> Result<()> {
    match modification {
        Modification::Put { cf, key, value } => {
            let physical = codec::encode_key(cf, key)?;
            txn.set(&physical, value).map_err(StorageError::Transaction)
        }
        Modification::Delete { cf, key } => {
            let physical = codec::encode_key(cf, key)?;
            txn.delete(&physical).map_err(StorageError::Transaction)
        }
    }
}
