//! Snapshot Reader
//!
//! Column-family scoped reads over one engine snapshot.
//!
//! ## Lifecycle
//! - Created by [`Storage::new_reader`](crate::Storage::new_reader), one per
//!   logical read request
//! - Every read sees the state committed when the reader was created
//! - Released by [`SnapshotReader::close`] (or on drop); reads after close
//!   fail with [`StorageError::ReaderClosed`]
//!
//! Iterators borrow the reader, so a reader cannot be closed while one of
//! its iterators is still alive.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::codec;
use crate::engine::{EngineSnapshot, KvPair};
use crate::error::{EngineError, Result, StorageError};

/// A point-in-time, read-only view of the store
pub struct SnapshotReader<S: EngineSnapshot> {
    /// `None` once closed
    snapshot: Option<S>,

    /// Pairs fetched per engine scan while iterating
    scan_batch_size: usize,
}

impl<S: EngineSnapshot> SnapshotReader<S> {
    pub(crate) fn new(snapshot: S, scan_batch_size: usize) -> Self {
        Self {
            snapshot: Some(snapshot),
            scan_batch_size: scan_batch_size.max(1),
        }
    }

    /// Look up `key` in column family `cf`.
    ///
    /// Returns:
    /// - `Ok(Some(value))` — key present in the snapshot
    /// - `Ok(None)` — key absent
    /// - `Err(_)` — the engine failed, or the reader is closed
    pub fn get(&self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let snapshot = self.snapshot()?;
        let physical = codec::encode_key(cf, key)?;

        match snapshot.get(&physical) {
            Ok(value) => Ok(Some(value)),
            Err(EngineError::KeyNotFound) => Ok(None),
            Err(e) => Err(StorageError::Read(e)),
        }
    }

    /// Iterate over every pair of `cf` in ascending key order
    pub fn iter(&self, cf: &str) -> Result<CfIterator<'_, S>> {
        self.iter_from(cf, b"")
    }

    /// Iterate over the pairs of `cf` whose key is `>= start`
    pub fn iter_from(&self, cf: &str, start: &[u8]) -> Result<CfIterator<'_, S>> {
        let snapshot = self.snapshot()?;
        let (prefix, end) = codec::cf_bounds(cf)?;

        let mut next_start = prefix.clone();
        next_start.extend_from_slice(start);

        Ok(CfIterator {
            snapshot,
            prefix_len: prefix.len(),
            next_start,
            end,
            batch_size: self.scan_batch_size,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }

    /// Release the snapshot. Calling this again is a no-op.
    pub fn close(&mut self) {
        if self.snapshot.take().is_some() {
            debug!("snapshot reader closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.snapshot.is_none()
    }

    fn snapshot(&self) -> Result<&S> {
        match self.snapshot.as_ref() {
            Some(snapshot) => Ok(snapshot),
            None => {
                warn!("read attempted on a closed snapshot reader");
                Err(StorageError::ReaderClosed)
            }
        }
    }
}

impl<S: EngineSnapshot> Drop for SnapshotReader<S> {
    fn drop(&mut self) {
        if self.snapshot.is_some() {
            debug!("snapshot reader dropped without close, releasing snapshot");
        }
    }
}

/// Lazy, ordered iterator over one column family of a snapshot.
///
/// Pairs are pulled from the engine `batch_size` at a time. Keys are yielded
/// with the column family prefix stripped. After the first error the
/// iterator is finished.
pub struct CfIterator<'r, S: EngineSnapshot> {
    snapshot: &'r S,

    /// Length of `cf ++ separator`
    prefix_len: usize,

    /// Physical key the next engine scan starts at (inclusive)
    next_start: Vec<u8>,

    /// Exclusive physical upper bound of the column family
    end: Vec<u8>,

    batch_size: usize,
    buffer: VecDeque<KvPair>,
    exhausted: bool,
}

impl<S: EngineSnapshot> CfIterator<'_, S> {
    fn refill(&mut self) -> std::result::Result<(), EngineError> {
        let pairs = self.snapshot.scan(&self.next_start, &self.end, self.batch_size)?;

        if pairs.len() < self.batch_size {
            self.exhausted = true;
        }
        if let Some((last_key, _)) = pairs.last() {
            // Smallest key strictly greater than the last one seen
            let mut successor = last_key.clone();
            successor.push(0);
            self.next_start = successor;
        }

        self.buffer.extend(pairs);
        Ok(())
    }
}

impl<S: EngineSnapshot> Iterator for CfIterator<'_, S> {
    type Item = Result<KvPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.refill() {
                self.exhausted = true;
                self.buffer.clear();
                return Some(Err(StorageError::Read(e)));
            }
        }

        let (mut key, value) = self.buffer.pop_front()?;
        key.drain(..self.prefix_len);
        Some(Ok((key, value)))
    }
}
