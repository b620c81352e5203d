//! Modification definitions
//!
//! A batch is an ordered list of [`Modification`]s applied as one atomic
//! transaction. Batches can also be persisted as checksummed batch files.
//!
//! ## Batch File Format
//! ```text
//! ┌───────────┬─────────────┬───────────┬────────────┬─────────────────────┐
//! │ Magic (4) │ Version (2) │ CRC32 (4) │ Length (4) │ bincode payload     │
//! └───────────┴─────────────┴───────────┴────────────┴─────────────────────┘
//! ```
//! Integers are little-endian; the CRC covers the payload only.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// A single write operation within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modification {
    /// Set `key` in column family `cf` to `value`
    Put {
        cf: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Remove `key` from column family `cf`
    Delete { cf: String, key: Vec<u8> },
}

impl Modification {
    pub fn put(cf: impl Into<String>, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Modification::Put {
            cf: cf.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(cf: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Modification::Delete {
            cf: cf.into(),
            key: key.into(),
        }
    }

    /// Column family this modification targets
    pub fn cf(&self) -> &str {
        match self {
            Modification::Put { cf, .. } | Modification::Delete { cf, .. } => cf,
        }
    }

    /// Logical key this modification targets
    pub fn key(&self) -> &[u8] {
        match self {
            Modification::Put { key, .. } | Modification::Delete { key, .. } => key,
        }
    }

    /// Value for a put, `None` for a delete
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Modification::Put { value, .. } => Some(value),
            Modification::Delete { .. } => None,
        }
    }
}

// =============================================================================
// Batch Files
// =============================================================================

const BATCH_MAGIC: &[u8; 4] = b"CFKB";
const BATCH_VERSION: u16 = 1;

/// Magic + version + crc + length
pub const BATCH_HEADER_SIZE: usize = 4 + 2 + 4 + 4;

/// Serialize a batch into the batch file format
pub fn encode_batch(batch: &[Modification]) -> Result<Vec<u8>> {
    let payload = bincode::serialize(batch)
        .map_err(|e| StorageError::BatchFile(format!("serialize failed: {}", e)))?;
    let len = u32::try_from(payload.len())
        .map_err(|_| StorageError::BatchFile(format!("payload too large: {} bytes", payload.len())))?;

    let mut buf = Vec::with_capacity(BATCH_HEADER_SIZE + payload.len());
    buf.extend_from_slice(BATCH_MAGIC);
    buf.extend_from_slice(&BATCH_VERSION.to_le_bytes());
    buf.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Parse and verify a batch file produced by [`encode_batch`]
pub fn decode_batch(bytes: &[u8]) -> Result<Vec<Modification>> {
    if bytes.len() < BATCH_HEADER_SIZE {
        return Err(StorageError::BatchFile(format!(
            "truncated header: {} bytes",
            bytes.len()
        )));
    }

    let (header, payload) = bytes.split_at(BATCH_HEADER_SIZE);
    if &header[0..4] != BATCH_MAGIC {
        return Err(StorageError::BatchFile("bad magic".to_string()));
    }

    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != BATCH_VERSION {
        return Err(StorageError::BatchFile(format!("unsupported version {}", version)));
    }

    let expected_crc = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);
    let len = u32::from_le_bytes([header[10], header[11], header[12], header[13]]) as usize;
    if payload.len() != len {
        return Err(StorageError::BatchFile(format!(
            "length mismatch: header says {}, found {}",
            len,
            payload.len()
        )));
    }

    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(StorageError::BatchFile(format!(
            "checksum mismatch: expected {:08x}, got {:08x}",
            expected_crc, actual_crc
        )));
    }

    bincode::deserialize(payload)
        .map_err(|e| StorageError::BatchFile(format!("deserialize failed: {}", e)))
}
