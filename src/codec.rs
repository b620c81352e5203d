//! Column-Family Key Codec
//!
//! Multiplexes several logical namespaces onto the engine's single flat key
//! space.
//!
//! ## Physical Key Layout
//! ```text
//! ┌──────────────────────┬─────┬──────────────────────┐
//! │ column family (utf8) │ '_' │ logical key (bytes)  │
//! └──────────────────────┴─────┴──────────────────────┘
//! ```
//!
//! The separator never appears inside a valid column family name, so the
//! first `_` always ends the prefix. This makes the encoding injective, and
//! since every key of one family shares the same prefix, byte order of
//! physical keys equals byte order of logical keys within a family.

use crate::error::{Result, StorageError};

/// Byte separating the column family name from the logical key
pub const CF_SEPARATOR: u8 = b'_';

/// Column family for user data
pub const CF_DEFAULT: &str = "default";

/// Column family for lock records
pub const CF_LOCK: &str = "lock";

/// Column family for write (commit) records
pub const CF_WRITE: &str = "write";

/// The well-known column families
pub const ALL_CFS: [&str; 3] = [CF_DEFAULT, CF_LOCK, CF_WRITE];

/// Check that `cf` can be used as a column family name
pub fn validate_cf(cf: &str) -> Result<()> {
    if cf.is_empty() {
        return Err(StorageError::InvalidColumnFamily {
            name: cf.to_string(),
            reason: "name is empty",
        });
    }
    if cf.as_bytes().contains(&CF_SEPARATOR) {
        return Err(StorageError::InvalidColumnFamily {
            name: cf.to_string(),
            reason: "name contains the reserved separator '_'",
        });
    }
    Ok(())
}

/// Physical prefix shared by every key of `cf`
pub fn cf_prefix(cf: &str) -> Result<Vec<u8>> {
    validate_cf(cf)?;
    let mut prefix = Vec::with_capacity(cf.len() + 1);
    prefix.extend_from_slice(cf.as_bytes());
    prefix.push(CF_SEPARATOR);
    Ok(prefix)
}

/// Encode `(cf, key)` into a physical key
pub fn encode_key(cf: &str, key: &[u8]) -> Result<Vec<u8>> {
    let mut physical = cf_prefix(cf)?;
    physical.extend_from_slice(key);
    Ok(physical)
}

/// Split a physical key back into `(cf, key)`.
///
/// Returns `None` if the key has no separator or the prefix is not UTF-8.
pub fn decode_key(physical: &[u8]) -> Option<(&str, &[u8])> {
    let pos = physical.iter().position(|&b| b == CF_SEPARATOR)?;
    let cf = std::str::from_utf8(&physical[..pos]).ok()?;
    if cf.is_empty() {
        return None;
    }
    Some((cf, &physical[pos + 1..]))
}

/// Half-open physical key range `[start, end)` holding exactly the keys of `cf`
pub fn cf_bounds(cf: &str) -> Result<(Vec<u8>, Vec<u8>)> {
    let start = cf_prefix(cf)?;
    let mut end = start.clone();
    // The prefix always ends in the separator, so bumping that byte cannot overflow.
    if let Some(last) = end.last_mut() {
        *last = CF_SEPARATOR + 1;
    }
    Ok((start, end))
}
