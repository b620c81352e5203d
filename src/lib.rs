//! # cfkv
//!
//! A column-family aware key-value storage layer over an embedded,
//! transactional key-value engine:
//! - Several logical namespaces (column families) on one flat key space
//! - Snapshot-isolated readers with point lookups and ordered iteration
//! - Atomic batches of mixed put/delete modifications
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Request Processing Layer                    │
//! │                      (not in this crate)                    │
//! └───────────────┬─────────────────────────────┬───────────────┘
//!                 │ write_batch                 │ new_reader
//! ┌───────────────▼─────────────────────────────▼───────────────┐
//! │                       Storage Facade                        │
//! │               (lifecycle, atomic batches)                   │
//! └───────────────┬─────────────────────────────┬───────────────┘
//!                 │                             │
//!          ┌──────▼──────┐               ┌──────▼──────┐
//!          │  Key Codec  │◄──────────────┤  Snapshot   │
//!          │ (cf ++ '_') │               │   Reader    │
//!          └──────┬──────┘               └──────┬──────┘
//!                 │                             │
//! ┌───────────────▼─────────────────────────────▼───────────────┐
//! │                      Embedded Engine                        │
//! │            (redb on disk / copy-on-write memory)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use cfkv::{Modification, Storage, CF_DEFAULT};
//!
//! let storage = Storage::open_path(std::path::Path::new("./cfkv_data"))?;
//! storage.write_batch(vec![
//!     Modification::put(CF_DEFAULT, b"a".to_vec(), b"1".to_vec()),
//!     Modification::delete(CF_DEFAULT, b"b".to_vec()),
//! ])?;
//!
//! let mut reader = storage.new_reader()?;
//! assert_eq!(reader.get(CF_DEFAULT, b"a")?, Some(b"1".to_vec()));
//! reader.close();
//!
//! storage.stop()?;
//! # Ok::<(), cfkv::StorageError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod modify;
pub mod engine;
pub mod reader;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use codec::{ALL_CFS, CF_DEFAULT, CF_LOCK, CF_WRITE};
pub use config::Config;
pub use engine::{KvEngine, MemoryEngine, RedbEngine};
pub use error::{EngineError, Result, StorageError};
pub use modify::Modification;
pub use reader::{CfIterator, SnapshotReader};
pub use storage::Storage;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cfkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
