//! Error types for cfkv
//!
//! Two layers:
//! - [`EngineError`]: failures reported by the embedded engine, passed
//!   through unchanged.
//! - [`StorageError`]: the error surface of the storage layer, classifying
//!   where in the lifecycle an engine error happened.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StorageError
pub type Result<T> = std::result::Result<T, StorageError>;

/// Result type alias for engine-level operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors raised by an embedded engine backend
#[derive(Debug, Error)]
pub enum EngineError {
    /// Point lookup target is absent. Readers turn this into `None`.
    #[error("Key not found")]
    KeyNotFound,

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine handle has already been released
    #[error("Engine closed")]
    Closed,

    /// Backend-specific failure that has no dedicated variant
    #[error("Engine error: {0}")]
    Other(String),
}

// redb splits its errors per operation; funnel them all through redb::Error.
macro_rules! impl_from_redb {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for EngineError {
                fn from(err: $ty) -> Self {
                    EngineError::Redb(err.into())
                }
            }
        )*
    };
}

impl_from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Unified error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Failed to initialize storage at {}: {source}", .path.display())]
    Initialization {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(#[source] EngineError),

    #[error("Storage is closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Read / Write Errors
    // -------------------------------------------------------------------------
    #[error("Read failed: {0}")]
    Read(#[source] EngineError),

    #[error("Transaction failed: {0}")]
    Transaction(#[source] EngineError),

    // -------------------------------------------------------------------------
    // Misuse Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot reader used after close")]
    ReaderClosed,

    #[error("Invalid column family {name:?}: {reason}")]
    InvalidColumnFamily { name: String, reason: &'static str },

    // -------------------------------------------------------------------------
    // Batch File Errors
    // -------------------------------------------------------------------------
    #[error("Batch file error: {0}")]
    BatchFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// The engine error underneath, if this error came from the engine
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            StorageError::Initialization { source, .. } => Some(source),
            StorageError::EngineUnavailable(e)
            | StorageError::Read(e)
            | StorageError::Transaction(e) => Some(e),
            _ => None,
        }
    }

    /// Whether retrying the same call may succeed.
    ///
    /// A failed batch is fully rolled back, so the whole batch can be
    /// resubmitted.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageError::EngineUnavailable(_) | StorageError::Transaction(_)
        )
    }
}
