//! Configuration for cfkv
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};

/// Main configuration for a storage instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── kv/
    ///         └── data.redb    (engine file, all column families)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Engine Configuration
    // -------------------------------------------------------------------------
    /// Page cache size handed to the engine (in bytes)
    pub cache_size: usize,

    /// fsync on every commit. When false, commits are durable eventually.
    pub sync_on_commit: bool,

    // -------------------------------------------------------------------------
    // Reader Configuration
    // -------------------------------------------------------------------------
    /// Number of pairs a column-family iterator pulls from the snapshot at once
    pub scan_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./cfkv_data"),
            cache_size: 64 * 1024 * 1024, // 64 MB
            sync_on_commit: true,
            scan_batch_size: 128,
        }
    }
}

impl Config {
    const KV_DIR: &'static str = "kv";
    const ENGINE_FILENAME: &'static str = "data.redb";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Directory holding the key-value engine files
    pub fn kv_dir(&self) -> PathBuf {
        self.data_dir.join(Self::KV_DIR)
    }

    /// Path of the engine database file
    pub fn engine_path(&self) -> PathBuf {
        self.kv_dir().join(Self::ENGINE_FILENAME)
    }

    /// Default config rooted at `path`
    pub fn for_path(path: &Path) -> Self {
        Self::builder().data_dir(path).build()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the engine page cache size (in bytes)
    pub fn cache_size(mut self, bytes: usize) -> Self {
        self.config.cache_size = bytes;
        self
    }

    /// Choose between fsync-per-commit and eventual durability
    pub fn sync_on_commit(mut self, sync: bool) -> Self {
        self.config.sync_on_commit = sync;
        self
    }

    /// Set the iterator prefetch batch size (clamped to at least 1)
    pub fn scan_batch_size(mut self, size: usize) -> Self {
        self.config.scan_batch_size = size.max(1);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
