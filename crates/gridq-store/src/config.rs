//! Store configuration
//!
//! One `StoreConfig` describes where a partition's data lives and how
//! fjall should treat it. The queue workload is small-value and
//! read-mostly once offered, so the defaults favor cheap writes: Lz4
//! compression and buffered persistence, with durability escalation left
//! to `with_persist_mode`.

use std::path::PathBuf;

/// Configuration for the backing store
#[derive(Clone)]
pub struct StoreConfig {
    /// Directory holding the fjall keyspace
    pub data_dir: PathBuf,

    /// Fjall block cache size in bytes
    pub block_cache_size: u64,

    /// Compression applied to data blocks
    pub compression: fjall::CompressionType,

    /// Journal persistence mode applied after each mutation
    pub persist_mode: fjall::PersistMode,
}

impl StoreConfig {
    const DEFAULT_BLOCK_CACHE_SIZE: u64 = 64 * 1024 * 1024;

    /// Create a config rooted at the given data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            block_cache_size: Self::DEFAULT_BLOCK_CACHE_SIZE,
            compression: fjall::CompressionType::Lz4,
            persist_mode: fjall::PersistMode::Buffer,
        }
    }

    /// Create a config rooted at a fresh scratch directory
    ///
    /// The directory is kept rather than deleted on drop, so a store
    /// opened this way survives as long as the host filesystem does.
    pub fn ephemeral() -> Self {
        let data_dir = tempfile::tempdir()
            .expect("failed to create scratch directory")
            .keep();
        Self::new(data_dir)
    }

    /// Set the block cache size
    pub fn with_block_cache_size(mut self, size: u64) -> Self {
        self.block_cache_size = size;
        self
    }

    /// Set the compression type
    pub fn with_compression(mut self, compression: fjall::CompressionType) -> Self {
        self.compression = compression;
        self
    }

    /// Set the persistence mode
    pub fn with_persist_mode(mut self, mode: fjall::PersistMode) -> Self {
        self.persist_mode = mode;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::ephemeral()
    }
}
