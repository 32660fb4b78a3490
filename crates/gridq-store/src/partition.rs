//! Fjall-backed partition with per-key atomic operations
//!
//! A `Partition` owns one fjall partition and the set of secondary indexes
//! registered against it. Every mutation goes through `update`/`remove` so
//! that index maintenance hooks observe exactly the entry transitions that
//! happened in the store.
//!
//! Concurrency model: the host engine serializes operations per partition,
//! so the partition performs no cross-key coordination of its own. The
//! index registry lock only guards registration against in-flight hook
//! dispatch.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::index::MapIndex;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A single partition of the backing store
pub struct Partition {
    name: String,
    keyspace: Keyspace,
    data: PartitionHandle,
    persist_mode: fjall::PersistMode,
    indexes: RwLock<HashMap<String, Arc<dyn MapIndex>>>,
}

impl Partition {
    /// Open a partition under the configured data directory
    pub fn open(config: &StoreConfig, name: &str) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let keyspace = fjall::Config::new(&config.data_dir)
            .cache_size(config.block_cache_size)
            .open()?;

        let data = keyspace.open_partition(
            name,
            PartitionCreateOptions::default()
                .block_size(64 * 1024)
                .compression(config.compression),
        )?;

        Ok(Self {
            name: name.to_string(),
            keyspace,
            data,
            persist_mode: config.persist_mode,
            indexes: RwLock::new(HashMap::new()),
        })
    }

    /// Partition name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read an entry with read-write intent
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(key)?.map(|slice| slice.to_vec()))
    }

    /// Read an entry without any mutation intent
    ///
    /// Distinct from `get` so callers document whether a read is part of a
    /// mutating operation; the store treats both identically.
    pub fn read_only_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.get(key)
    }

    /// Check whether an entry is present
    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.data.contains_key(key)?)
    }

    /// Insert or replace an entry, firing index maintenance hooks
    pub fn update(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let old = self.get(key)?;

        self.data.insert(key, value)?;
        self.keyspace.persist(self.persist_mode)?;

        let indexes = self.indexes.read();
        for index in indexes.values() {
            index.on_insert(key, old.as_deref(), value);
        }

        Ok(())
    }

    /// Remove an entry, firing index maintenance hooks
    ///
    /// Returns the removed value, or `None` if the key was absent (in which
    /// case no hook fires).
    pub fn remove(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let old = self.get(key)?;

        let Some(old) = old else {
            return Ok(None);
        };

        self.data.remove(key)?;
        self.keyspace.persist(self.persist_mode)?;

        let indexes = self.indexes.read();
        for index in indexes.values() {
            index.on_remove(key, &old);
        }

        Ok(Some(old))
    }

    /// Register a secondary index under an extractor identity
    ///
    /// The index is rebuilt from the partition's existing entries before it
    /// becomes visible, so a freshly registered index reflects the current
    /// contents. Re-registering under the same identity replaces the prior
    /// index.
    pub fn register_index(&self, extractor: &str, index: Arc<dyn MapIndex>) -> Result<()> {
        let mut count = 0u64;
        for pair in self.data.iter() {
            let (key, value) = pair?;
            index.on_insert(&key, None, &value);
            count += 1;
        }

        tracing::debug!(
            partition = %self.name,
            extractor,
            entries = count,
            "registered index"
        );

        self.indexes.write().insert(extractor.to_string(), index);
        Ok(())
    }

    /// Look up a registered index by extractor identity
    pub fn index(&self, extractor: &str) -> Option<Arc<dyn MapIndex>> {
        self.indexes.read().get(extractor).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::any::Any;

    /// Test index that records the hook events it sees
    #[derive(Default)]
    struct RecordingIndex {
        events: Mutex<Vec<String>>,
    }

    impl MapIndex for RecordingIndex {
        fn on_insert(&self, key: &[u8], old: Option<&[u8]>, _new: &[u8]) {
            let kind = if old.is_some() { "replace" } else { "insert" };
            self.events
                .lock()
                .push(format!("{}:{}", kind, String::from_utf8_lossy(key)));
        }

        fn on_remove(&self, key: &[u8], _old: &[u8]) {
            self.events
                .lock()
                .push(format!("remove:{}", String::from_utf8_lossy(key)));
        }

        fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn test_partition() -> Partition {
        let dir = tempfile::tempdir().unwrap().keep();
        Partition::open(&StoreConfig::new(dir), "test").unwrap()
    }

    #[test]
    fn test_update_get_remove_roundtrip() {
        let partition = test_partition();

        partition.update(b"k1", b"v1").unwrap();
        assert_eq!(partition.get(b"k1").unwrap(), Some(b"v1".to_vec()));
        assert!(partition.contains(b"k1").unwrap());

        let removed = partition.remove(b"k1").unwrap();
        assert_eq!(removed, Some(b"v1".to_vec()));
        assert_eq!(partition.get(b"k1").unwrap(), None);

        // Removing an absent key is a no-op
        assert_eq!(partition.remove(b"k1").unwrap(), None);
    }

    #[test]
    fn test_index_hooks_fire_on_mutation() {
        let partition = test_partition();
        let index = Arc::new(RecordingIndex::default());
        partition.register_index("test-extractor", index.clone()).unwrap();

        partition.update(b"a", b"1").unwrap();
        partition.update(b"a", b"2").unwrap();
        partition.remove(b"a").unwrap();

        let events = index.events.lock();
        assert_eq!(*events, vec!["insert:a", "replace:a", "remove:a"]);
    }

    #[test]
    fn test_register_index_replays_existing_entries() {
        let partition = test_partition();
        partition.update(b"a", b"1").unwrap();
        partition.update(b"b", b"2").unwrap();

        let index = Arc::new(RecordingIndex::default());
        partition.register_index("test-extractor", index.clone()).unwrap();

        let mut events = index.events.lock().clone();
        events.sort();
        assert_eq!(events, vec!["insert:a", "insert:b"]);
    }

    #[test]
    fn test_index_lookup_by_extractor() {
        let partition = test_partition();
        let index = Arc::new(RecordingIndex::default());
        partition.register_index("test-extractor", index).unwrap();

        assert!(partition.index("test-extractor").is_some());
        assert!(partition.index("other").is_none());
    }
}
