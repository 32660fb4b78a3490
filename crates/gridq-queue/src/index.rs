//! Queue index
//!
//! Per-queue cursor and accounting cache registered against the queue's
//! partition. It tracks the set of live element ids, the byte cost of each
//! entry, and the configured capacity bound, giving the protocols O(log n)
//! access to the current head/tail cursors and sorted id views without
//! scanning the store.
//!
//! The index is an acceleration structure, not a source of truth. It is
//! mutated exclusively by the store's maintenance hooks; the protocols only
//! read it, and must tolerate its cursors being stale relative to the
//! entries themselves.

use crate::entry::entry_cost;
use crate::types::key::QueueKey;
use gridq_store::{Decode, MapIndex};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

/// Extractor identity the queue index registers under
pub const QUEUE_INDEX_EXTRACTOR: &str = "queue-key";

#[derive(Default)]
struct IndexState {
    /// Live element ids mapped to their accounted byte cost
    ids: BTreeMap<i64, i64>,

    /// Total accounted bytes
    bytes: i64,
}

/// Cursor and size-accounting index for one queue
pub struct QueueIndex {
    hash: u32,
    state: Mutex<IndexState>,
    max_bytes: Mutex<i64>,
}

impl QueueIndex {
    /// Create an index for the queue with the given name hash
    pub fn new(hash: u32) -> Self {
        Self {
            hash,
            state: Mutex::new(IndexState::default()),
            max_bytes: Mutex::new(i64::MAX),
        }
    }

    /// Queue-name hash this index serves
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Tentative next free id on the tail side. Best-effort, not a
    /// reservation: the offer protocol must still probe for collisions.
    pub fn next_tail_offer(&self) -> i64 {
        let state = self.state.lock();
        match state.ids.last_key_value() {
            Some((max, _)) => max + 1,
            None => 1,
        }
    }

    /// Tentative next free id on the head side
    pub fn next_head_offer(&self) -> i64 {
        let state = self.state.lock();
        match state.ids.first_key_value() {
            Some((min, _)) => min - 1,
            None => -1,
        }
    }

    /// Storage key of the current head element, or `None` if the queue is
    /// empty as far as the index knows
    pub fn head_entry_key(&self) -> Option<QueueKey> {
        let state = self.state.lock();
        state
            .ids
            .first_key_value()
            .map(|(id, _)| QueueKey::new(self.hash, *id))
    }

    /// Storage key of the current tail element
    pub fn tail_entry_key(&self) -> Option<QueueKey> {
        let state = self.state.lock();
        state
            .ids
            .last_key_value()
            .map(|(id, _)| QueueKey::new(self.hash, *id))
    }

    /// Ids strictly greater than `from_id`, ascending (toward the tail)
    pub fn tail_map(&self, from_id: i64) -> Vec<i64> {
        let state = self.state.lock();
        state
            .ids
            .range((Bound::Excluded(from_id), Bound::Unbounded))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ids strictly less than `from_id`, descending (toward the head)
    pub fn head_map(&self, from_id: i64) -> Vec<i64> {
        let state = self.state.lock();
        state
            .ids
            .range((Bound::Unbounded, Bound::Excluded(from_id)))
            .rev()
            .map(|(id, _)| *id)
            .collect()
    }

    /// Accounted queue size in bytes
    pub fn queue_size(&self) -> i64 {
        self.state.lock().bytes
    }

    /// Number of live elements the index knows about
    pub fn element_count(&self) -> usize {
        self.state.lock().ids.len()
    }

    /// Capacity bound in bytes
    pub fn max_queue_size(&self) -> i64 {
        *self.max_bytes.lock()
    }

    /// Set the capacity bound in bytes
    pub fn set_max_queue_size(&self, max_bytes: i64) {
        *self.max_bytes.lock() = max_bytes;
    }

    /// Decode a raw store key, ignoring keys this index does not own
    fn own_key(&self, key: &[u8]) -> Option<QueueKey> {
        let key = QueueKey::decode(key).ok()?;
        (key.hash() == self.hash).then_some(key)
    }
}

impl MapIndex for QueueIndex {
    fn on_insert(&self, key: &[u8], _old: Option<&[u8]>, new: &[u8]) {
        let Some(queue_key) = self.own_key(key) else {
            return;
        };

        let cost = entry_cost(key.len(), new.len());
        let mut state = self.state.lock();
        if let Some(prior) = state.ids.insert(queue_key.id(), cost) {
            // Replacement: prior accounting is superseded
            state.bytes -= prior;
        }
        state.bytes += cost;
    }

    fn on_remove(&self, key: &[u8], _old: &[u8]) {
        let Some(queue_key) = self.own_key(key) else {
            return;
        };

        let mut state = self.state.lock();
        if let Some(cost) = state.ids.remove(&queue_key.id()) {
            state.bytes -= cost;
        }
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::key::queue_name_hash;
    use gridq_store::Encode;

    fn insert(index: &QueueIndex, id: i64, value_len: usize) {
        let key = QueueKey::new(index.hash(), id).encode().unwrap();
        index.on_insert(&key, None, &vec![0u8; value_len]);
    }

    fn remove(index: &QueueIndex, id: i64) {
        let key = QueueKey::new(index.hash(), id).encode().unwrap();
        index.on_remove(&key, &[]);
    }

    #[test]
    fn test_offers_on_empty_queue() {
        let index = QueueIndex::new(queue_name_hash("orders"));
        assert_eq!(index.next_tail_offer(), 1);
        assert_eq!(index.next_head_offer(), -1);
        assert_eq!(index.head_entry_key(), None);
        assert_eq!(index.tail_entry_key(), None);
    }

    #[test]
    fn test_cursors_track_extremes() {
        let index = QueueIndex::new(queue_name_hash("orders"));
        insert(&index, 1, 10);
        insert(&index, 2, 10);
        insert(&index, -1, 10);

        assert_eq!(index.next_tail_offer(), 3);
        assert_eq!(index.next_head_offer(), -2);
        assert_eq!(index.head_entry_key().unwrap().id(), -1);
        assert_eq!(index.tail_entry_key().unwrap().id(), 2);

        remove(&index, -1);
        assert_eq!(index.head_entry_key().unwrap().id(), 1);
    }

    #[test]
    fn test_byte_accounting() {
        let index = QueueIndex::new(queue_name_hash("orders"));
        assert_eq!(index.queue_size(), 0);

        insert(&index, 1, 100);
        let cost = entry_cost(QueueKey::ENCODED_LEN, 100);
        assert_eq!(index.queue_size(), cost);

        // Replacement supersedes prior accounting
        insert(&index, 1, 50);
        assert_eq!(index.queue_size(), entry_cost(QueueKey::ENCODED_LEN, 50));

        remove(&index, 1);
        assert_eq!(index.queue_size(), 0);
        assert_eq!(index.element_count(), 0);
    }

    #[test]
    fn test_sorted_views() {
        let index = QueueIndex::new(queue_name_hash("orders"));
        for id in [-2, -1, 1, 2, 3] {
            insert(&index, id, 1);
        }

        assert_eq!(index.tail_map(i64::MIN), vec![-2, -1, 1, 2, 3]);
        assert_eq!(index.tail_map(1), vec![2, 3]);
        assert_eq!(index.head_map(i64::MAX), vec![3, 2, 1, -1, -2]);
        assert_eq!(index.head_map(1), vec![-1, -2]);
    }

    #[test]
    fn test_foreign_keys_ignored() {
        let index = QueueIndex::new(queue_name_hash("orders"));
        let foreign = QueueKey::new(queue_name_hash("invoices"), 1)
            .encode()
            .unwrap();
        index.on_insert(&foreign, None, b"x");
        index.on_insert(b"not-a-queue-key", None, b"x");

        assert_eq!(index.element_count(), 0);
    }

    #[test]
    fn test_max_queue_size() {
        let index = QueueIndex::new(queue_name_hash("orders"));
        assert_eq!(index.max_queue_size(), i64::MAX);
        index.set_max_queue_size(1000);
        assert_eq!(index.max_queue_size(), 1000);
    }
}
