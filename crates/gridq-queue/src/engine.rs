//! Queue protocol engine
//!
//! Executes the offer, poll/peek, paged-scan, and remove-by-target
//! protocols against one queue's partition and its registered index. Each
//! public method is one atomic unit of work; the host engine serializes
//! invocations per partition, so the engine itself takes no locks beyond
//! what the store needs internally.
//!
//! The index is consulted for cursors and tentative ids but never trusted
//! for correctness: every offer probes the store for collisions, every
//! poll/page tolerates entries that vanished after the cursor was read.

use crate::config::QueueConfig;
use crate::entry::{entry_cost, QueueEntry};
use crate::error::{Error, Result};
use crate::index::{QueueIndex, QUEUE_INDEX_EXTRACTOR};
use crate::types::key::{queue_name_hash, QueueKey, Side};
use crate::types::operation::{QueueOperation, QueueResponse};
use crate::types::result::{QueueOfferResult, QueuePageResult, QueuePollResult};
use gridq_store::{Encode, Partition};
use std::sync::Arc;

/// Protocol engine for one logical queue
pub struct QueueEngine {
    name: String,
    hash: u32,
    partition: Partition,
    config: QueueConfig,
}

impl QueueEngine {
    /// Open the engine for a named queue, registering its index
    ///
    /// The partition is namespaced by the queue-name hash. Registration
    /// rebuilds the index from any entries already present, so reopening a
    /// persisted queue recovers its cursors and byte accounting.
    pub fn new(name: &str, config: QueueConfig) -> Result<Self> {
        let hash = queue_name_hash(name);
        let partition = Partition::open(&config.store, &format!("queue_{:08x}", hash))?;
        partition.register_index(QUEUE_INDEX_EXTRACTOR, Arc::new(QueueIndex::new(hash)))?;

        Ok(Self {
            name: name.to_string(),
            hash,
            partition,
            config,
        })
    }

    /// Queue name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue-name hash
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Resolve the partition's queue index, failing fast if the registered
    /// index does not provide the queue capability
    fn queue_index(&self) -> Result<Arc<QueueIndex>> {
        let mismatch = || Error::IndexCapabilityMismatch {
            partition: self.partition.name().to_string(),
            extractor: QUEUE_INDEX_EXTRACTOR.to_string(),
        };

        let index = self
            .partition
            .index(QUEUE_INDEX_EXTRACTOR)
            .ok_or_else(mismatch)?;

        index
            .as_any_arc()
            .downcast::<QueueIndex>()
            .map_err(|_| mismatch())
    }

    // ----- offer protocol -------------------------------------------------

    /// Offer an element to the head of the queue
    pub fn offer_to_head(&self, value: Vec<u8>, ttl: i64) -> Result<QueueOfferResult> {
        self.offer(Side::Head, value, ttl)
    }

    /// Offer an element to the tail of the queue
    pub fn offer_to_tail(&self, value: Vec<u8>, ttl: i64) -> Result<QueueOfferResult> {
        self.offer(Side::Tail, value, ttl)
    }

    fn offer(&self, side: Side, value: Vec<u8>, ttl: i64) -> Result<QueueOfferResult> {
        let index = self.queue_index()?;

        let encoded = QueueEntry::with_ttl(value, ttl).encode();
        let cost = entry_cost(QueueKey::ENCODED_LEN, encoded.len());

        // Hard admission gate: checked before any mutation
        if index.queue_size() + cost > index.max_queue_size() {
            tracing::debug!(
                queue = %self.name,
                cost,
                queue_bytes = index.queue_size(),
                max_bytes = index.max_queue_size(),
                "offer rejected by capacity gate"
            );
            return Ok(QueueOfferResult::failed_capacity());
        }

        for round in 0..self.config.max_offer_retries {
            // Tentative only: a stale index may hand out an occupied id
            let mut key = QueueKey::new(
                self.hash,
                match side {
                    Side::Tail => index.next_tail_offer(),
                    Side::Head => index.next_head_offer(),
                },
            );

            for _ in 0..self.config.max_offer_probes {
                let key_bytes = key.encode()?;
                if !self.partition.contains(&key_bytes)? {
                    self.partition.update(&key_bytes, &encoded)?;
                    return Ok(QueueOfferResult::success(key.id()));
                }

                // Occupied: walk outward on the target side
                key = match side {
                    Side::Tail => key.next(),
                    Side::Head => key.prev(),
                };
            }

            tracing::warn!(
                queue = %self.name,
                round,
                probes = self.config.max_offer_probes,
                "offer probe budget exhausted, re-fetching cursor"
            );
        }

        Err(Error::OfferContention {
            rounds: self.config.max_offer_retries,
            probes: self.config.max_offer_probes,
        })
    }

    // ----- poll/peek protocol ---------------------------------------------

    /// Remove and return the head element
    pub fn poll_from_head(&self) -> Result<QueuePollResult> {
        self.resolve_extreme(Side::Head, true)
    }

    /// Remove and return the tail element
    pub fn poll_from_tail(&self) -> Result<QueuePollResult> {
        self.resolve_extreme(Side::Tail, true)
    }

    /// Return the head element without removing it
    pub fn peek_at_head(&self) -> Result<QueuePollResult> {
        self.resolve_extreme(Side::Head, false)
    }

    /// Return the tail element without removing it
    pub fn peek_at_tail(&self) -> Result<QueuePollResult> {
        self.resolve_extreme(Side::Tail, false)
    }

    fn resolve_extreme(&self, side: Side, remove: bool) -> Result<QueuePollResult> {
        let index = self.queue_index()?;

        let key = match side {
            Side::Head => index.head_entry_key(),
            Side::Tail => index.tail_entry_key(),
        };
        let Some(key) = key else {
            return Ok(QueuePollResult::empty());
        };

        let key_bytes = key.encode()?;
        let raw = if remove {
            self.partition.remove(&key_bytes)?
        } else {
            self.partition.read_only_get(&key_bytes)?
        };

        match raw {
            Some(bytes) => {
                let entry = QueueEntry::decode(&bytes)?;
                Ok(QueuePollResult::new(key.id(), Some(entry.value)))
            }
            None => {
                // Stale cursor: the entry vanished between cursor read and
                // materialization. Callers treat this as empty.
                tracing::debug!(queue = %self.name, id = key.id(), "stale index cursor");
                Ok(QueuePollResult::new(key.id(), None))
            }
        }
    }

    // ----- paged scan protocol --------------------------------------------

    /// Read up to `page_size` elements past `last_id`, from the head
    /// forward or the tail backward, optionally consuming them.
    ///
    /// The first page passes the scanning side's sentinel (`ID_HEAD` when
    /// `from_head`, `ID_TAIL` otherwise). The returned `last_id` is the
    /// last id the scan visited, including ids whose elements had been
    /// concurrently removed, so the next page resumes correctly across
    /// gaps.
    pub fn page(
        &self,
        from_head: bool,
        page_size: i64,
        last_id: i64,
        poll: bool,
    ) -> Result<QueuePageResult> {
        let index = self.queue_index()?;

        if page_size <= 0 {
            return Ok(QueuePageResult::new(last_id, Vec::new()));
        }

        let ids = if from_head {
            index.tail_map(last_id)
        } else {
            index.head_map(last_id)
        };

        let mut values = Vec::new();
        let mut last = last_id;

        for id in ids {
            last = id;

            let key_bytes = QueueKey::new(self.hash, id).encode()?;
            let raw = if poll {
                self.partition.remove(&key_bytes)?
            } else {
                self.partition.read_only_get(&key_bytes)?
            };

            match raw {
                Some(bytes) => {
                    values.push(QueueEntry::decode(&bytes)?.value);
                    if values.len() as i64 >= page_size {
                        break;
                    }
                }
                // Concurrently removed: skip without counting
                None => {
                    tracing::debug!(queue = %self.name, id, "skipping stale page slot");
                }
            }
        }

        Ok(QueuePageResult::new(last, values))
    }

    // ----- remove-by-target protocol --------------------------------------

    /// Remove the lowest-ordered key of an externally-filtered candidate
    /// batch, reporting its id
    pub fn remove_first(&self, candidates: &[QueueKey]) -> Result<Option<i64>> {
        let Some(key) = candidates.iter().min() else {
            return Ok(None);
        };
        self.partition.remove(&key.encode()?)?;
        Ok(Some(key.id()))
    }

    /// Remove the highest-ordered key of an externally-filtered candidate
    /// batch, reporting its id
    pub fn remove_last(&self, candidates: &[QueueKey]) -> Result<Option<i64>> {
        let Some(key) = candidates.iter().max() else {
            return Ok(None);
        };
        self.partition.remove(&key.encode()?)?;
        Ok(Some(key.id()))
    }

    /// Remove every candidate in key order, reporting the last-removed id
    pub fn remove_all(&self, candidates: &[QueueKey]) -> Result<Option<i64>> {
        let mut sorted: Vec<QueueKey> = candidates.to_vec();
        sorted.sort();

        let mut last = None;
        for key in sorted {
            self.partition.remove(&key.encode()?)?;
            last = Some(key.id());
        }
        Ok(last)
    }

    // ----- operation dispatch ---------------------------------------------

    /// Apply a serialized operation, dispatching to the protocol methods
    pub fn apply(&self, operation: QueueOperation) -> Result<QueueResponse> {
        match operation {
            QueueOperation::OfferHead { value, ttl } => {
                Ok(QueueResponse::Offered(self.offer_to_head(value, ttl)?))
            }
            QueueOperation::OfferTail { value, ttl } => {
                Ok(QueueResponse::Offered(self.offer_to_tail(value, ttl)?))
            }
            QueueOperation::PollHead => Ok(QueueResponse::Polled(self.poll_from_head()?)),
            QueueOperation::PollTail => Ok(QueueResponse::Polled(self.poll_from_tail()?)),
            QueueOperation::PeekHead => Ok(QueueResponse::Polled(self.peek_at_head()?)),
            QueueOperation::PeekTail => Ok(QueueResponse::Polled(self.peek_at_tail()?)),
            QueueOperation::Page {
                from_head,
                page_size,
                last_id,
                poll,
            } => Ok(QueueResponse::Page(
                self.page(from_head, page_size, last_id, poll)?,
            )),
        }
    }

    // ----- size accessors -------------------------------------------------

    /// Accounted queue size in bytes
    pub fn queue_size_bytes(&self) -> Result<i64> {
        Ok(self.queue_index()?.queue_size())
    }

    /// Number of live elements
    pub fn len(&self) -> Result<usize> {
        Ok(self.queue_index()?.element_count())
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Set the capacity bound in bytes
    pub fn set_max_queue_size(&self, max_bytes: i64) -> Result<()> {
        self.queue_index()?.set_max_queue_size(max_bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridq_store::{MapIndex, StoreConfig};

    fn test_engine(name: &str) -> QueueEngine {
        let dir = tempfile::tempdir().unwrap().keep();
        QueueEngine::new(name, QueueConfig::new(StoreConfig::new(dir))).unwrap()
    }

    #[test]
    fn test_offer_walks_past_stale_tentative_id() {
        let engine = test_engine("orders");
        for i in 0..3u8 {
            engine.offer_to_tail(vec![i], 0).unwrap();
        }

        // Make the index forget id 3 while the entry stays in the store,
        // so the next tentative tail id collides with a live entry.
        let index = engine.queue_index().unwrap();
        let key = QueueKey::new(engine.hash(), 3).encode().unwrap();
        index.on_remove(&key, &[]);
        assert_eq!(index.next_tail_offer(), 3);

        let result = engine.offer_to_tail(b"walked".to_vec(), 0).unwrap();
        assert_eq!(result.status, crate::types::result::QueueOfferStatus::Success);
        assert_eq!(result.id, 4);
    }

    #[test]
    fn test_head_offer_walks_outward() {
        let engine = test_engine("orders");
        engine.offer_to_head(b"a".to_vec(), 0).unwrap();

        let index = engine.queue_index().unwrap();
        let key = QueueKey::new(engine.hash(), -1).encode().unwrap();
        index.on_remove(&key, &[]);

        let result = engine.offer_to_head(b"b".to_vec(), 0).unwrap();
        assert_eq!(result.id, -2);
    }

    #[test]
    fn test_offer_contention_bound() {
        let dir = tempfile::tempdir().unwrap().keep();
        let config = QueueConfig::new(StoreConfig::new(dir))
            .with_max_offer_probes(2)
            .with_max_offer_retries(2);
        let engine = QueueEngine::new("orders", config).unwrap();

        for i in 0..4u8 {
            engine.offer_to_tail(vec![i], 0).unwrap();
        }

        // Forget every id so each round's tentative id collides and the
        // probe budget (2 per round, 2 rounds) cannot reach a free slot.
        let index = engine.queue_index().unwrap();
        for id in 1..=4 {
            let key = QueueKey::new(engine.hash(), id).encode().unwrap();
            index.on_remove(&key, &[]);
        }

        let result = engine.offer_to_tail(b"x".to_vec(), 0);
        assert!(matches!(result, Err(Error::OfferContention { .. })));
    }

    #[test]
    fn test_stale_cursor_poll_reports_id_without_value() {
        let engine = test_engine("orders");
        engine.offer_to_tail(b"a".to_vec(), 0).unwrap();

        // Teach the index about an id that has no entry behind it
        let index = engine.queue_index().unwrap();
        let phantom = QueueKey::new(engine.hash(), 5).encode().unwrap();
        index.on_insert(&phantom, None, b"phantom");

        let result = engine.poll_from_tail().unwrap();
        assert_eq!(result.id, 5);
        assert!(result.value.is_none());
    }

    #[test]
    fn test_index_capability_mismatch_is_fatal() {
        use std::any::Any;
        use std::sync::Arc;

        struct NotAQueueIndex;

        impl MapIndex for NotAQueueIndex {
            fn on_insert(&self, _key: &[u8], _old: Option<&[u8]>, _new: &[u8]) {}
            fn on_remove(&self, _key: &[u8], _old: &[u8]) {}
            fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
                self
            }
        }

        let engine = test_engine("orders");
        engine
            .partition
            .register_index(QUEUE_INDEX_EXTRACTOR, Arc::new(NotAQueueIndex))
            .unwrap();

        let result = engine.poll_from_head();
        assert!(matches!(
            result,
            Err(Error::IndexCapabilityMismatch { .. })
        ));
    }

    #[test]
    fn test_page_skips_stale_slots() {
        let engine = test_engine("orders");
        for i in 0..4u8 {
            engine.offer_to_tail(vec![i], 0).unwrap();
        }

        // Entry 2 vanishes from the store but not the index
        let index = engine.queue_index().unwrap();
        let key = QueueKey::new(engine.hash(), 2).encode().unwrap();
        engine.partition.remove(&key).unwrap();
        index.on_insert(&key, None, b"stale");

        let page = engine.page(true, 10, crate::types::key::ID_HEAD, false).unwrap();
        assert_eq!(page.values, vec![vec![0u8], vec![2u8], vec![3u8]]);
        assert_eq!(page.last_id, 4);
    }
}
