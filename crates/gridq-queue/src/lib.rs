//! Distributed-queue offer/poll/page protocols over a partitioned
//! key-value store
//!
//! Implements the concurrency primitive at the core of a data-grid queue:
//! many concurrent offers and polls against one logical queue keep a
//! consistent element ordering using only per-entry atomic operations and
//! an auxiliary cursor index, with no lock manager and no cross-key
//! transactions.
//!
//! Key design points:
//! - Elements are keyed by `(queue-name hash, signed id)`; positive ids
//!   grow toward the tail, negative toward the head
//! - The `QueueIndex` caches cursors and byte accounting; it is never
//!   authoritative, and every protocol self-heals when it is stale
//! - Offers resolve id collisions by walking outward from a tentative id,
//!   bounded by a configurable probe budget
//! - Capacity is a hard admission gate checked before any mutation, and a
//!   rejection is a result value, not an error

pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod index;
pub mod types;

pub use config::QueueConfig;
pub use engine::QueueEngine;
pub use entry::{QueueEntry, ENTRY_FORMAT_VERSION, ENTRY_OVERHEAD, EXPIRY_DEFAULT};
pub use error::{Error, Result};
pub use index::{QueueIndex, QUEUE_INDEX_EXTRACTOR};
pub use types::{
    queue_name_hash, OperationType, QueueKey, QueueOfferResult, QueueOfferStatus, QueueOperation,
    QueuePageResult, QueuePollResult, QueueResponse, Side, ID_HEAD, ID_TAIL,
};
