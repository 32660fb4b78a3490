//! Partitioned key-value backing store with secondary index maintenance
//!
//! This crate provides the storage collaborator the queue protocol runs
//! against:
//! - Per-key atomic get / read-only get / update / remove on a partition
//! - A secondary-index subsystem: indexes register under an extractor
//!   identity, are rebuilt from existing entries on registration, and are
//!   kept in sync by hooks fired on every entry insert/remove
//!
//! The store is byte-oriented; key and value encodings are the caller's
//! concern. Indexes receive raw key/value bytes in their maintenance hooks
//! and expose capabilities to callers via an `Any`-based downcast.

pub mod config;
pub mod encoding;
pub mod error;
pub mod index;
pub mod partition;

pub use config::StoreConfig;
pub use encoding::{Decode, Encode};
pub use error::{Error, Result};
pub use index::MapIndex;
pub use partition::Partition;
