//! Queue operation types
//!
//! The serializable request surface the routing layer ships to the
//! partition owning a queue's entries. Each operation maps onto one of the
//! engine's protocol methods; `operation_type` classifies it for the host
//! engine's read/write scheduling.

use crate::types::result::{QueueOfferResult, QueuePageResult, QueuePollResult};
use serde::{Deserialize, Serialize};

/// Type of operation - read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    /// Read operation - does not modify state
    Read,
    /// Write operation - modifies state
    Write,
}

/// Queue operations that can be sent in messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueOperation {
    /// Offer an element to the head of the queue
    OfferHead { value: Vec<u8>, ttl: i64 },

    /// Offer an element to the tail of the queue
    OfferTail { value: Vec<u8>, ttl: i64 },

    /// Remove and return the head element
    PollHead,

    /// Remove and return the tail element
    PollTail,

    /// Return the head element without removing it
    PeekHead,

    /// Return the tail element without removing it
    PeekTail,

    /// Read (optionally consume) up to `page_size` elements past `last_id`
    Page {
        from_head: bool,
        page_size: i64,
        last_id: i64,
        poll: bool,
    },
}

impl QueueOperation {
    /// Get the type of this operation (read or write)
    pub fn operation_type(&self) -> OperationType {
        match self {
            QueueOperation::OfferHead { .. } => OperationType::Write,
            QueueOperation::OfferTail { .. } => OperationType::Write,
            QueueOperation::PollHead => OperationType::Write,
            QueueOperation::PollTail => OperationType::Write,
            QueueOperation::PeekHead => OperationType::Read,
            QueueOperation::PeekTail => OperationType::Read,
            QueueOperation::Page { poll, .. } => {
                if *poll {
                    OperationType::Write
                } else {
                    OperationType::Read
                }
            }
        }
    }
}

/// Response types for queue operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueResponse {
    /// Result of an offer
    Offered(QueueOfferResult),

    /// Result of a poll or peek
    Polled(QueuePollResult),

    /// One page of a scan
    Page(QueuePageResult),
}
