//! Type system for the queue protocols

pub(crate) mod codec;
pub mod key;
pub mod operation;
pub mod result;

pub use key::{queue_name_hash, QueueKey, Side, ID_HEAD, ID_TAIL};
pub use operation::{OperationType, QueueOperation, QueueResponse};
pub use result::{QueueOfferResult, QueueOfferStatus, QueuePageResult, QueuePollResult};
