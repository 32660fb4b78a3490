//! Error types for the queue protocols
//!
//! Expected, recoverable conditions (capacity rejection, empty queue, index
//! staleness) are encoded in result values, not here. The variants below
//! are genuine faults that abort the operation and propagate to the caller.

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the queue protocols
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The index registered for the queue's extractor does not provide the
    /// queue capability. Fatal configuration error.
    #[error(
        "index registered on partition {partition} under extractor {extractor} \
         does not provide the queue index capability"
    )]
    IndexCapabilityMismatch {
        partition: String,
        extractor: String,
    },

    /// The bounded collision walk could not find a free slot. Under the
    /// single-threaded-per-partition execution model this indicates either
    /// a severely stale index or a misbehaving host engine.
    #[error("offer found no free slot after {rounds} rounds of {probes} probes")]
    OfferContention { rounds: u32, probes: u32 },

    /// A stored entry or key could not be decoded
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Backing store fault
    #[error(transparent)]
    Store(#[from] gridq_store::Error),
}
