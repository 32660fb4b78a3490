//! Encoding traits for storage-resident types
//!
//! The store is byte-oriented and makes no assumptions about what callers
//! put in it. Types that rest in a partition implement these traits to fix
//! their byte layout, which matters here because key encodings double as
//! the store's sort order (the queue key flips its id sign bit for exactly
//! that reason).

use crate::error::Result;

/// Encode a value to bytes
pub trait Encode {
    fn encode(&self) -> Result<Vec<u8>>;
}

/// Decode a value from bytes
pub trait Decode: Sized {
    fn decode(bytes: &[u8]) -> Result<Self>;
}
