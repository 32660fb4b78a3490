//! Stored entry layout
//!
//! An offered element rests in the backing store as a version-tagged record
//! carrying the expiry hint and the opaque element bytes. Decoding branches
//! on the leading version byte so older records remain readable: a
//! version-0 record has no ttl field and decodes with the default-expiry
//! sentinel.

use crate::error::{Error, Result};
use crate::types::codec::{decode_bytes, decode_i64, decode_u8, encode_bytes, encode_i64};

/// Expiry hint meaning "use the host engine's configured default"
pub const EXPIRY_DEFAULT: i64 = 0;

/// Current stored-entry format version
pub const ENTRY_FORMAT_VERSION: u8 = 1;

/// Fixed per-entry housekeeping overhead charged by the capacity gate,
/// in addition to the encoded key and value lengths.
pub const ENTRY_OVERHEAD: i64 = 48;

/// Byte cost of an entry as accounted by the capacity gate and the index
pub fn entry_cost(key_len: usize, value_len: usize) -> i64 {
    (key_len + value_len) as i64 + ENTRY_OVERHEAD
}

/// A queue element as stored in the backing map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// Expiry hint in milliseconds; `EXPIRY_DEFAULT` when unspecified
    pub ttl: i64,

    /// The serialized element
    pub value: Vec<u8>,
}

impl QueueEntry {
    /// Create an entry with the default expiry hint
    pub fn new(value: Vec<u8>) -> Self {
        Self {
            ttl: EXPIRY_DEFAULT,
            value,
        }
    }

    /// Create an entry with an explicit expiry hint
    pub fn with_ttl(value: Vec<u8>, ttl: i64) -> Self {
        Self { ttl, value }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(1 + 8 + 4 + self.value.len());
        output.push(ENTRY_FORMAT_VERSION);
        encode_i64(&mut output, self.ttl);
        encode_bytes(&mut output, &self.value);
        output
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0;
        let version = decode_u8(bytes, &mut cursor)?;
        match version {
            // Version 0 predates the ttl field
            0 => Ok(Self {
                ttl: EXPIRY_DEFAULT,
                value: decode_bytes(bytes, &mut cursor)?,
            }),
            1 => {
                let ttl = decode_i64(bytes, &mut cursor)?;
                let value = decode_bytes(bytes, &mut cursor)?;
                Ok(Self { ttl, value })
            }
            other => Err(Error::Encoding(format!(
                "unknown entry format version: {}",
                other
            ))),
        }
    }
}
