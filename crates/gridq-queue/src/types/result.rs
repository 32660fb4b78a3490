//! Result values returned by the queue protocols
//!
//! All three result types carry a leading format-version byte in their wire
//! encoding; decoding branches on it so formats can evolve without breaking
//! older readers. Expected outcomes (capacity rejection, empty queue) are
//! expressed here as values, never as errors.

use crate::error::{Error, Result};
use crate::types::codec::{
    decode_i64, decode_option_bytes, decode_u8, encode_i64, encode_option_bytes,
};
use serde::{Deserialize, Serialize};

/// Current result wire-format version
pub const RESULT_FORMAT_VERSION: u8 = 1;

/// Outcome of an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueOfferStatus {
    /// The element was written
    Success,
    /// The capacity gate rejected the offer before any mutation
    FailedCapacity,
}

/// Result of an offer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueOfferResult {
    /// The id actually used, which may differ from the tentative id
    pub id: i64,
    pub status: QueueOfferStatus,
}

impl QueueOfferResult {
    pub fn success(id: i64) -> Self {
        Self {
            id,
            status: QueueOfferStatus::Success,
        }
    }

    pub fn failed_capacity() -> Self {
        Self {
            id: 0,
            status: QueueOfferStatus::FailedCapacity,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(10);
        output.push(RESULT_FORMAT_VERSION);
        encode_i64(&mut output, self.id);
        output.push(match self.status {
            QueueOfferStatus::Success => 0,
            QueueOfferStatus::FailedCapacity => 1,
        });
        output
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0;
        check_version(decode_u8(bytes, &mut cursor)?)?;
        let id = decode_i64(bytes, &mut cursor)?;
        let status = match decode_u8(bytes, &mut cursor)? {
            0 => QueueOfferStatus::Success,
            1 => QueueOfferStatus::FailedCapacity,
            tag => {
                return Err(Error::Encoding(format!("invalid offer status: {}", tag)));
            }
        };
        Ok(Self { id, status })
    }
}

/// Result of a poll or peek operation
///
/// A result with no value and id 0 is the distinguished "queue was empty"
/// singleton. A result with no value but a nonzero id means the index's
/// cursor was stale; callers treat it the same as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuePollResult {
    pub id: i64,
    pub value: Option<Vec<u8>>,
}

impl QueuePollResult {
    pub fn new(id: i64, value: Option<Vec<u8>>) -> Self {
        Self { id, value }
    }

    /// The distinguished empty-queue result
    pub fn empty() -> Self {
        Self { id: 0, value: None }
    }

    /// Whether this result carries no element
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(10);
        output.push(RESULT_FORMAT_VERSION);
        encode_i64(&mut output, self.id);
        encode_option_bytes(&mut output, &self.value);
        output
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0;
        check_version(decode_u8(bytes, &mut cursor)?)?;
        let id = decode_i64(bytes, &mut cursor)?;
        let value = decode_option_bytes(bytes, &mut cursor)?;
        Ok(Self { id, value })
    }
}

/// One page of a paged scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuePageResult {
    /// Resume boundary for the next page request: the last id the scan
    /// visited, whether or not its element was still present
    pub last_id: i64,

    /// Collected element values in scan order
    pub values: Vec<Vec<u8>>,
}

impl QueuePageResult {
    pub fn new(last_id: i64, values: Vec<Vec<u8>>) -> Self {
        Self { last_id, values }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut output = Vec::new();
        output.push(RESULT_FORMAT_VERSION);
        encode_i64(&mut output, self.last_id);
        output.extend_from_slice(&(self.values.len() as u32).to_be_bytes());
        for value in &self.values {
            crate::types::codec::encode_bytes(&mut output, value);
        }
        output
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0;
        check_version(decode_u8(bytes, &mut cursor)?)?;
        let last_id = decode_i64(bytes, &mut cursor)?;

        if cursor + 4 > bytes.len() {
            return Err(Error::Encoding("insufficient bytes for count".to_string()));
        }
        let mut count_buf = [0u8; 4];
        count_buf.copy_from_slice(&bytes[cursor..cursor + 4]);
        cursor += 4;

        let count = u32::from_be_bytes(count_buf) as usize;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(crate::types::codec::decode_bytes(bytes, &mut cursor)?);
        }
        Ok(Self { last_id, values })
    }
}

fn check_version(version: u8) -> Result<()> {
    if version == 0 || version > RESULT_FORMAT_VERSION {
        return Err(Error::Encoding(format!(
            "unknown result format version: {}",
            version
        )));
    }
    Ok(())
}
