//! Queue keys
//!
//! Every element of a logical queue is stored under a `QueueKey`: the CRC32
//! hash of the queue name (the partition-routing and namespacing
//! discriminator) plus a signed element id. Positive ids grow toward the
//! tail, negative ids toward the head; `ID_HEAD`/`ID_TAIL` are sentinel
//! markers meaning "resolve via the current cursor" and are never used as
//! element keys.
//!
//! The byte encoding is order-preserving: the id's sign bit is flipped so
//! lexicographic order of encoded keys equals `(hash, id)` order. This is
//! what makes min/max selection over raw stored keys meaningful.

use gridq_store::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Sentinel id: resolve via the current head cursor
pub const ID_HEAD: i64 = i64::MIN;

/// Sentinel id: resolve via the current tail cursor
pub const ID_TAIL: i64 = i64::MAX;

/// Which end of the queue an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// The consumable front; ids grow negative
    Head,
    /// The back; ids grow positive
    Tail,
}

impl Side {
    /// Side convention for an id: negative ids belong to the head side,
    /// zero and positive ids to the tail side.
    pub fn of_id(id: i64) -> Self {
        if id < 0 { Side::Head } else { Side::Tail }
    }
}

/// Compute the deterministic hash of a queue name.
///
/// CRC32 over the UTF-8 bytes of the name. Clients in other languages can
/// reproduce this with any standard CRC32 (IEEE) implementation.
pub fn queue_name_hash(name: &str) -> u32 {
    crc32fast::hash(name.as_bytes())
}

/// Storage key for a single queue element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueueKey {
    hash: u32,
    id: i64,
}

impl QueueKey {
    /// Encoded length in bytes: 4-byte hash + 8-byte id
    pub const ENCODED_LEN: usize = 12;

    /// Create a key for a specific element id
    pub fn new(hash: u32, id: i64) -> Self {
        Self { hash, id }
    }

    /// Sentinel key resolving to the named queue's head cursor
    pub fn head(name: &str) -> Self {
        Self::new(queue_name_hash(name), ID_HEAD)
    }

    /// Sentinel key resolving to the named queue's tail cursor
    pub fn tail(name: &str) -> Self {
        Self::new(queue_name_hash(name), ID_TAIL)
    }

    /// Queue-name hash component
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Element id component
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Which side of the queue this key's id belongs to
    pub fn side(&self) -> Side {
        Side::of_id(self.id)
    }

    /// The adjacent id toward the tail
    pub fn next(&self) -> Self {
        Self::new(self.hash, self.id + 1)
    }

    /// The adjacent id toward the head
    pub fn prev(&self) -> Self {
        Self::new(self.hash, self.id - 1)
    }

    /// Whether this is the head-cursor sentinel
    pub fn is_head_sentinel(&self) -> bool {
        self.id == ID_HEAD
    }

    /// Whether this is the tail-cursor sentinel
    pub fn is_tail_sentinel(&self) -> bool {
        self.id == ID_TAIL
    }
}

impl Encode for QueueKey {
    fn encode(&self) -> gridq_store::Result<Vec<u8>> {
        let mut output = Vec::with_capacity(Self::ENCODED_LEN);
        output.extend_from_slice(&self.hash.to_be_bytes());
        // Flip the sign bit so negative ids sort before positive ones
        output.extend_from_slice(&((self.id as u64) ^ (1 << 63)).to_be_bytes());
        Ok(output)
    }
}

impl Decode for QueueKey {
    fn decode(bytes: &[u8]) -> gridq_store::Result<Self> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(gridq_store::Error::Encoding(format!(
                "QueueKey must be {} bytes, got {}",
                Self::ENCODED_LEN,
                bytes.len()
            )));
        }
        let mut hash_buf = [0u8; 4];
        hash_buf.copy_from_slice(&bytes[..4]);
        let mut id_buf = [0u8; 8];
        id_buf.copy_from_slice(&bytes[4..]);
        Ok(Self {
            hash: u32::from_be_bytes(hash_buf),
            id: (u64::from_be_bytes(id_buf) ^ (1 << 63)) as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_name_hash_is_standard_crc32() {
        // IEEE CRC32 check value
        assert_eq!(queue_name_hash("123456789"), 0xCBF43926);
        assert_eq!(queue_name_hash("orders"), queue_name_hash("orders"));
        assert_ne!(queue_name_hash("orders"), queue_name_hash("invoices"));
    }

    #[test]
    fn test_key_encode_decode_roundtrip() {
        for id in [ID_HEAD, -5, -1, 0, 1, 42, ID_TAIL] {
            let key = QueueKey::new(queue_name_hash("orders"), id);
            let encoded = key.encode().unwrap();
            assert_eq!(encoded.len(), QueueKey::ENCODED_LEN);
            assert_eq!(QueueKey::decode(&encoded).unwrap(), key);
        }
    }

    #[test]
    fn test_encoded_order_matches_id_order() {
        let hash = queue_name_hash("orders");
        let ids = [ID_HEAD, -100, -1, 0, 1, 100, ID_TAIL];
        let encoded: Vec<Vec<u8>> = ids
            .iter()
            .map(|id| QueueKey::new(hash, *id).encode().unwrap())
            .collect();

        for pair in encoded.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_next_prev() {
        let key = QueueKey::new(1, 0);
        assert_eq!(key.next().id(), 1);
        assert_eq!(key.prev().id(), -1);
        assert_eq!(key.next().hash(), key.hash());
    }

    #[test]
    fn test_side_convention() {
        assert_eq!(Side::of_id(-1), Side::Head);
        assert_eq!(Side::of_id(0), Side::Tail);
        assert_eq!(Side::of_id(1), Side::Tail);
        assert!(QueueKey::head("q").is_head_sentinel());
        assert!(QueueKey::tail("q").is_tail_sentinel());
    }
}
