//! Internal document identifiers.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

/// Opaque, totally ordered identifier of a document within one index snapshot.
///
/// Ordering is plain byte-wise comparison, which is the merge key for every
/// searcher. Numeric ids are encoded big-endian so that byte order and
/// numeric order agree.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexInternalId(Vec<u8>);

impl IndexInternalId {
    /// Create an id from raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        IndexInternalId(bytes)
    }

    /// Create an id from a document number.
    pub fn from_u64(value: u64) -> Self {
        let mut buf = vec![0u8; 8];
        BigEndian::write_u64(&mut buf, value);
        IndexInternalId(buf)
    }

    /// Decode the document number, if this id was created by [`from_u64`](Self::from_u64).
    pub fn to_u64(&self) -> Option<u64> {
        if self.0.len() == 8 {
            Some(BigEndian::read_u64(&self.0))
        } else {
            None
        }
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the id has no bytes. Pooled matches carry an empty id until filled.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite this id with `other`, reusing the existing allocation.
    pub fn set_from(&mut self, other: &IndexInternalId) {
        self.0.clear();
        self.0.extend_from_slice(&other.0);
    }

    /// Clear the id, keeping its allocation.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl From<u64> for IndexInternalId {
    fn from(value: u64) -> Self {
        IndexInternalId::from_u64(value)
    }
}

impl From<&[u8]> for IndexInternalId {
    fn from(bytes: &[u8]) -> Self {
        IndexInternalId(bytes.to_vec())
    }
}

impl fmt::Debug for IndexInternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u64() {
            Some(n) => write!(f, "IndexInternalId({n})"),
            None => write!(f, "IndexInternalId({:?})", self.0),
        }
    }
}
