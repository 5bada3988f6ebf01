//! Block types and metadata
//!
//! A block is one physical shard (data or parity) of an object, stored on
//! one or more peer nodes. Every copy is described by the same `BlockMeta`.

use crate::checksum::checksum;
use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Peer node identifier
pub type NodeId = u64;

/// Bucket identifier
pub type BucketId = u64;

/// Object identifier
pub type ObjectId = u64;

/// Block identifier
pub type BlockId = u64;

/// Where a copy of a block lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Owning node
    pub nid: NodeId,

    /// Node address, as reported by the node itself
    pub addr: String,
}

impl Location {
    pub fn new(nid: NodeId, addr: impl Into<String>) -> Self {
        Self {
            nid,
            addr: addr.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.nid, self.addr)
    }
}

/// Block metadata stored alongside block data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMeta {
    /// Unique block identifier
    pub id: BlockId,

    /// Owning bucket
    pub bucket_id: BucketId,

    /// Owning object
    pub object_id: ObjectId,

    /// Size of the block data in bytes
    pub size: u64,

    /// CRC-32 (IEEE) over the block data
    pub checksum: u32,

    /// Unix timestamp (ms) when the block was created
    pub created_at: i64,

    /// Unix timestamp (ms) of the last metadata update
    pub updated_at: i64,

    /// Candidate locations holding a copy
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl BlockMeta {
    /// Describe `data` as block `id` of the given object
    pub fn new(id: BlockId, bucket_id: BucketId, object_id: ObjectId, data: &[u8]) -> Self {
        let now = crate::now_millis();
        Self {
            id,
            bucket_id,
            object_id,
            size: data.len() as u64,
            checksum: checksum(data),
            created_at: now,
            updated_at: now,
            locations: Vec::new(),
        }
    }

    /// Set the locations where copies are placed
    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    /// Check `data` against the recorded size and checksum
    pub fn verify(&self, data: &[u8]) -> Result<()> {
        if data.len() as u64 != self.size {
            return Err(StoreError::BlockSizeMismatch {
                expected: self.size,
                actual: data.len() as u64,
            });
        }
        let actual = checksum(data);
        if actual != self.checksum {
            return Err(StoreError::ChecksumMismatch {
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }
}
