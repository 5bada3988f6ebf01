//! Metadata records for PeerStore
//!
//! These structs are what the metadata repositories persist.

use peerstore_core::block::{BlockMeta, BucketId, Location, ObjectId};
use peerstore_core::erasure::{ShardLayout, ShardRole};
use peerstore_core::error::{Result, StoreError};
use serde::{Deserialize, Serialize};

/// Owner identifier for buckets
pub type OwnerId = u64;

/// A stored object as seen by callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    pub bucket_id: BucketId,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub data_shards: usize,
    pub parity_shards: usize,
    /// Copies kept of every shard
    pub replicas: usize,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Object {
    pub fn new(
        id: ObjectId,
        bucket_id: BucketId,
        name: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        layout: ShardLayout,
        replicas: usize,
    ) -> Self {
        let now = peerstore_core::now_millis();
        Self {
            id,
            bucket_id,
            name: name.into(),
            size,
            content_type: content_type.into(),
            data_shards: layout.data_shards,
            parity_shards: layout.parity_shards,
            replicas,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shard counts the object was encoded with
    pub fn layout(&self) -> ShardLayout {
        ShardLayout::new(self.data_shards, self.parity_shards)
    }
}

/// Durable shard layout of one object.
///
/// `data_blocks[i]` / `parity_blocks[i]` describe shard `i` of each role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub object: Object,

    /// Node that committed the object
    pub root: Location,

    pub data_blocks: Vec<BlockMeta>,
    pub parity_blocks: Vec<BlockMeta>,
}

impl ObjectMeta {
    pub fn bucket_id(&self) -> BucketId {
        self.object.bucket_id
    }

    pub fn object_id(&self) -> ObjectId {
        self.object.id
    }

    /// Blocks of one role, in shard order
    pub fn blocks(&self, role: ShardRole) -> &[BlockMeta] {
        match role {
            ShardRole::Data => &self.data_blocks,
            ShardRole::Parity => &self.parity_blocks,
        }
    }

    /// Every block, data first
    pub fn all_blocks(&self) -> impl Iterator<Item = &BlockMeta> {
        self.data_blocks.iter().chain(self.parity_blocks.iter())
    }

    /// Block counts must match the object's shard layout
    pub fn validate(&self) -> Result<()> {
        let layout = self.object.layout();
        if self.data_blocks.len() != layout.data_shards
            || self.parity_blocks.len() != layout.parity_shards
        {
            return Err(StoreError::ShardCountMismatch {
                expected_data: layout.data_shards,
                expected_parity: layout.parity_shards,
                data: self.data_blocks.len(),
                parity: self.parity_blocks.len(),
            });
        }
        Ok(())
    }
}

/// Bucket registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketMeta {
    pub id: BucketId,
    pub name: String,
    pub owner: OwnerId,
    pub created_at: i64,
    pub updated_at: i64,
}

impl BucketMeta {
    pub fn new(id: BucketId, name: impl Into<String>, owner: OwnerId) -> Self {
        let now = peerstore_core::now_millis();
        Self {
            id,
            name: name.into(),
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Object metadata with one block per shard of `layout`
    pub fn object_meta(bucket_id: BucketId, object_id: ObjectId, layout: ShardLayout) -> ObjectMeta {
        let object = Object::new(
            object_id,
            bucket_id,
            format!("object-{}", object_id),
            1024,
            "application/octet-stream",
            layout,
            2,
        );
        let block = |i: usize| {
            BlockMeta::new(object_id * 100 + i as u64, bucket_id, object_id, &[i as u8; 8])
                .with_locations(vec![Location::new(1, "127.0.0.1:7001")])
        };
        ObjectMeta {
            object,
            root: Location::new(1, "127.0.0.1:7001"),
            data_blocks: (0..layout.data_shards).map(block).collect(),
            parity_blocks: (layout.data_shards..layout.total_shards())
                .map(block)
                .collect(),
        }
    }
}
