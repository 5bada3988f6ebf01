//! Block store trait
//!
//! Defines the interface that every node-local block persistence layer must
//! follow. Blocks are addressed by (bucket, object, block) and always stored
//! together with their `BlockMeta`.

use bytes::Bytes;
use peerstore_core::block::{BlockId, BlockMeta, BucketId, ObjectId};
use peerstore_core::error::{Result, StoreError};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Address of one block copy on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey {
    pub bucket_id: BucketId,
    pub object_id: ObjectId,
    pub block_id: BlockId,
}

impl BlockKey {
    pub fn new(bucket_id: BucketId, object_id: ObjectId, block_id: BlockId) -> Self {
        Self {
            bucket_id,
            object_id,
            block_id,
        }
    }

    /// Key of the block described by `meta`
    pub fn of(meta: &BlockMeta) -> Self {
        Self::new(meta.bucket_id, meta.object_id, meta.id)
    }

    /// Error reported when this block is not stored
    pub fn not_found(&self) -> StoreError {
        StoreError::BlockNotFound {
            bucket_id: self.bucket_id,
            object_id: self.object_id,
            block_id: self.block_id,
        }
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.bucket_id, self.object_id, self.block_id)
    }
}

/// Reject payloads that do not match the size recorded in their metadata
pub(crate) fn check_size(meta: &BlockMeta, data: &[u8]) -> Result<()> {
    if data.len() as u64 != meta.size {
        return Err(StoreError::BlockSizeMismatch {
            expected: meta.size,
            actual: data.len() as u64,
        });
    }
    Ok(())
}

/// Block store statistics
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    /// Total number of blocks stored
    pub block_count: u64,

    /// Total bytes used by block data
    pub bytes_used: u64,

    /// Number of read operations
    pub reads: u64,

    /// Number of write operations
    pub writes: u64,

    /// Number of delete operations
    pub deletes: u64,
}

/// Async block store trait
///
/// All implementations must be Send + Sync for use in async contexts.
pub trait BlockStore: Send + Sync {
    /// Durably store a block and its metadata, replacing any previous copy
    fn store_block<'a>(
        &'a self,
        meta: BlockMeta,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Fetch a block's bytes
    fn get_block<'a>(
        &'a self,
        key: BlockKey,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + 'a>>;

    /// Fetch a block's stored metadata
    fn get_block_meta<'a>(
        &'a self,
        key: BlockKey,
    ) -> Pin<Box<dyn Future<Output = Result<BlockMeta>> + Send + 'a>>;

    /// Remove a block and its metadata. Returns false if nothing was stored.
    fn delete_block<'a>(
        &'a self,
        key: BlockKey,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;

    /// Get store statistics
    fn stats<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<StoreStats>> + Send + 'a>>;
}

/// Synchronous block store trait (for simpler implementations)
pub trait BlockStoreSync: Send + Sync {
    /// Store a block
    fn store_block(&self, meta: BlockMeta, data: Bytes) -> Result<()>;

    /// Retrieve a block
    fn get_block(&self, key: BlockKey) -> Result<Bytes>;

    /// Retrieve a block's metadata
    fn get_block_meta(&self, key: BlockKey) -> Result<BlockMeta>;

    /// Delete a block
    fn delete_block(&self, key: BlockKey) -> Result<bool>;

    /// Get store statistics
    fn stats(&self) -> Result<StoreStats>;
}

/// Wrapper to convert a sync store to async
pub struct AsyncWrapper<T: BlockStoreSync>(pub T);

impl<T: BlockStoreSync + 'static> BlockStore for AsyncWrapper<T> {
    fn store_block<'a>(
        &'a self,
        meta: BlockMeta,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move { self.0.store_block(meta, data) })
    }

    fn get_block<'a>(
        &'a self,
        key: BlockKey,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + 'a>> {
        Box::pin(async move { self.0.get_block(key) })
    }

    fn get_block_meta<'a>(
        &'a self,
        key: BlockKey,
    ) -> Pin<Box<dyn Future<Output = Result<BlockMeta>> + Send + 'a>> {
        Box::pin(async move { self.0.get_block_meta(key) })
    }

    fn delete_block<'a>(
        &'a self,
        key: BlockKey,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move { self.0.delete_block(key) })
    }

    fn stats<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<StoreStats>> + Send + 'a>> {
        Box::pin(async move { self.0.stats() })
    }
}
