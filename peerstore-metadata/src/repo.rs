//! Metadata repository contracts
//!
//! Object metadata is written once: a second write for the same
//! (bucket, object) pair is rejected rather than overwriting the record.

use crate::models::{BucketMeta, ObjectMeta, OwnerId};
use async_trait::async_trait;
use peerstore_core::block::{BucketId, ObjectId};
use peerstore_core::error::Result;

/// Object metadata persistence
#[async_trait]
pub trait ObjectMetaRepo: Send + Sync {
    /// Persist a new record. Fails with `AlreadyExists` for a known pair.
    async fn store_meta(&self, meta: &ObjectMeta) -> Result<()>;

    /// Load a record. Fails with `ObjectNotFound` when absent.
    async fn get_meta(&self, bucket_id: BucketId, object_id: ObjectId) -> Result<ObjectMeta>;

    /// Every record of a bucket, ordered by object id
    async fn list_meta(&self, bucket_id: BucketId) -> Result<Vec<ObjectMeta>>;

    /// Remove a record and return it. Fails with `ObjectNotFound` when absent.
    async fn delete_meta(&self, bucket_id: BucketId, object_id: ObjectId) -> Result<ObjectMeta>;
}

/// Bucket registry persistence
#[async_trait]
pub trait BucketMetaRepo: Send + Sync {
    /// Register a bucket. Fails with `BucketAlreadyExists` for a known id.
    async fn store_bucket(&self, bucket: &BucketMeta) -> Result<()>;

    /// Load a bucket. Fails with `BucketNotFound` when absent.
    async fn get_bucket(&self, bucket_id: BucketId) -> Result<BucketMeta>;

    /// Buckets owned by `owner`, ordered by id
    async fn list_buckets(&self, owner: OwnerId) -> Result<Vec<BucketMeta>>;

    /// Remove a bucket. Fails with `BucketNotFound` when absent.
    async fn delete_bucket(&self, bucket_id: BucketId) -> Result<()>;
}
