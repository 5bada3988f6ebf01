//! In-memory metadata repositories
//!
//! Used for testing and development. Not persistent.

use crate::models::{BucketMeta, ObjectMeta, OwnerId};
use crate::repo::{BucketMetaRepo, ObjectMetaRepo};
use async_trait::async_trait;
use parking_lot::RwLock;
use peerstore_core::block::{BucketId, ObjectId};
use peerstore_core::error::{Result, StoreError};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Object and bucket metadata held in ordered maps
#[derive(Default)]
pub struct MemoryMetaStore {
    objects: RwLock<BTreeMap<(BucketId, ObjectId), ObjectMeta>>,
    buckets: RwLock<BTreeMap<BucketId, BucketMeta>>,
}

impl MemoryMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of object records
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }
}

#[async_trait]
impl ObjectMetaRepo for MemoryMetaStore {
    async fn store_meta(&self, meta: &ObjectMeta) -> Result<()> {
        meta.validate()?;
        let key = (meta.bucket_id(), meta.object_id());
        match self.objects.write().entry(key) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists {
                bucket_id: key.0,
                object_id: key.1,
            }),
            Entry::Vacant(slot) => {
                slot.insert(meta.clone());
                Ok(())
            }
        }
    }

    async fn get_meta(&self, bucket_id: BucketId, object_id: ObjectId) -> Result<ObjectMeta> {
        self.objects
            .read()
            .get(&(bucket_id, object_id))
            .cloned()
            .ok_or(StoreError::ObjectNotFound {
                bucket_id,
                object_id,
            })
    }

    async fn list_meta(&self, bucket_id: BucketId) -> Result<Vec<ObjectMeta>> {
        Ok(self
            .objects
            .read()
            .range((bucket_id, ObjectId::MIN)..=(bucket_id, ObjectId::MAX))
            .map(|(_, meta)| meta.clone())
            .collect())
    }

    async fn delete_meta(&self, bucket_id: BucketId, object_id: ObjectId) -> Result<ObjectMeta> {
        self.objects
            .write()
            .remove(&(bucket_id, object_id))
            .ok_or(StoreError::ObjectNotFound {
                bucket_id,
                object_id,
            })
    }
}

#[async_trait]
impl BucketMetaRepo for MemoryMetaStore {
    async fn store_bucket(&self, bucket: &BucketMeta) -> Result<()> {
        match self.buckets.write().entry(bucket.id) {
            Entry::Occupied(_) => Err(StoreError::BucketAlreadyExists(bucket.id)),
            Entry::Vacant(slot) => {
                slot.insert(bucket.clone());
                Ok(())
            }
        }
    }

    async fn get_bucket(&self, bucket_id: BucketId) -> Result<BucketMeta> {
        self.buckets
            .read()
            .get(&bucket_id)
            .cloned()
            .ok_or(StoreError::BucketNotFound(bucket_id))
    }

    async fn list_buckets(&self, owner: OwnerId) -> Result<Vec<BucketMeta>> {
        Ok(self
            .buckets
            .read()
            .values()
            .filter(|b| b.owner == owner)
            .cloned()
            .collect())
    }

    async fn delete_bucket(&self, bucket_id: BucketId) -> Result<()> {
        self.buckets
            .write()
            .remove(&bucket_id)
            .map(|_| ())
            .ok_or(StoreError::BucketNotFound(bucket_id))
    }
}
