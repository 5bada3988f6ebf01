//! Sled-backed metadata repositories
//!
//! Records are bincode-encoded. Object keys are the big-endian bucket id
//! followed by the big-endian object id, so a bucket's objects form one
//! contiguous, id-ordered prefix range.

use crate::models::{BucketMeta, ObjectMeta, OwnerId};
use crate::repo::{BucketMetaRepo, ObjectMetaRepo};
use async_trait::async_trait;
use peerstore_core::block::{BucketId, ObjectId};
use peerstore_core::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

const OBJECTS_TREE: &str = "objects";
const BUCKETS_TREE: &str = "buckets";

fn object_key(bucket_id: BucketId, object_id: ObjectId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&bucket_id.to_be_bytes());
    key[8..].copy_from_slice(&object_id.to_be_bytes());
    key
}

fn storage_err(e: sled::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn decode<V: DeserializeOwned>(bytes: &[u8]) -> Result<V> {
    Ok(bincode::deserialize(bytes)?)
}

/// Sled-based metadata store
pub struct SledMetaStore {
    db: sled::Db,
    objects: sled::Tree,
    buckets: sled::Tree,
}

impl SledMetaStore {
    /// Open or create a metadata store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!(path = ?path.as_ref(), "Opening Sled metadata store");

        let db = sled::open(path.as_ref())
            .map_err(|e| StoreError::Storage(format!("Failed to open Sled: {}", e)))?;
        Self::from_db(db)
    }

    /// Open an in-memory store (for testing)
    pub fn open_temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| StoreError::Storage(format!("Failed to open Sled: {}", e)))?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let objects = db.open_tree(OBJECTS_TREE).map_err(storage_err)?;
        let buckets = db.open_tree(BUCKETS_TREE).map_err(storage_err)?;
        Ok(Self {
            db,
            objects,
            buckets,
        })
    }

    /// Insert `value` under `key` only if the key is unused.
    /// Returns false when the key already exists.
    async fn insert_new(&self, tree: &sled::Tree, key: &[u8], value: Vec<u8>) -> Result<bool> {
        let swapped = tree
            .compare_and_swap(key, None::<&[u8]>, Some(value))
            .map_err(storage_err)?;
        if swapped.is_err() {
            return Ok(false);
        }
        self.db.flush_async().await.map_err(storage_err)?;
        Ok(true)
    }
}

#[async_trait]
impl ObjectMetaRepo for SledMetaStore {
    async fn store_meta(&self, meta: &ObjectMeta) -> Result<()> {
        meta.validate()?;
        let (bucket_id, object_id) = (meta.bucket_id(), meta.object_id());
        let encoded = bincode::serialize(meta)?;

        if !self
            .insert_new(&self.objects, &object_key(bucket_id, object_id), encoded)
            .await?
        {
            return Err(StoreError::AlreadyExists {
                bucket_id,
                object_id,
            });
        }
        debug!(bucket_id, object_id, "Stored object metadata");
        Ok(())
    }

    async fn get_meta(&self, bucket_id: BucketId, object_id: ObjectId) -> Result<ObjectMeta> {
        match self
            .objects
            .get(object_key(bucket_id, object_id))
            .map_err(storage_err)?
        {
            Some(bytes) => decode(&bytes),
            None => Err(StoreError::ObjectNotFound {
                bucket_id,
                object_id,
            }),
        }
    }

    async fn list_meta(&self, bucket_id: BucketId) -> Result<Vec<ObjectMeta>> {
        let mut metas = Vec::new();
        for item in self.objects.scan_prefix(bucket_id.to_be_bytes()) {
            let (_, value) = item.map_err(storage_err)?;
            metas.push(decode(&value)?);
        }
        Ok(metas)
    }

    async fn delete_meta(&self, bucket_id: BucketId, object_id: ObjectId) -> Result<ObjectMeta> {
        let removed = self
            .objects
            .remove(object_key(bucket_id, object_id))
            .map_err(storage_err)?;
        match removed {
            Some(bytes) => {
                self.db.flush_async().await.map_err(storage_err)?;
                debug!(bucket_id, object_id, "Deleted object metadata");
                decode(&bytes)
            }
            None => Err(StoreError::ObjectNotFound {
                bucket_id,
                object_id,
            }),
        }
    }
}

#[async_trait]
impl BucketMetaRepo for SledMetaStore {
    async fn store_bucket(&self, bucket: &BucketMeta) -> Result<()> {
        let encoded = bincode::serialize(bucket)?;
        if !self
            .insert_new(&self.buckets, &bucket.id.to_be_bytes(), encoded)
            .await?
        {
            return Err(StoreError::BucketAlreadyExists(bucket.id));
        }
        Ok(())
    }

    async fn get_bucket(&self, bucket_id: BucketId) -> Result<BucketMeta> {
        match self
            .buckets
            .get(bucket_id.to_be_bytes())
            .map_err(storage_err)?
        {
            Some(bytes) => decode(&bytes),
            None => Err(StoreError::BucketNotFound(bucket_id)),
        }
    }

    async fn list_buckets(&self, owner: OwnerId) -> Result<Vec<BucketMeta>> {
        let mut buckets = Vec::new();
        for item in self.buckets.iter() {
            let (_, value) = item.map_err(storage_err)?;
            let bucket: BucketMeta = decode(&value)?;
            if bucket.owner == owner {
                buckets.push(bucket);
            }
        }
        Ok(buckets)
    }

    async fn delete_bucket(&self, bucket_id: BucketId) -> Result<()> {
        let removed = self
            .buckets
            .remove(bucket_id.to_be_bytes())
            .map_err(storage_err)?;
        if removed.is_none() {
            return Err(StoreError::BucketNotFound(bucket_id));
        }
        self.db.flush_async().await.map_err(storage_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::object_meta;
    use peerstore_core::erasure::ShardLayout;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_meta_rejects_duplicate() {
        let store = SledMetaStore::open_temporary().unwrap();
        let first = object_meta(1, 2, ShardLayout::new(3, 1));
        store.store_meta(&first).await.unwrap();

        let mut second = first.clone();
        second.object.size = 1;
        assert!(matches!(
            store.store_meta(&second).await,
            Err(StoreError::AlreadyExists { .. })
        ));
        assert_eq!(store.get_meta(1, 2).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_ordered() {
        let store = SledMetaStore::open_temporary().unwrap();
        for (bucket, object) in [(1, 300), (2, 1), (1, 7), (1, 256)] {
            store
                .store_meta(&object_meta(bucket, object, ShardLayout::new(2, 1)))
                .await
                .unwrap();
        }

        let ids: Vec<ObjectId> = store
            .list_meta(1)
            .await
            .unwrap()
            .iter()
            .map(|m| m.object_id())
            .collect();
        assert_eq!(ids, vec![7, 256, 300]);
        assert!(store.list_meta(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_meta() {
        let store = SledMetaStore::open_temporary().unwrap();
        store
            .store_meta(&object_meta(1, 2, ShardLayout::new(1, 0)))
            .await
            .unwrap();

        assert_eq!(store.delete_meta(1, 2).await.unwrap().object_id(), 2);
        assert!(store.get_meta(1, 2).await.unwrap_err().is_not_found());
        assert!(store.delete_meta(1, 2).await.unwrap_err().is_not_found());
        // the id can be reused once the record is gone
        store
            .store_meta(&object_meta(1, 2, ShardLayout::new(1, 0)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_on_disk_store() {
        let dir = TempDir::new().unwrap();
        let meta = object_meta(4, 5, ShardLayout::new(3, 1));
        let store = SledMetaStore::open(dir.path().join("meta")).unwrap();
        store.store_meta(&meta).await.unwrap();
        store
            .store_bucket(&BucketMeta::new(4, "archive", 1))
            .await
            .unwrap();

        assert_eq!(store.get_meta(4, 5).await.unwrap(), meta);
        assert_eq!(store.get_bucket(4).await.unwrap().name, "archive");
        assert!(dir.path().join("meta").exists());
    }

    #[tokio::test]
    async fn test_buckets() {
        let store = SledMetaStore::open_temporary().unwrap();
        store.store_bucket(&BucketMeta::new(1, "a", 10)).await.unwrap();
        store.store_bucket(&BucketMeta::new(2, "b", 11)).await.unwrap();
        assert!(matches!(
            store.store_bucket(&BucketMeta::new(1, "dup", 10)).await,
            Err(StoreError::BucketAlreadyExists(1))
        ));

        let owned = store.list_buckets(10).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name, "a");

        store.delete_bucket(2).await.unwrap();
        assert!(matches!(
            store.get_bucket(2).await,
            Err(StoreError::BucketNotFound(2))
        ));
    }
}
