//! Storage orchestrator
//!
//! Ties the erasure coder, the placement ring and the per-node block
//! operators together:
//!
//! - upload: encode into a work area, pick owners per shard, push every copy,
//!   then commit the object metadata exactly once
//! - download: fetch every shard slot concurrently with owner fallback,
//!   verify, reconstruct what is missing and return the data shards in order
//!
//! An upload that fails before the commit leaves no metadata behind, so
//! readers never see a partial object.

use crate::config::GatewayConfig;
use crate::workdir::WorkArea;
use bytes::Bytes;
use futures::future::join_all;
use peerstore_core::block::{BlockMeta, BucketId, ObjectId};
use peerstore_core::erasure::{ErasureCoder, ShardLayout, ShardRole};
use peerstore_core::error::{Result, StoreError};
use peerstore_core::events::{Event, EventBus, EventKind};
use peerstore_core::id::IdGenerator;
use peerstore_metadata::{
    BucketMeta, BucketMetaRepo, Object, ObjectMeta, ObjectMetaRepo, OwnerId,
};
use peerstore_network::{BlockOperator, PeerRegistry};
use peerstore_storage::BlockKey;
use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Copies written for every shard
    pub replicas: usize,

    /// Root of the per-object work areas
    pub work_dir: PathBuf,
}

impl ControllerSettings {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            replicas: config.placement.replicas,
            work_dir: config.storage.tmp_dir.clone(),
        }
    }
}

/// Object and bucket workflows over a cluster of block operators
pub struct Controller {
    settings: ControllerSettings,
    coder: ErasureCoder,
    ids: Arc<dyn IdGenerator>,
    objects: Arc<dyn ObjectMetaRepo>,
    buckets: Arc<dyn BucketMetaRepo>,
    peers: Arc<PeerRegistry>,
    events: Arc<EventBus>,
    download_seq: AtomicU64,
}

impl Controller {
    pub fn new(
        settings: ControllerSettings,
        coder: ErasureCoder,
        ids: Arc<dyn IdGenerator>,
        objects: Arc<dyn ObjectMetaRepo>,
        buckets: Arc<dyn BucketMetaRepo>,
        peers: Arc<PeerRegistry>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            settings,
            coder,
            ids,
            objects,
            buckets,
            peers,
            events,
            download_seq: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn peers(&self) -> &Arc<PeerRegistry> {
        &self.peers
    }

    /// The bus lifecycle events are published on
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    // ===== Buckets =====

    /// Register a new bucket under a fresh id
    #[instrument(skip(self))]
    pub async fn create_bucket(&self, name: &str, owner: OwnerId) -> Result<BucketMeta> {
        let bucket = BucketMeta::new(self.ids.generate_id(), name, owner);
        self.buckets.store_bucket(&bucket).await?;
        info!(bucket_id = bucket.id, "Bucket created");

        self.events
            .publish(Event::bucket(EventKind::BucketCreated, bucket.id))
            .await;
        Ok(bucket)
    }

    pub async fn get_bucket(&self, bucket_id: BucketId) -> Result<BucketMeta> {
        let bucket = self.buckets.get_bucket(bucket_id).await?;
        self.events
            .publish(Event::bucket(EventKind::BucketAccessed, bucket_id))
            .await;
        Ok(bucket)
    }

    pub async fn list_buckets(&self, owner: OwnerId) -> Result<Vec<BucketMeta>> {
        self.buckets.list_buckets(owner).await
    }

    /// Remove an empty bucket
    #[instrument(skip(self))]
    pub async fn delete_bucket(&self, bucket_id: BucketId) -> Result<()> {
        self.buckets.get_bucket(bucket_id).await?;
        if !self.objects.list_meta(bucket_id).await?.is_empty() {
            return Err(StoreError::BucketNotEmpty(bucket_id));
        }
        self.buckets.delete_bucket(bucket_id).await?;
        info!("Bucket deleted");

        self.events
            .publish(Event::bucket(EventKind::BucketRemoved, bucket_id))
            .await;
        Ok(())
    }

    // ===== Objects =====

    /// Upload an in-memory payload
    pub async fn upload_bytes(
        &self,
        bucket_id: BucketId,
        name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<ObjectMeta> {
        let size = data.len() as u64;
        self.upload_object(bucket_id, name, content_type, size, vec![Cursor::new(data)])
            .await
    }

    /// Store `size` bytes read from `sources`, back to back, as a new object.
    ///
    /// Every copy of every shard must be acknowledged before the metadata
    /// record is written; any failure before that aborts the upload.
    #[instrument(skip(self, sources), fields(object_id))]
    pub async fn upload_object<R>(
        &self,
        bucket_id: BucketId,
        name: &str,
        content_type: &str,
        size: u64,
        sources: Vec<R>,
    ) -> Result<ObjectMeta>
    where
        R: Read + Send + 'static,
    {
        self.buckets.get_bucket(bucket_id).await?;

        let object_id = self.ids.generate_id();
        tracing::Span::current().record("object_id", object_id);
        let layout = self.coder.calc_shards_num(size);
        let object = Object::new(
            object_id,
            bucket_id,
            name,
            size,
            content_type,
            layout,
            self.settings.replicas,
        );

        let work = WorkArea::create(&self.settings.work_dir, bucket_id, object_id, "upload")?;
        self.encode_into(&work, layout, size, sources).await?;
        debug!(layout = %layout, "Object sharded");

        let data_blocks = self
            .place_shards(&work, bucket_id, object_id, ShardRole::Data, layout.data_shards)
            .await?;
        let parity_blocks = self
            .place_shards(
                &work,
                bucket_id,
                object_id,
                ShardRole::Parity,
                layout.parity_shards,
            )
            .await?;

        let meta = ObjectMeta {
            object,
            root: self.peers.self_location().clone(),
            data_blocks,
            parity_blocks,
        };
        self.objects.store_meta(&meta).await?;
        info!(size, layout = %layout, "Object committed");

        self.events
            .publish(Event::object(
                EventKind::ObjectCreated,
                bucket_id,
                object_id,
                size,
            ))
            .await;
        Ok(meta)
    }

    /// Run the coder over fresh shard files in `work`
    async fn encode_into<R>(
        &self,
        work: &WorkArea,
        layout: ShardLayout,
        size: u64,
        mut sources: Vec<R>,
    ) -> Result<()>
    where
        R: Read + Send + 'static,
    {
        let mut data = work.create_shards(ShardRole::Data, layout.data_shards)?;
        let mut parity = work.create_shards(ShardRole::Parity, layout.parity_shards)?;
        let coder = self.coder.clone();

        tokio::task::spawn_blocking(move || {
            coder.encode(&mut sources, size, &mut data, &mut parity)
        })
        .await
        .map_err(join_error)?
    }

    /// Checksum, place and push every shard of one role
    async fn place_shards(
        &self,
        work: &WorkArea,
        bucket_id: BucketId,
        object_id: ObjectId,
        role: ShardRole,
        count: usize,
    ) -> Result<Vec<BlockMeta>> {
        let mut blocks = Vec::with_capacity(count);

        for index in 0..count {
            let owners =
                self.peers
                    .pick_by_block(bucket_id, object_id, role, index, self.settings.replicas)?;
            let data = Bytes::from(tokio::fs::read(work.shard_path(role, index)).await?);
            let meta = BlockMeta::new(self.ids.generate_id(), bucket_id, object_id, &data)
                .with_locations(owners.iter().map(|op| op.location()).collect());

            for owner in &owners {
                owner
                    .upload_block(&meta, data.clone())
                    .await
                    .map_err(|e| {
                        warn!(
                            shard = %role,
                            index,
                            nid = owner.nid(),
                            error = %e,
                            "Shard push failed, aborting upload"
                        );
                        match e {
                            StoreError::Peer { .. } => e,
                            other => StoreError::Peer {
                                nid: owner.nid(),
                                reason: other.to_string(),
                            },
                        }
                    })?;
                debug!(shard = %role, index, nid = owner.nid(), "Shard pushed");
            }
            blocks.push(meta);
        }
        Ok(blocks)
    }

    /// Fetch, verify and (if needed) reconstruct an object's bytes
    #[instrument(skip(self))]
    pub async fn download_object(&self, bucket_id: BucketId, object_id: ObjectId) -> Result<Bytes> {
        let meta = self.objects.get_meta(bucket_id, object_id).await?;
        let layout = meta.object.layout();
        let size = meta.object.size;

        let body = if layout.data_shards == 0 {
            Bytes::new()
        } else {
            let seq = self.download_seq.fetch_add(1, Ordering::Relaxed);
            let work = WorkArea::create(
                &self.settings.work_dir,
                bucket_id,
                object_id,
                &format!("download-{}", seq),
            )?;

            let fetched = self.fetch_shards(&meta).await;
            let absent = fetched.iter().filter(|s| s.is_none()).count();
            if absent > 0 {
                warn!(
                    absent,
                    parity = layout.parity_shards,
                    "Shards unavailable, reconstructing"
                );
            }

            let mut data_slots = fetched;
            let parity_slots = data_slots.split_off(layout.data_shards);
            let work_dir = work.dir().to_path_buf();
            let coder = self.coder.clone();
            let body = tokio::task::spawn_blocking(move || {
                assemble(&coder, &work_dir, size, data_slots, parity_slots)
            })
            .await
            .map_err(join_error)??;
            drop(work);
            body
        };

        info!(size, "Object downloaded");
        self.events
            .publish(Event::object(
                EventKind::ObjectDownload,
                bucket_id,
                object_id,
                size,
            ))
            .await;
        Ok(body)
    }

    /// One task per shard slot, data slots first. Every task is joined.
    async fn fetch_shards(&self, meta: &ObjectMeta) -> Vec<Option<Bytes>> {
        let tasks: Vec<_> = meta
            .all_blocks()
            .map(|block| {
                let candidates = self.peers.pick_by_meta(block);
                tokio::spawn(fetch_block(candidates, block.clone()))
            })
            .collect();

        join_all(tasks)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(shard) => shard,
                Err(e) => {
                    warn!(error = %e, "Shard fetch task failed");
                    None
                }
            })
            .collect()
    }

    /// Object metadata, without fetching any shard
    pub async fn get_object_meta(
        &self,
        bucket_id: BucketId,
        object_id: ObjectId,
    ) -> Result<ObjectMeta> {
        let meta = self.objects.get_meta(bucket_id, object_id).await?;
        self.events
            .publish(Event::object(
                EventKind::ObjectAccessed,
                bucket_id,
                object_id,
                meta.object.size,
            ))
            .await;
        Ok(meta)
    }

    /// Objects of a bucket, ordered by id
    pub async fn list_objects(&self, bucket_id: BucketId) -> Result<Vec<ObjectMeta>> {
        self.buckets.get_bucket(bucket_id).await?;
        self.objects.list_meta(bucket_id).await
    }

    /// Drop the metadata record, then every shard copy it points at.
    ///
    /// The object is gone once the record is removed; copies that can't be
    /// deleted are only logged.
    #[instrument(skip(self))]
    pub async fn delete_object(
        &self,
        bucket_id: BucketId,
        object_id: ObjectId,
    ) -> Result<ObjectMeta> {
        let meta = self.objects.delete_meta(bucket_id, object_id).await?;

        let mut removed = 0usize;
        let mut leftover = 0usize;
        for block in meta.all_blocks() {
            let key = BlockKey::of(block);
            for owner in self.peers.pick_by_meta(block) {
                match owner.delete_block(key).await {
                    Ok(true) => removed += 1,
                    Ok(false) => {}
                    Err(e) => {
                        leftover += 1;
                        warn!(
                            block = %key,
                            nid = owner.nid(),
                            error = %e,
                            "Failed to delete shard copy"
                        );
                    }
                }
            }
        }
        info!(removed, leftover, "Object deleted");

        self.events
            .publish(Event::object(
                EventKind::ObjectRemoved,
                bucket_id,
                object_id,
                meta.object.size,
            ))
            .await;
        Ok(meta)
    }
}

fn join_error(e: tokio::task::JoinError) -> StoreError {
    StoreError::Internal(format!("worker task failed: {}", e))
}

/// Try each candidate owner in order; the first copy matching its
/// recorded checksum wins.
async fn fetch_block(candidates: Vec<Arc<dyn BlockOperator>>, meta: BlockMeta) -> Option<Bytes> {
    let key = BlockKey::of(&meta);

    for owner in candidates {
        match owner.download_block(key).await {
            Ok(data) => match meta.verify(&data) {
                Ok(()) => {
                    debug!(block = %key, nid = owner.nid(), "Shard fetched");
                    return Some(data);
                }
                Err(e) => {
                    warn!(
                        block = %key,
                        nid = owner.nid(),
                        error = %e,
                        "Corrupt shard copy, trying next owner"
                    );
                }
            },
            Err(e) => {
                warn!(
                    block = %key,
                    nid = owner.nid(),
                    error = %e,
                    "Shard fetch failed, trying next owner"
                );
            }
        }
    }

    warn!(block = %key, "No owner could serve shard");
    None
}

/// Stage fetched shards as files, repair absent ones and concatenate the
/// data shards, cut to the object size.
///
/// A set that still fails verification after repair is an error, never a body.
fn assemble(
    coder: &ErasureCoder,
    dir: &Path,
    size: u64,
    data: Vec<Option<Bytes>>,
    parity: Vec<Option<Bytes>>,
) -> Result<Bytes> {
    let open = |name: String| -> Result<File> {
        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(dir.join(name))?)
    };
    let stage = |role: ShardRole, slots: Vec<Option<Bytes>>| -> Result<Vec<Option<File>>> {
        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(bytes) => {
                    let mut file = open(format!("{}.{}", i, role))?;
                    file.write_all(&bytes)?;
                    file.seek(SeekFrom::Start(0))?;
                    Ok(Some(file))
                }
                None => Ok(None),
            })
            .collect()
    };

    let mut data_files = stage(ShardRole::Data, data)?;
    let mut parity_files = stage(ShardRole::Parity, parity)?;

    if !coder.verify(&mut data_files, &mut parity_files)? {
        let (data_count, parity_count) = (data_files.len(), parity_files.len());
        let inconsistent = || StoreError::Inconsistent {
            data: data_count,
            parity: parity_count,
        };
        if data_files.iter().chain(parity_files.iter()).all(Option::is_some) {
            // nothing to rebuild, yet the set doesn't check out
            return Err(inconsistent());
        }

        // indexed data first, then parity
        let mut targets: Vec<Option<File>> = Vec::new();
        for (i, slot) in data_files.iter().chain(parity_files.iter()).enumerate() {
            targets.push(match slot {
                Some(_) => None,
                None => Some(open(format!("{}.rebuilt", i))?),
            });
        }
        coder.reconstruct(&mut data_files, &mut parity_files, &mut targets)?;

        for (slot, rebuilt) in data_files
            .iter_mut()
            .chain(parity_files.iter_mut())
            .zip(targets)
        {
            if slot.is_none() {
                *slot = rebuilt;
            }
        }
        if !coder.verify(&mut data_files, &mut parity_files)? {
            return Err(inconsistent());
        }
    }

    let mut body = Vec::with_capacity(size as usize);
    for (i, slot) in data_files.iter_mut().enumerate() {
        let shard = slot
            .as_mut()
            .ok_or_else(|| StoreError::Internal(format!("data shard {} missing", i)))?;
        shard.seek(SeekFrom::Start(0))?;
        shard.read_to_end(&mut body)?;
    }
    body.truncate(size as usize);
    Ok(Bytes::from(body))
}
