//! In-memory block store
//!
//! Used for testing and development. Not persistent.

use crate::backend::{check_size, BlockKey, BlockStoreSync, StoreStats};
use bytes::Bytes;
use peerstore_core::block::BlockMeta;
use peerstore_core::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory block store
pub struct MemoryBlockStore {
    /// Block storage
    blocks: RwLock<HashMap<BlockKey, (BlockMeta, Bytes)>>,

    /// Current bytes used
    bytes_used: AtomicU64,

    /// Operation counters
    reads: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
}

impl MemoryBlockStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            bytes_used: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
        }
    }

    /// Clear all stored blocks
    pub fn clear(&self) {
        let mut blocks = self.blocks.write();
        blocks.clear();
        self.bytes_used.store(0, Ordering::SeqCst);
    }

    /// Overwrite a stored block's bytes without touching its metadata
    pub fn corrupt(&self, key: BlockKey, data: Bytes) -> bool {
        match self.blocks.write().get_mut(&key) {
            Some((_, stored)) => {
                *stored = data;
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStoreSync for MemoryBlockStore {
    fn store_block(&self, meta: BlockMeta, data: Bytes) -> Result<()> {
        check_size(&meta, &data)?;
        let data_len = data.len() as u64;
        let key = BlockKey::of(&meta);

        let mut blocks = self.blocks.write();

        // If replacing, subtract old size
        if let Some((_, old)) = blocks.get(&key) {
            self.bytes_used.fetch_sub(old.len() as u64, Ordering::SeqCst);
        }

        blocks.insert(key, (meta, data));
        self.bytes_used.fetch_add(data_len, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    fn get_block(&self, key: BlockKey) -> Result<Bytes> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let blocks = self.blocks.read();
        blocks
            .get(&key)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| key.not_found())
    }

    fn get_block_meta(&self, key: BlockKey) -> Result<BlockMeta> {
        let blocks = self.blocks.read();
        blocks
            .get(&key)
            .map(|(meta, _)| meta.clone())
            .ok_or_else(|| key.not_found())
    }

    fn delete_block(&self, key: BlockKey) -> Result<bool> {
        let mut blocks = self.blocks.write();

        if let Some((_, old)) = blocks.remove(&key) {
            self.bytes_used.fetch_sub(old.len() as u64, Ordering::SeqCst);
            self.deletes.fetch_add(1, Ordering::Relaxed);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn stats(&self) -> Result<StoreStats> {
        let blocks = self.blocks.read();
        Ok(StoreStats {
            block_count: blocks.len() as u64,
            bytes_used: self.bytes_used.load(Ordering::SeqCst),
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        })
    }
}
