//! On-disk block store
//!
//! Plain files, one directory per block:
//!
//! ```text
//! <base>/<bucket>/<object>/<block>/data
//! <base>/<bucket>/<object>/<block>/meta.json
//! ```
//!
//! Both files are written to a `.tmp` sibling, synced and renamed into place,
//! data first. A block without `meta.json` is treated as not stored.

use crate::backend::{check_size, BlockKey, BlockStoreSync, StoreStats};
use bytes::Bytes;
use peerstore_core::block::BlockMeta;
use peerstore_core::error::Result;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

const DATA_FILE: &str = "data";
const META_FILE: &str = "meta.json";

/// File-per-block store rooted at a base directory
pub struct DiskBlockStore {
    base: PathBuf,

    /// Operation counters
    reads: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
}

impl DiskBlockStore {
    /// Open or create a block store under `base`
    pub fn open<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        info!(path = ?base, "Opening disk block store");
        fs::create_dir_all(&base)?;

        Ok(Self {
            base,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
        })
    }

    /// Root directory of the store
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory holding one block
    pub fn block_dir(&self, key: BlockKey) -> PathBuf {
        self.base
            .join(key.bucket_id.to_string())
            .join(key.object_id.to_string())
            .join(key.block_id.to_string())
    }

    /// Path of a block's data file
    pub fn data_path(&self, key: BlockKey) -> PathBuf {
        self.block_dir(key).join(DATA_FILE)
    }

    fn meta_path(&self, key: BlockKey) -> PathBuf {
        self.block_dir(key).join(META_FILE)
    }

    fn read_file(&self, key: BlockKey, path: &Path) -> Result<Vec<u8>> {
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(key.not_found()),
            Err(e) => Err(e.into()),
        }
    }
}

impl BlockStoreSync for DiskBlockStore {
    fn store_block(&self, meta: BlockMeta, data: Bytes) -> Result<()> {
        check_size(&meta, &data)?;
        let key = BlockKey::of(&meta);
        let dir = self.block_dir(key);
        fs::create_dir_all(&dir)?;

        write_synced(&dir, DATA_FILE, &data)?;
        write_synced(&dir, META_FILE, &serde_json::to_vec_pretty(&meta)?)?;

        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!(block = %key, size = meta.size, "Stored block on disk");
        Ok(())
    }

    fn get_block(&self, key: BlockKey) -> Result<Bytes> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if !self.meta_path(key).exists() {
            return Err(key.not_found());
        }
        let data = self.read_file(key, &self.data_path(key))?;
        Ok(Bytes::from(data))
    }

    fn get_block_meta(&self, key: BlockKey) -> Result<BlockMeta> {
        let raw = self.read_file(key, &self.meta_path(key))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    fn delete_block(&self, key: BlockKey) -> Result<bool> {
        match fs::remove_dir_all(self.block_dir(key)) {
            Ok(()) => {
                self.deletes.fetch_add(1, Ordering::Relaxed);
                debug!(block = %key, "Deleted block from disk");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn stats(&self) -> Result<StoreStats> {
        let mut block_count = 0;
        let mut bytes_used = 0;
        // base/bucket/object/block
        for bucket in subdirs(&self.base)? {
            for object in subdirs(&bucket)? {
                for block in subdirs(&object)? {
                    if block.join(META_FILE).exists() {
                        block_count += 1;
                        bytes_used += fs::metadata(block.join(DATA_FILE))
                            .map(|m| m.len())
                            .unwrap_or(0);
                    }
                }
            }
        }

        Ok(StoreStats {
            block_count,
            bytes_used,
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        })
    }
}

/// Replace `dir/name` so readers see either the old file or the whole new one
fn write_synced(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<()> {
    let tmp = dir.join(format!("{}.tmp", name));
    let mut file = fs::File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&tmp, dir.join(name))
}

fn subdirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}
