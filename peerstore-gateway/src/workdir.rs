//! Per-object working areas
//!
//! Shards are staged as plain files under `<root>/<bucket>/<object>/<purpose>`
//! while an upload or download runs. The area belongs to exactly one
//! workflow and is removed when it is dropped, early error returns included.
//! The object and bucket directories above it go too once they are empty.

use peerstore_core::block::{BucketId, ObjectId};
use peerstore_core::erasure::ShardRole;
use peerstore_core::error::Result;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scratch directory holding one object's shard files
#[derive(Debug)]
pub struct WorkArea {
    dir: PathBuf,
}

impl WorkArea {
    /// Create a fresh area, clearing anything a crashed run left behind
    pub fn create(
        root: &Path,
        bucket_id: BucketId,
        object_id: ObjectId,
        purpose: &str,
    ) -> Result<Self> {
        let dir = root
            .join(bucket_id.to_string())
            .join(object_id.to_string())
            .join(purpose);

        if dir.exists() {
            debug!(dir = ?dir, "Removing stale work area");
            std::fs::remove_dir_all(&dir)?;
        }
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing shard `index` of `role`
    pub fn shard_path(&self, role: ShardRole, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", index, role))
    }

    /// Create (or truncate) a shard file open for reading and writing
    pub fn create_shard(&self, role: ShardRole, index: usize) -> Result<File> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.shard_path(role, index))?;
        Ok(file)
    }

    /// Create every shard file of one role
    pub fn create_shards(&self, role: ShardRole, count: usize) -> Result<Vec<File>> {
        (0..count).map(|i| self.create_shard(role, i)).collect()
    }

}

impl Drop for WorkArea {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(dir = ?self.dir, "Work area removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(dir = ?self.dir, error = %e, "Failed to remove work area");
                return;
            }
        }

        // <object>, then <bucket>; another workflow may still be using either
        for parent in self.dir.ancestors().skip(1).take(2) {
            match std::fs::remove_dir(parent) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom, Write};
    use tempfile::TempDir;

    #[test]
    fn test_layout_and_cleanup() {
        let root = TempDir::new().unwrap();
        let dir;
        {
            let area = WorkArea::create(root.path(), 3, 42, "upload").unwrap();
            dir = area.dir().to_path_buf();
            assert_eq!(dir, root.path().join("3").join("42").join("upload"));
            assert_eq!(area.shard_path(ShardRole::Parity, 1), dir.join("1.parity"));

            let mut shard = area.create_shard(ShardRole::Data, 0).unwrap();
            shard.write_all(b"bytes").unwrap();
            assert!(dir.join("0.data").exists());
        }
        assert!(!dir.exists());
        assert!(!root.path().join("3").exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_create_clears_stale_files() {
        let root = TempDir::new().unwrap();
        let stale = root.path().join("1").join("2").join("upload");
        std::fs::create_dir_all(&stale).unwrap();
        std::fs::write(stale.join("0.data"), b"left over").unwrap();

        let area = WorkArea::create(root.path(), 1, 2, "upload").unwrap();
        assert!(!area.shard_path(ShardRole::Data, 0).exists());
    }

    #[test]
    fn test_shard_files_are_read_write() {
        let root = TempDir::new().unwrap();
        let area = WorkArea::create(root.path(), 1, 1, "download-0").unwrap();

        let mut shards = area.create_shards(ShardRole::Data, 3).unwrap();
        assert_eq!(shards.len(), 3);

        let shard = &mut shards[2];
        shard.write_all(b"abc").unwrap();
        shard.seek(SeekFrom::Start(0)).unwrap();
        let mut back = String::new();
        shard.read_to_string(&mut back).unwrap();
        assert_eq!(back, "abc");
    }

    #[test]
    fn test_areas_with_different_purposes_coexist() {
        let root = TempDir::new().unwrap();
        let first = WorkArea::create(root.path(), 1, 1, "download-0").unwrap();
        let second = WorkArea::create(root.path(), 1, 1, "download-1").unwrap();
        let neighbour = WorkArea::create(root.path(), 1, 2, "upload").unwrap();

        drop(first);
        assert!(second.dir().exists());
        assert!(neighbour.dir().exists());

        drop(second);
        assert!(!root.path().join("1").join("1").exists());
        assert!(root.path().join("1").exists());

        drop(neighbour);
        assert!(!root.path().join("1").exists());
    }
}
