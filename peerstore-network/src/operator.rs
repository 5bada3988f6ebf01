//! Block access facade
//!
//! A `BlockOperator` is one node's store/fetch/delete capability for single
//! blocks. The orchestrator talks to every owner through this trait and does
//! not care whether the node is this process or a remote peer.

use async_trait::async_trait;
use bytes::Bytes;
use peerstore_core::block::{BlockMeta, Location, NodeId};
use peerstore_core::error::Result;
use peerstore_storage::{BlockKey, BlockStore};
use std::sync::Arc;
use tracing::debug;

/// Per-node block operations
#[async_trait]
pub trait BlockOperator: Send + Sync {
    /// Identifier of the node behind this operator
    fn nid(&self) -> NodeId;

    /// Address of the node behind this operator
    fn addr(&self) -> &str;

    /// Where this node sits, for placement bookkeeping
    fn location(&self) -> Location {
        Location::new(self.nid(), self.addr())
    }

    /// Durably store one block copy
    async fn upload_block(&self, meta: &BlockMeta, data: Bytes) -> Result<()>;

    /// Fetch one block's bytes
    async fn download_block(&self, key: BlockKey) -> Result<Bytes>;

    /// Fetch the metadata stored next to a block
    async fn get_block_meta(&self, key: BlockKey) -> Result<BlockMeta>;

    /// Remove one block copy. Returns false if the node did not hold it.
    async fn delete_block(&self, key: BlockKey) -> Result<bool>;
}

/// Operator backed by a block store in this process
pub struct LocalOperator {
    nid: NodeId,
    addr: String,
    store: Arc<dyn BlockStore>,
}

impl LocalOperator {
    pub fn new(nid: NodeId, addr: impl Into<String>, store: Arc<dyn BlockStore>) -> Self {
        Self {
            nid,
            addr: addr.into(),
            store,
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn BlockStore> {
        &self.store
    }
}

#[async_trait]
impl BlockOperator for LocalOperator {
    fn nid(&self) -> NodeId {
        self.nid
    }

    fn addr(&self) -> &str {
        &self.addr
    }

    async fn upload_block(&self, meta: &BlockMeta, data: Bytes) -> Result<()> {
        self.store.store_block(meta.clone(), data).await?;
        debug!(nid = self.nid, block = %BlockKey::of(meta), "Block stored locally");
        Ok(())
    }

    async fn download_block(&self, key: BlockKey) -> Result<Bytes> {
        self.store.get_block(key).await
    }

    async fn get_block_meta(&self, key: BlockKey) -> Result<BlockMeta> {
        self.store.get_block_meta(key).await
    }

    async fn delete_block(&self, key: BlockKey) -> Result<bool> {
        self.store.delete_block(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peerstore_storage::{AsyncWrapper, MemoryBlockStore};

    fn local(nid: NodeId) -> LocalOperator {
        LocalOperator::new(
            nid,
            format!("127.0.0.1:{}", 7000 + nid),
            Arc::new(AsyncWrapper(MemoryBlockStore::new())),
        )
    }

    #[tokio::test]
    async fn test_local_operator_round_trip() {
        let op = local(3);
        assert_eq!(op.location(), Location::new(3, "127.0.0.1:7003"));

        let meta = BlockMeta::new(11, 1, 2, b"shard");
        let key = BlockKey::of(&meta);
        op.upload_block(&meta, Bytes::from_static(b"shard"))
            .await
            .unwrap();

        assert_eq!(op.download_block(key).await.unwrap(), &b"shard"[..]);
        assert_eq!(op.get_block_meta(key).await.unwrap().checksum, meta.checksum);
        assert!(op.delete_block(key).await.unwrap());
        assert!(op.download_block(key).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_local_operator_rejects_wrong_size() {
        let op = local(1);
        let meta = BlockMeta::new(1, 1, 1, b"four");
        assert!(op
            .upload_block(&meta, Bytes::from_static(b"three"))
            .await
            .is_err());
    }
}
