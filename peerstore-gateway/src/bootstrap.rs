//! Process wiring
//!
//! Builds a [`Controller`] from a validated [`GatewayConfig`]: one on-disk
//! block store per cluster node, a sled metadata database, the placement
//! ring and the notification bus.

use crate::config::GatewayConfig;
use crate::controller::{Controller, ControllerSettings};
use peerstore_core::block::Location;
use peerstore_core::erasure::ErasureCoder;
use peerstore_core::error::{Result, StoreError};
use peerstore_core::events::EventBus;
use peerstore_core::id::Snowflake;
use peerstore_metadata::{HashRing, SledMetaStore};
use peerstore_network::{BlockOperator, LocalOperator, PeerRegistry};
use peerstore_storage::{AsyncWrapper, DiskBlockStore};
use std::sync::Arc;
use tracing::info;

/// Open every store named by `config` and assemble the orchestrator
pub fn build_controller(config: &GatewayConfig) -> Result<Controller> {
    config
        .validate()
        .map_err(|e| StoreError::Configuration(e.to_string()))?;

    let meta = Arc::new(SledMetaStore::open(&config.storage.meta_dir)?);
    std::fs::create_dir_all(&config.storage.tmp_dir)?;

    let peers = Arc::new(PeerRegistry::new(
        Location::new(config.node.id, config.node.address.clone()),
        HashRing::new(config.placement.ring_replicas),
    ));
    let mut operators: Vec<Arc<dyn BlockOperator>> = Vec::with_capacity(config.cluster.len());
    for node in &config.cluster {
        let store = DiskBlockStore::open(&node.data_dir)?;
        operators.push(Arc::new(LocalOperator::new(
            node.id,
            node.address.clone(),
            Arc::new(AsyncWrapper(store)),
        )));
    }
    peers.discover(operators);

    let controller = Controller::new(
        ControllerSettings::from_config(config),
        ErasureCoder::with_max_shard_size(config.erasure.max_shard_size)?,
        Arc::new(Snowflake::new(config.node.worker_id)?),
        meta.clone(),
        meta,
        peers,
        Arc::new(EventBus::new(config.events.channel_size)),
    );

    info!(
        nid = config.node.id,
        nodes = config.cluster.len(),
        replicas = config.placement.replicas,
        "Controller ready"
    );
    Ok(controller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusterNode;
    use tempfile::TempDir;

    fn config(dir: &TempDir, nodes: u64) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.storage.meta_dir = dir.path().join("meta");
        config.storage.tmp_dir = dir.path().join("tmp");
        config.cluster = (1..=nodes)
            .map(|id| ClusterNode {
                id,
                address: format!("127.0.0.1:{}", 7000 + id),
                data_dir: dir.path().join(format!("node-{}", id)),
            })
            .collect();
        config
    }

    #[tokio::test]
    async fn test_build_controller() {
        let dir = TempDir::new().unwrap();
        let controller = build_controller(&config(&dir, 3)).unwrap();

        assert_eq!(controller.peers().ring().keys(), vec![1, 2, 3]);
        assert_eq!(controller.settings().replicas, 2);
        assert!(dir.path().join("tmp").exists());
        assert!(dir.path().join("node-2").exists());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, 1);
        config.placement.replicas = 0;
        assert!(matches!(
            build_controller(&config),
            Err(StoreError::Configuration(_))
        ));
    }
}
