//! Peer registry
//!
//! Tracks cluster membership (node id -> operator), keeps the placement ring
//! in sync with it and picks the owners of every shard.

use crate::operator::BlockOperator;
use parking_lot::RwLock;
use peerstore_core::block::{BlockMeta, BucketId, Location, NodeId, ObjectId};
use peerstore_core::erasure::ShardRole;
use peerstore_core::error::{Result, StoreError};
use peerstore_metadata::HashRing;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Membership and shard owner selection
pub struct PeerRegistry {
    local: Location,
    ring: HashRing,
    operators: RwLock<HashMap<NodeId, Arc<dyn BlockOperator>>>,
}

impl PeerRegistry {
    /// Empty registry for the node at `local`
    pub fn new(local: Location, ring: HashRing) -> Self {
        Self {
            local,
            ring,
            operators: RwLock::new(HashMap::new()),
        }
    }

    pub fn self_nid(&self) -> NodeId {
        self.local.nid
    }

    pub fn self_addr(&self) -> &str {
        &self.local.addr
    }

    pub fn self_location(&self) -> &Location {
        &self.local
    }

    /// Register a node, replacing any operator already known for its id
    pub fn add_peer(&self, operator: Arc<dyn BlockOperator>) {
        let nid = operator.nid();
        self.operators.write().insert(nid, operator);
        self.ring.add(&[nid]);
        debug!(nid, "Peer added");
    }

    /// Forget a node. Its shards stay where they are.
    pub fn remove_peer(&self, nid: NodeId) -> Option<Arc<dyn BlockOperator>> {
        self.ring.remove(&[nid]);
        let removed = self.operators.write().remove(&nid);
        if removed.is_some() {
            debug!(nid, "Peer removed");
        }
        removed
    }

    /// Replace the whole membership with `operators`
    pub fn discover(&self, operators: Vec<Arc<dyn BlockOperator>>) {
        let incoming: HashMap<NodeId, Arc<dyn BlockOperator>> =
            operators.into_iter().map(|op| (op.nid(), op)).collect();

        let stale: Vec<NodeId> = self
            .operators
            .read()
            .keys()
            .filter(|nid| !incoming.contains_key(*nid))
            .copied()
            .collect();
        for nid in stale {
            self.remove_peer(nid);
        }

        let count = incoming.len();
        for op in incoming.into_values() {
            self.add_peer(op);
        }
        info!(peers = count, "Peer membership refreshed");
    }

    /// Operator for a known node
    pub fn operator(&self, nid: NodeId) -> Option<Arc<dyn BlockOperator>> {
        self.operators.read().get(&nid).cloned()
    }

    /// Known peers, ascending by id
    pub fn peers(&self) -> Vec<Location> {
        let operators = self.operators.read();
        self.ring
            .keys()
            .into_iter()
            .filter_map(|nid| operators.get(&nid).map(|op| op.location()))
            .collect()
    }

    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    /// Ring key of one shard
    pub fn placement_key(
        bucket_id: BucketId,
        object_id: ObjectId,
        role: ShardRole,
        index: usize,
    ) -> String {
        format!("{}/{}/{}/{}", bucket_id, object_id, role, index)
    }

    /// Owners for a new shard: up to `replicas` distinct nodes.
    ///
    /// Fails with `NoPlacement` when no node is available.
    pub fn pick_by_block(
        &self,
        bucket_id: BucketId,
        object_id: ObjectId,
        role: ShardRole,
        index: usize,
        replicas: usize,
    ) -> Result<Vec<Arc<dyn BlockOperator>>> {
        let key = Self::placement_key(bucket_id, object_id, role, index);
        let nids = self.ring.get_n(&key, replicas.max(1));

        let operators = self.operators.read();
        let picked: Vec<_> = nids
            .iter()
            .filter_map(|nid| operators.get(nid).cloned())
            .collect();

        if picked.is_empty() {
            return Err(StoreError::NoPlacement);
        }
        Ok(picked)
    }

    /// Candidate owners of a stored block, in recorded order.
    ///
    /// Locations of nodes that have left the cluster are skipped.
    pub fn pick_by_meta(&self, meta: &BlockMeta) -> Vec<Arc<dyn BlockOperator>> {
        let operators = self.operators.read();
        meta.locations
            .iter()
            .filter_map(|loc| {
                let op = operators.get(&loc.nid).cloned();
                if op.is_none() {
                    warn!(
                        nid = loc.nid,
                        addr = %loc.addr,
                        block_id = meta.id,
                        "Recorded owner is not a known peer"
                    );
                }
                op
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::LocalOperator;
    use peerstore_storage::{AsyncWrapper, MemoryBlockStore};

    fn operator(nid: NodeId) -> Arc<dyn BlockOperator> {
        Arc::new(LocalOperator::new(
            nid,
            format!("node-{}:7000", nid),
            Arc::new(AsyncWrapper(MemoryBlockStore::new())),
        ))
    }

    fn registry(nodes: &[NodeId]) -> PeerRegistry {
        let registry = PeerRegistry::new(Location::new(1, "node-1:7000"), HashRing::new(50));
        for &nid in nodes {
            registry.add_peer(operator(nid));
        }
        registry
    }

    fn nids(ops: &[Arc<dyn BlockOperator>]) -> Vec<NodeId> {
        ops.iter().map(|op| op.nid()).collect()
    }

    #[test]
    fn test_self_identity() {
        let registry = registry(&[]);
        assert_eq!(registry.self_nid(), 1);
        assert_eq!(registry.self_addr(), "node-1:7000");
    }

    #[test]
    fn test_empty_cluster_has_no_placement() {
        let registry = registry(&[]);
        let result = registry.pick_by_block(1, 2, ShardRole::Data, 0, 2);
        assert!(matches!(result, Err(StoreError::NoPlacement)));
    }

    #[test]
    fn test_pick_by_block_is_stable_and_distinct() {
        let registry = registry(&[1, 2, 3, 4]);

        for index in 0..20 {
            let first = nids(&registry.pick_by_block(9, 42, ShardRole::Parity, index, 2).unwrap());
            let again = nids(&registry.pick_by_block(9, 42, ShardRole::Parity, index, 2).unwrap());
            assert_eq!(first, again);
            assert_eq!(first.len(), 2);
            assert_ne!(first[0], first[1]);
        }
    }

    #[test]
    fn test_pick_by_block_caps_at_cluster_size() {
        let registry = registry(&[1, 2]);
        let picked = registry.pick_by_block(1, 1, ShardRole::Data, 0, 5).unwrap();
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_pick_by_meta_follows_recorded_order() {
        let registry = registry(&[1, 2, 3]);
        let meta = BlockMeta::new(1, 1, 1, b"x").with_locations(vec![
            Location::new(3, "node-3:7000"),
            Location::new(8, "gone:7000"),
            Location::new(1, "node-1:7000"),
        ]);
        assert_eq!(nids(&registry.pick_by_meta(&meta)), vec![3, 1]);
    }

    #[test]
    fn test_remove_and_discover() {
        let registry = registry(&[1, 2, 3]);
        assert!(registry.remove_peer(2).is_some());
        assert!(registry.operator(2).is_none());
        assert_eq!(registry.ring().keys(), vec![1, 3]);

        registry.discover(vec![operator(3), operator(4), operator(5)]);
        assert_eq!(registry.ring().keys(), vec![3, 4, 5]);
        let peers: Vec<NodeId> = registry.peers().iter().map(|l| l.nid).collect();
        assert_eq!(peers, vec![3, 4, 5]);
        assert!(registry.operator(1).is_none());
    }
}
