//! Consistent-hash placement ring
//!
//! Every node owns `replicas` virtual positions on a 32-bit hash circle. A
//! key belongs to the node at the first position strictly greater than the
//! key's hash, wrapping around to the lowest position. Adding a node only
//! moves the keys that land on its new positions, roughly 1/(N+1) of them.
//!
//! Positions are kept in a single sorted vector behind a read/write lock:
//! lookups are one binary search, and a membership change rebuilds the vector
//! under the write lock so no reader ever observes a half-applied update.

use parking_lot::RwLock;
use peerstore_core::block::NodeId;
use peerstore_core::DEFAULT_RING_REPLICAS;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Hash function mapping keys (and virtual node labels) onto the ring
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Consistent-hash ring of node ids
pub struct HashRing {
    replicas: usize,
    hash: HashFn,
    /// (position, node), sorted
    positions: RwLock<Vec<(u32, NodeId)>>,
}

impl HashRing {
    /// Ring with `replicas` virtual positions per node, hashed with CRC-32
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, crc32fast::hash)
    }

    /// Ring with a custom hash function
    pub fn with_hasher<F>(replicas: usize, hash: F) -> Self
    where
        F: Fn(&[u8]) -> u32 + Send + Sync + 'static,
    {
        Self {
            replicas: replicas.max(1),
            hash: Arc::new(hash),
            positions: RwLock::new(Vec::new()),
        }
    }

    /// Virtual positions per node
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    fn node_positions(&self, node: NodeId) -> impl Iterator<Item = u32> + '_ {
        (0..self.replicas).map(move |i| (self.hash)(format!("{:x}{}", node, i).as_bytes()))
    }

    /// Insert nodes. Nodes already on the ring are left untouched.
    pub fn add(&self, nodes: &[NodeId]) {
        let mut positions = self.positions.write();
        let present: BTreeSet<NodeId> = positions.iter().map(|&(_, n)| n).collect();
        let mut added = 0;

        for &node in nodes.iter().collect::<BTreeSet<_>>() {
            if present.contains(&node) {
                continue;
            }
            positions.extend(self.node_positions(node).map(|pos| (pos, node)));
            added += 1;
        }

        if added > 0 {
            positions.sort_unstable();
            debug!(added, total = positions.len(), "Ring nodes added");
        }
    }

    /// Remove nodes and every one of their positions
    pub fn remove(&self, nodes: &[NodeId]) {
        let mut positions = self.positions.write();
        let before = positions.len();
        positions.retain(|(_, node)| !nodes.contains(node));
        if positions.len() != before {
            debug!(
                removed = before - positions.len(),
                total = positions.len(),
                "Ring nodes removed"
            );
        }
    }

    /// Index of the first position strictly greater than `hash`, wrapping
    fn successor(positions: &[(u32, NodeId)], hash: u32) -> usize {
        let idx = positions.partition_point(|&(pos, _)| pos <= hash);
        if idx == positions.len() {
            0
        } else {
            idx
        }
    }

    /// Node owning `key`, or `None` if the ring is empty
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<NodeId> {
        let positions = self.positions.read();
        if positions.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_ref());
        Some(positions[Self::successor(&positions, hash)].1)
    }

    /// Up to `n` distinct nodes for `key`, walking clockwise from its owner
    pub fn get_n(&self, key: impl AsRef<[u8]>, n: usize) -> Vec<NodeId> {
        let positions = self.positions.read();
        let mut owners = Vec::with_capacity(n);
        if positions.is_empty() || n == 0 {
            return owners;
        }

        let start = Self::successor(&positions, (self.hash)(key.as_ref()));
        for i in 0..positions.len() {
            let node = positions[(start + i) % positions.len()].1;
            if !owners.contains(&node) {
                owners.push(node);
                if owners.len() == n {
                    break;
                }
            }
        }
        owners
    }

    /// Registered nodes, ascending
    pub fn keys(&self) -> Vec<NodeId> {
        let positions = self.positions.read();
        positions
            .iter()
            .map(|&(_, n)| n)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.positions.read().iter().any(|&(_, n)| n == node)
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.read().is_empty()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_RING_REPLICAS)
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("nodes", &self.keys())
            .finish()
    }
}
