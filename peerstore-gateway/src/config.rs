//! Gateway configuration
//!
//! Loaded from a TOML file, then adjusted by `PEERSTORE_*` environment
//! variables. Every section falls back to its defaults when omitted.

use peerstore_core::block::NodeId;
use peerstore_core::id::MAX_WORKER;
use peerstore_core::{DEFAULT_REPLICAS, DEFAULT_RING_REPLICAS, MAX_SHARD_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Complete gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// This node's identity
    #[serde(default)]
    pub node: NodeSettings,

    /// Local paths
    #[serde(default)]
    pub storage: StorageSettings,

    /// Shard placement
    #[serde(default)]
    pub placement: PlacementSettings,

    /// Erasure coding
    #[serde(default)]
    pub erasure: ErasureSettings,

    /// Lifecycle notifications
    #[serde(default)]
    pub events: EventSettings,

    /// Block-store nodes making up the cluster
    #[serde(default = "default_cluster")]
    pub cluster: Vec<ClusterNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    /// Node id, also recorded as the bucket root location
    pub id: NodeId,

    /// Address advertised to peers
    pub address: String,

    /// Worker id mixed into generated object and block ids (0..1024)
    pub worker_id: u64,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            id: 1,
            address: "127.0.0.1:7001".to_string(),
            worker_id: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Sled metadata database
    pub meta_dir: PathBuf,

    /// Root of the per-object working areas
    pub tmp_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            meta_dir: PathBuf::from("./peerstore_data/meta"),
            tmp_dir: std::env::temp_dir().join("peerstore"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// Virtual positions per node on the ring
    pub ring_replicas: usize,

    /// Copies written for every shard
    pub replicas: usize,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            ring_replicas: DEFAULT_RING_REPLICAS,
            replicas: DEFAULT_REPLICAS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErasureSettings {
    /// Largest data shard in bytes
    pub max_shard_size: u64,
}

impl Default for ErasureSettings {
    fn default() -> Self {
        Self {
            max_shard_size: MAX_SHARD_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Queue capacity per subscriber
    pub channel_size: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            channel_size: peerstore_core::events::DEFAULT_CHANNEL_SIZE,
        }
    }
}

/// One block-store node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub id: NodeId,
    pub address: String,
    pub data_dir: PathBuf,
}

fn default_cluster() -> Vec<ClusterNode> {
    vec![ClusterNode {
        id: 1,
        address: "127.0.0.1:7001".to_string(),
        data_dir: PathBuf::from("./peerstore_data/node-1"),
    }]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            node: NodeSettings::default(),
            storage: StorageSettings::default(),
            placement: PlacementSettings::default(),
            erasure: ErasureSettings::default(),
            events: EventSettings::default(),
            cluster: default_cluster(),
        }
    }
}

impl GatewayConfig {
    /// Load and validate a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: GatewayConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file, or fall back to defaults when it can't be read
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = ?path.as_ref(),
                    error = %e,
                    "Failed to load config, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Apply `PEERSTORE_*` environment variables
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by variable name
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup("PEERSTORE_NODE_ID") {
            if let Ok(id) = id.parse::<NodeId>() {
                self.node.id = id;
            }
        }
        if let Some(addr) = lookup("PEERSTORE_NODE_ADDRESS") {
            self.node.address = addr;
        }
        if let Some(dir) = lookup("PEERSTORE_TMP_DIR") {
            self.storage.tmp_dir = PathBuf::from(dir);
        }
        if let Some(replicas) = lookup("PEERSTORE_REPLICAS") {
            if let Ok(replicas) = replicas.parse::<usize>() {
                self.placement.replicas = replicas;
            }
        }
        if let Some(replicas) = lookup("PEERSTORE_RING_REPLICAS") {
            if let Ok(replicas) = replicas.parse::<usize>() {
                self.placement.ring_replicas = replicas;
            }
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.placement.replicas == 0 {
            return Err(ConfigError::ValidationError(
                "placement.replicas must be at least 1".to_string(),
            ));
        }
        if self.placement.ring_replicas == 0 {
            return Err(ConfigError::ValidationError(
                "placement.ring_replicas must be at least 1".to_string(),
            ));
        }
        if self.erasure.max_shard_size == 0 {
            return Err(ConfigError::ValidationError(
                "erasure.max_shard_size must be positive".to_string(),
            ));
        }
        if self.node.worker_id >= MAX_WORKER {
            return Err(ConfigError::ValidationError(format!(
                "node.worker_id must be below {}",
                MAX_WORKER
            )));
        }
        if self.cluster.is_empty() {
            return Err(ConfigError::ValidationError(
                "cluster must list at least one node".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for node in &self.cluster {
            if !seen.insert(node.id) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate cluster node id {}",
                    node.id
                )));
            }
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
