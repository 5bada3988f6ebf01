//! PeerStore Core Library
//!
//! Core abstractions for the PeerStore peer-distributed object store.
//! This crate provides:
//! - Reed-Solomon erasure coding with a size-driven shard layout strategy
//! - CRC-32 block checksums
//! - Block and location records shared by every node
//! - Snowflake-style unique id generation
//! - The lifecycle notification bus
//! - Common types and error handling

pub mod block;
pub mod checksum;
pub mod erasure;
pub mod error;
pub mod events;
pub mod id;

pub use block::{BlockId, BlockMeta, BucketId, Location, NodeId, ObjectId};
pub use checksum::checksum;
pub use erasure::{default_strategy, ErasureCoder, ShardLayout, ShardRole, Strategy};
pub use error::{Result, StoreError};
pub use events::{Event, EventBus, EventKind};
pub use id::{IdGenerator, Snowflake};

/// Largest data shard produced by the default strategy (1 MiB).
///
/// Override at runtime via the `erasure.max_shard_size` config key.
pub const MAX_SHARD_SIZE: u64 = 1024 * 1024;

/// Replica factor applied to every shard unless configured otherwise.
pub const DEFAULT_REPLICAS: usize = 2;

/// Virtual positions per node on the placement ring.
pub const DEFAULT_RING_REPLICAS: usize = 50;

/// Upper bound on data + parity shards for GF(2^8) Reed-Solomon.
pub const MAX_TOTAL_SHARDS: usize = 256;

/// Current wall-clock time in milliseconds, as stored in every record.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
