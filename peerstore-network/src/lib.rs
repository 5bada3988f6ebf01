//! PeerStore Network Layer
//!
//! How the orchestrator reaches the nodes that own shards:
//! - **BlockOperator**: per-node store/fetch/delete of single blocks
//! - **PeerRegistry**: cluster membership plus per-shard owner selection on
//!   the consistent-hash ring
//!
//! The transport between nodes is pluggable behind `BlockOperator`;
//! `LocalOperator` serves a block store living in this process.

pub mod operator;
pub mod peer;

pub use operator::{BlockOperator, LocalOperator};
pub use peer::PeerRegistry;
