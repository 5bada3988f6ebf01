//! PeerStore Metadata Service
//!
//! Durable object/bucket records and shard placement.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Metadata layer                        │
//! │                                                           │
//! │  ┌─────────────────────┐    ┌──────────────────────────┐ │
//! │  │   ObjectMetaRepo    │    │      BucketMetaRepo      │ │
//! │  │ (sled / in-memory)  │    │   (sled / in-memory)     │ │
//! │  └─────────────────────┘    └──────────────────────────┘ │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────────┐ │
//! │  │                      HashRing                        │ │
//! │  │        (consistent-hash shard placement)             │ │
//! │  └─────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod memory;
pub mod models;
pub mod repo;
pub mod sled_store;
pub mod topology;

pub use memory::MemoryMetaStore;
pub use models::{BucketMeta, Object, ObjectMeta, OwnerId};
pub use repo::{BucketMetaRepo, ObjectMetaRepo};
pub use sled_store::SledMetaStore;
pub use topology::{HashFn, HashRing};
