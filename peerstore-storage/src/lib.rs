//! PeerStore Block Storage
//!
//! Node-local block persistence:
//! - `BlockStore` trait for pluggable storage
//! - `DiskBlockStore` for production block storage (one directory per block)
//! - `MemoryBlockStore` for testing

pub mod backend;
pub mod disk;
pub mod memory;

pub use backend::{AsyncWrapper, BlockKey, BlockStore, BlockStoreSync, StoreStats};
pub use disk::DiskBlockStore;
pub use memory::MemoryBlockStore;
