//! PeerStore Gateway
//!
//! The storage orchestrator and the process around it:
//! - `Controller`: bucket registry plus erasure-coded object upload,
//!   download, stat, listing and deletion
//! - per-object work areas for staging shards
//! - TOML configuration with environment overrides
//! - wiring of block stores, metadata and placement from configuration

#![allow(clippy::too_many_arguments)]

pub mod bootstrap;
pub mod config;
pub mod controller;
pub mod workdir;

pub use bootstrap::build_controller;
pub use config::{ConfigError, GatewayConfig};
pub use controller::{Controller, ControllerSettings};
pub use workdir::WorkArea;
