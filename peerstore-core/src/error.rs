//! Error types for PeerStore
//!
//! Provides a unified error type for all PeerStore operations.

use crate::block::{BlockId, BucketId, NodeId, ObjectId};
use thiserror::Error;

/// Result type alias for PeerStore operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for PeerStore
#[derive(Error, Debug)]
pub enum StoreError {
    // ===== Erasure Coding Errors =====
    #[error("Erasure coding error: {0}")]
    ErasureCoding(String),

    #[error(
        "Shard count mismatch: expected {expected_data}+{expected_parity}, got {data}+{parity}"
    )]
    ShardCountMismatch {
        expected_data: usize,
        expected_parity: usize,
        data: usize,
        parity: usize,
    },

    #[error("Unrecoverable data: {absent} shards absent, parity only covers {parity}")]
    Unrecoverable { absent: usize, parity: usize },

    // ===== Integrity Errors =====
    #[error("Checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Block size mismatch: expected {expected} bytes, got {actual}")]
    BlockSizeMismatch { expected: u64, actual: u64 },

    #[error("Inconsistent shards: parity does not match data across {data}+{parity} shards")]
    Inconsistent { data: usize, parity: usize },

    // ===== Not Found Errors =====
    #[error("Object not found: bucket {bucket_id}, object {object_id}")]
    ObjectNotFound {
        bucket_id: BucketId,
        object_id: ObjectId,
    },

    #[error("Bucket not found: {0}")]
    BucketNotFound(BucketId),

    #[error("Block not found: bucket {bucket_id}, object {object_id}, block {block_id}")]
    BlockNotFound {
        bucket_id: BucketId,
        object_id: ObjectId,
        block_id: BlockId,
    },

    // ===== Metadata Errors =====
    #[error("Object already exists: bucket {bucket_id}, object {object_id}")]
    AlreadyExists {
        bucket_id: BucketId,
        object_id: ObjectId,
    },

    #[error("Bucket already exists: {0}")]
    BucketAlreadyExists(BucketId),

    #[error("Bucket {0} is not empty")]
    BucketNotEmpty(BucketId),

    // ===== Placement / Peer Errors =====
    #[error("No placement available: placement ring is empty")]
    NoPlacement,

    #[error("Peer {nid} failed: {reason}")]
    Peer { nid: NodeId, reason: String },

    // ===== Notification Errors =====
    #[error("No subscribers for topic {0}")]
    NoSubscribers(String),

    // ===== Storage Errors =====
    #[error("Storage error: {0}")]
    Storage(String),

    // ===== I/O Errors =====
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ===== Serialization Errors =====
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ===== Configuration Errors =====
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ===== Generic Errors =====
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Missing object, bucket or block metadata. Retrying will not help.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ObjectNotFound { .. }
                | StoreError::BucketNotFound(_)
                | StoreError::BlockNotFound { .. }
        )
    }

    /// Failure against one specific peer; another owner may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Peer { .. } | StoreError::Io(_))
    }

    /// The object can't be rebuilt: too many shards lost, or the ones left
    /// disagree with each other.
    pub fn is_data_loss(&self) -> bool {
        matches!(
            self,
            StoreError::Unrecoverable { .. } | StoreError::Inconsistent { .. }
        )
    }
}

impl From<reed_solomon_erasure::Error> for StoreError {
    fn from(err: reed_solomon_erasure::Error) -> Self {
        StoreError::ErasureCoding(err.to_string())
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Unrecoverable {
            absent: 3,
            parity: 2,
        };
        assert_eq!(
            err.to_string(),
            "Unrecoverable data: 3 shards absent, parity only covers 2"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_error_classification() {
        let not_found = StoreError::ObjectNotFound {
            bucket_id: 1,
            object_id: 2,
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_transient());

        let lost = StoreError::Unrecoverable {
            absent: 2,
            parity: 1,
        };
        assert!(lost.is_data_loss());
        assert!(!lost.is_not_found());

        let mixed = StoreError::Inconsistent { data: 3, parity: 1 };
        assert!(mixed.is_data_loss());
        assert!(!mixed.is_transient());

        let peer = StoreError::Peer {
            nid: 7,
            reason: "connection refused".into(),
        };
        assert!(peer.is_transient());
        assert!(!peer.is_data_loss());
    }
}
