//! Outbound (Driven) port: archive metadata held by the node's repository.

use shared_types::{BlockHeight, RepositoryError, Signature, Timestamp};

/// Height lookups the segment files cannot answer on their own.
pub trait ArchiveIndex: Send + Sync {
    /// Height of the archived block with this signature.
    fn signature_to_height(&self, signature: &Signature)
        -> Result<Option<BlockHeight>, RepositoryError>;

    /// Height of the archived block whose parent reference is `reference`.
    fn reference_to_height(&self, reference: &Signature)
        -> Result<Option<BlockHeight>, RepositoryError>;

    /// Height of the last archived block minted at or before `timestamp`,
    /// 0 if there is none.
    fn height_for_timestamp(&self, timestamp: Timestamp) -> Result<BlockHeight, RepositoryError>;
}
