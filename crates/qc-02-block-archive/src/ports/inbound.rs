//! # Inbound Port - BlockArchiveApi
//!
//! Read side of the block archive, called by the block synchronizer, the
//! peer request handlers and API readers.
//!
//! Lookups never fail loudly: a miss, a damaged segment or an index failure
//! all come back as `None` (or 0 for heights), and the cause is logged.

use crate::domain::{ArchivedBlock, BlockHeight, SerializedBlock, Signature, Timestamp};

pub trait BlockArchiveApi: Send + Sync {
    fn fetch_block_at_height(&self, height: BlockHeight) -> Option<ArchivedBlock>;

    fn fetch_block_with_signature(&self, signature: &Signature) -> Option<ArchivedBlock>;

    /// Block whose parent reference is `reference`, i.e. the child of the
    /// block signed with it.
    fn fetch_block_with_reference(&self, reference: &Signature) -> Option<ArchivedBlock>;

    /// Record payload as stored, without decoding.
    fn fetch_serialized_block_bytes_at_height(&self, height: BlockHeight)
        -> Option<SerializedBlock>;

    /// Blocks `start..=end` in order, stopping at the first missing height.
    fn fetch_blocks_from_range(&self, start: BlockHeight, end: BlockHeight) -> Vec<ArchivedBlock>;

    fn fetch_height_for_timestamp(&self, timestamp: Timestamp) -> BlockHeight;

    /// Highest height covered by any segment, 0 for an empty archive.
    fn height_of_last_archived_block(&self) -> BlockHeight;

    /// Drop the directory snapshot; the next lookup rescans.
    fn invalidate_file_list_cache(&self);

    fn segment_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn BlockArchiveApi) {}
}
