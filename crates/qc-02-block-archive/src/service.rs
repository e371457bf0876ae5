//! # Block Archive Reader
//!
//! Implements [`BlockArchiveApi`] over a directory of segment files.
//!
//! ## Lookup
//!
//! ```text
//! height ──→ directory snapshot ──miss──→ invalidate, None
//!                  │
//!                  └─hit──→ open segment ──→ header ──→ index ──→ record ──→ decode
//! ```
//!
//! The directory snapshot is an `Arc` swapped under a `RwLock`; readers clone
//! the `Arc` and release the lock before touching any file.

use crate::domain::{
    decode_block, read_record, ArchiveConfig, ArchiveError, ArchiveResult, ArchivedBlock,
    BlockHeight, SegmentDirectory, SerializedBlock, Signature, Timestamp,
};
use crate::ports::inbound::BlockArchiveApi;
use crate::ports::outbound::ArchiveIndex;
use parking_lot::RwLock;
use shared_types::short_signature;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-only archive store.
pub struct BlockArchiveReader<I: ArchiveIndex> {
    config: ArchiveConfig,
    index: I,
    directory: RwLock<Option<Arc<SegmentDirectory>>>,
}

impl<I: ArchiveIndex> BlockArchiveReader<I> {
    pub fn new(config: ArchiveConfig, index: I) -> Self {
        Self {
            config,
            index,
            directory: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// True while a directory snapshot is held.
    pub fn is_directory_cached(&self) -> bool {
        self.directory.read().is_some()
    }

    /// Current snapshot, scanning the archive directory if there is none.
    fn directory(&self) -> ArchiveResult<Arc<SegmentDirectory>> {
        if let Some(directory) = self.directory.read().as_ref() {
            return Ok(Arc::clone(directory));
        }

        let scanned = Arc::new(SegmentDirectory::scan(&self.config.archive_dir)?);
        debug!(
            "[qc-02] Scanned archive directory {}: {} segments",
            self.config.archive_dir.display(),
            scanned.len()
        );
        *self.directory.write() = Some(Arc::clone(&scanned));
        Ok(scanned)
    }

    fn try_fetch_serialized(&self, height: BlockHeight) -> ArchiveResult<Option<SerializedBlock>> {
        let directory = self.directory()?;
        let Some(entry) = directory.find(height) else {
            self.invalidate_file_list_cache();
            return Ok(None);
        };

        let path = self.config.archive_dir.join(&entry.file_name);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                // listed but gone: the snapshot is stale
                self.invalidate_file_list_cache();
                return Err(ArchiveError::Io(e));
            }
        };

        let mut reader = BufReader::new(file);
        read_record(&mut reader, height).map(Some)
    }

    fn try_fetch_block(&self, height: BlockHeight) -> ArchiveResult<Option<ArchivedBlock>> {
        let Some(serialized) = self.try_fetch_serialized(height)? else {
            return Ok(None);
        };
        let block = decode_block(serialized.version, &serialized.bytes)?;
        if block.height() != height {
            return Err(ArchiveError::HeightMismatch {
                expected: height,
                found: i64::from(block.height()),
            });
        }
        Ok(Some(block))
    }

    fn fetch_by_index_height(
        &self,
        lookup: Result<Option<BlockHeight>, shared_types::RepositoryError>,
        what: &str,
        key: &Signature,
    ) -> Option<ArchivedBlock> {
        match lookup {
            Ok(Some(height)) => self.fetch_block_at_height(height),
            Ok(None) => None,
            Err(e) => {
                warn!(
                    "[qc-02] Archive index lookup by {} {} failed: {}",
                    what,
                    short_signature(key),
                    ArchiveError::from(e)
                );
                None
            }
        }
    }
}

impl<I: ArchiveIndex> BlockArchiveApi for BlockArchiveReader<I> {
    fn fetch_block_at_height(&self, height: BlockHeight) -> Option<ArchivedBlock> {
        match self.try_fetch_block(height) {
            Ok(block) => block,
            Err(e) => {
                warn!("[qc-02] Failed to read archived block {}: {}", height, e);
                None
            }
        }
    }

    fn fetch_block_with_signature(&self, signature: &Signature) -> Option<ArchivedBlock> {
        let lookup = self.index.signature_to_height(signature);
        self.fetch_by_index_height(lookup, "signature", signature)
    }

    fn fetch_block_with_reference(&self, reference: &Signature) -> Option<ArchivedBlock> {
        let lookup = self.index.reference_to_height(reference);
        self.fetch_by_index_height(lookup, "reference", reference)
    }

    fn fetch_serialized_block_bytes_at_height(
        &self,
        height: BlockHeight,
    ) -> Option<SerializedBlock> {
        match self.try_fetch_serialized(height) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("[qc-02] Failed to read archived block bytes {}: {}", height, e);
                None
            }
        }
    }

    fn fetch_blocks_from_range(&self, start: BlockHeight, end: BlockHeight) -> Vec<ArchivedBlock> {
        let mut blocks = Vec::new();
        for height in start..=end {
            match self.fetch_block_at_height(height) {
                Some(block) => blocks.push(block),
                None => break,
            }
        }
        blocks
    }

    fn fetch_height_for_timestamp(&self, timestamp: Timestamp) -> BlockHeight {
        match self.index.height_for_timestamp(timestamp) {
            Ok(height) => height,
            Err(e) => {
                warn!(
                    "[qc-02] Archive index lookup by timestamp {} failed: {}",
                    timestamp, e
                );
                0
            }
        }
    }

    fn height_of_last_archived_block(&self) -> BlockHeight {
        match self.directory() {
            Ok(directory) => directory.last_height(),
            Err(e) => {
                warn!("[qc-02] Failed to scan archive directory: {}", e);
                0
            }
        }
    }

    fn invalidate_file_list_cache(&self) {
        *self.directory.write() = None;
    }

    fn segment_count(&self) -> usize {
        match self.directory() {
            Ok(directory) => directory.len(),
            Err(e) => {
                warn!("[qc-02] Failed to scan archive directory: {}", e);
                0
            }
        }
    }
}
