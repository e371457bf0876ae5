//! Segment-file builder, record encoders and an in-memory archive index.

use crate::domain::{
    v2_options, ArchivedBlock, ArchivedBlockHeader, AtStates, BlockHeight, BlockRecordV2,
    Signature, Timestamp,
};
use crate::ports::outbound::ArchiveIndex;
use bincode::Options;
use parking_lot::RwLock;
use shared_types::RepositoryError;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

pub const GENESIS_TIMESTAMP: Timestamp = 1_600_000_000_000;
pub const BLOCK_INTERVAL_MS: Timestamp = 60_000;

/// Deterministic signature for the block at `height`.
pub fn block_signature(height: BlockHeight) -> Signature {
    let mut signature = [0xB0; 64];
    signature[..4].copy_from_slice(&height.to_be_bytes());
    signature
}

fn sample_header(height: BlockHeight) -> ArchivedBlockHeader {
    ArchivedBlockHeader {
        height,
        timestamp: GENESIS_TIMESTAMP + u64::from(height) * BLOCK_INTERVAL_MS,
        reference: block_signature(height.saturating_sub(1)),
        minter: [height as u8; 32],
        signature: block_signature(height),
    }
}

fn sample_transactions(height: BlockHeight) -> Vec<Vec<u8>> {
    (0..height % 3 + 1)
        .map(|i| format!("tx-{}-{}", height, i).into_bytes())
        .collect()
}

/// Block with full AT states, as stored in version 1 segments.
pub fn sample_block_v1(height: BlockHeight) -> ArchivedBlock {
    ArchivedBlock {
        header: sample_header(height),
        transactions: sample_transactions(height),
        at_states: AtStates::Full(vec![format!("at-{}", height).into_bytes()]),
    }
}

/// Block with an AT-states hash, as stored in version 2 segments.
pub fn sample_block_v2(height: BlockHeight) -> ArchivedBlock {
    ArchivedBlock {
        header: sample_header(height),
        transactions: sample_transactions(height),
        at_states: AtStates::Hash([height as u8; 32]),
    }
}

fn push_list(out: &mut Vec<u8>, items: &[Vec<u8>]) {
    out.extend_from_slice(&(items.len() as i32).to_be_bytes());
    for item in items {
        out.extend_from_slice(&(item.len() as i32).to_be_bytes());
        out.extend_from_slice(item);
    }
}

/// Version 1 record payload. Hash-only AT states are written as an empty list.
pub fn encode_v1(block: &ArchivedBlock) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(block.header.height as i32).to_be_bytes());
    out.extend_from_slice(&(block.header.timestamp as i64).to_be_bytes());
    out.extend_from_slice(&block.header.reference);
    out.extend_from_slice(&block.header.minter);
    out.extend_from_slice(&block.header.signature);
    push_list(&mut out, &block.transactions);
    match &block.at_states {
        AtStates::Full(states) => push_list(&mut out, states),
        AtStates::Hash(_) => push_list(&mut out, &[]),
    }
    out
}

/// Version 2 record payload. Full AT states are written as a zero hash.
pub fn encode_v2(block: &ArchivedBlock) -> Vec<u8> {
    let record = BlockRecordV2 {
        header: block.header.clone(),
        transactions: block.transactions.clone(),
        at_states_hash: match &block.at_states {
            AtStates::Hash(hash) => *hash,
            AtStates::Full(_) => [0u8; 32],
        },
    };
    v2_options()
        .serialize(&record)
        .expect("v2 record serializes")
}

/// Builds a segment file covering `start..=end`.
///
/// Every height gets its sample block unless overridden.
pub struct SegmentBuilder {
    version: i32,
    start: BlockHeight,
    end: BlockHeight,
    variable_header: Vec<u8>,
    payloads: HashMap<BlockHeight, Vec<u8>>,
    framed_heights: HashMap<BlockHeight, i32>,
    file_name: Option<String>,
}

impl SegmentBuilder {
    pub fn v1(start: BlockHeight, end: BlockHeight) -> Self {
        Self::new(1, start, end)
    }

    pub fn v2(start: BlockHeight, end: BlockHeight) -> Self {
        Self::new(2, start, end)
    }

    fn new(version: i32, start: BlockHeight, end: BlockHeight) -> Self {
        Self {
            version,
            start,
            end,
            variable_header: b"{\"archiver\":\"test\"}".to_vec(),
            payloads: HashMap::new(),
            framed_heights: HashMap::new(),
            file_name: None,
        }
    }

    /// Override the header's format version (records keep their encoding).
    pub fn with_format_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Replace the record payload at `height`.
    pub fn with_payload(mut self, height: BlockHeight, payload: Vec<u8>) -> Self {
        self.payloads.insert(height, payload);
        self
    }

    /// Frame the record indexed for `height` as if it belonged to `framed`.
    pub fn with_framed_height(mut self, height: BlockHeight, framed: i32) -> Self {
        self.framed_heights.insert(height, framed);
        self
    }

    /// Write under this name instead of `<start>-<end>.dat`.
    pub fn with_file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    fn default_payload(&self, height: BlockHeight) -> Vec<u8> {
        match self.version {
            2 => encode_v2(&sample_block_v2(height)),
            _ => encode_v1(&sample_block_v1(height)),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let count = (self.end - self.start + 1) as i32;
        for field in [
            self.version,
            self.start as i32,
            self.end as i32,
            count,
            self.variable_header.len() as i32,
        ] {
            out.extend_from_slice(&field.to_be_bytes());
        }
        out.extend_from_slice(&self.variable_header);
        out.extend_from_slice(&0i32.to_be_bytes());

        let mut index = Vec::new();
        let mut data = Vec::new();
        for height in self.start..=self.end {
            let payload = self
                .payloads
                .get(&height)
                .cloned()
                .unwrap_or_else(|| self.default_payload(height));
            let framed = self
                .framed_heights
                .get(&height)
                .copied()
                .unwrap_or(height as i32);

            index.extend_from_slice(&(data.len() as i32).to_be_bytes());
            data.extend_from_slice(&framed.to_be_bytes());
            data.extend_from_slice(&(payload.len() as i32).to_be_bytes());
            data.extend_from_slice(&payload);
        }
        out.extend_from_slice(&index);
        out.extend_from_slice(&data);
        out
    }

    /// Write the segment into `dir`, returning its path.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let name = self
            .file_name
            .clone()
            .unwrap_or_else(|| format!("{}-{}.dat", self.start, self.end));
        let path = dir.join(name);
        std::fs::write(&path, self.build()).expect("write segment file");
        path
    }
}

/// Archive index held in memory.
#[derive(Default)]
pub struct InMemoryArchiveIndex {
    by_signature: RwLock<HashMap<Signature, BlockHeight>>,
    by_reference: RwLock<HashMap<Signature, BlockHeight>>,
    by_timestamp: RwLock<BTreeMap<Timestamp, BlockHeight>>,
    fail: AtomicBool,
}

impl InMemoryArchiveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, block: &ArchivedBlock) {
        let height = block.header.height;
        self.by_signature.write().insert(block.header.signature, height);
        self.by_reference.write().insert(block.header.reference, height);
        self.by_timestamp.write().insert(block.header.timestamp, height);
    }

    /// Make every lookup fail with `RepositoryError::Unavailable`.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("index offline".to_string()));
        }
        Ok(())
    }
}

impl ArchiveIndex for InMemoryArchiveIndex {
    fn signature_to_height(
        &self,
        signature: &Signature,
    ) -> Result<Option<BlockHeight>, RepositoryError> {
        self.check_available()?;
        Ok(self.by_signature.read().get(signature).copied())
    }

    fn reference_to_height(
        &self,
        reference: &Signature,
    ) -> Result<Option<BlockHeight>, RepositoryError> {
        self.check_available()?;
        Ok(self.by_reference.read().get(reference).copied())
    }

    fn height_for_timestamp(&self, timestamp: Timestamp) -> Result<BlockHeight, RepositoryError> {
        self.check_available()?;
        Ok(self
            .by_timestamp
            .read()
            .range(..=timestamp)
            .next_back()
            .map(|(_, height)| *height)
            .unwrap_or(0))
    }
}
