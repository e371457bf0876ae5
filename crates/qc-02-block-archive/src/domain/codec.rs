//! # Block Record Decoders
//!
//! | Version | Encoding | AT states |
//! |---------|----------|-----------|
//! | 1 | fixed big-endian fields, length-prefixed lists | full |
//! | 2 | bincode [`BlockRecordV2`] | 32-byte hash |
//!
//! Both decoders reject bytes left over after the record.
//!
//! Version 1 layout:
//!
//! ```text
//! height i32 | timestamp i64 | reference [64] | minter [32] | signature [64]
//! tx_count i32 | (len i32, bytes) * tx_count
//! at_count i32 | (len i32, bytes) * at_count
//! ```

use crate::domain::entities::{ArchivedBlock, ArchivedBlockHeader, AtStates, RecordVersion};
use crate::domain::errors::{ArchiveError, ArchiveResult};
use bincode::Options;
use serde::{Deserialize, Serialize};

/// Version 2 record body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecordV2 {
    pub header: ArchivedBlockHeader,
    pub transactions: Vec<Vec<u8>>,
    pub at_states_hash: [u8; 32],
}

/// Decode a record payload according to its segment's version.
pub fn decode_block(version: RecordVersion, bytes: &[u8]) -> ArchiveResult<ArchivedBlock> {
    match version {
        RecordVersion::V1 => decode_v1(bytes),
        RecordVersion::V2 => decode_v2(bytes),
    }
}

pub fn decode_v1(bytes: &[u8]) -> ArchiveResult<ArchivedBlock> {
    let mut reader = ByteReader::new(bytes);

    let height = reader.read_i32("block height")?;
    let timestamp = reader.read_i64("block timestamp")?;
    let header = ArchivedBlockHeader {
        height: u32::try_from(height)
            .map_err(|_| ArchiveError::Decode(format!("negative block height {}", height)))?,
        timestamp: u64::try_from(timestamp)
            .map_err(|_| ArchiveError::Decode(format!("negative timestamp {}", timestamp)))?,
        reference: reader.read_array("block reference")?,
        minter: reader.read_array("minter public key")?,
        signature: reader.read_array("block signature")?,
    };

    let transactions = reader.read_list("transactions")?;
    let at_states = reader.read_list("AT states")?;

    if reader.remaining() != 0 {
        return Err(ArchiveError::Decode(format!(
            "{} trailing bytes after v1 record",
            reader.remaining()
        )));
    }

    Ok(ArchivedBlock {
        header,
        transactions,
        at_states: AtStates::Full(at_states),
    })
}

/// Bincode configuration for version 2 records.
///
/// Same wire format as `bincode::serialize` (fixed-width little-endian
/// integers), but trailing bytes are an error.
pub fn v2_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

pub fn decode_v2(bytes: &[u8]) -> ArchiveResult<ArchivedBlock> {
    let record: BlockRecordV2 = v2_options().deserialize(bytes)?;
    Ok(ArchivedBlock {
        header: record.header,
        transactions: record.transactions,
        at_states: AtStates::Hash(record.at_states_hash),
    })
}

/// Bounds-checked big-endian cursor over a record payload.
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, context: &'static str) -> ArchiveResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(ArchiveError::Truncated(context));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self, context: &'static str) -> ArchiveResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    fn read_i32(&mut self, context: &'static str) -> ArchiveResult<i32> {
        Ok(i32::from_be_bytes(self.read_array(context)?))
    }

    fn read_i64(&mut self, context: &'static str) -> ArchiveResult<i64> {
        Ok(i64::from_be_bytes(self.read_array(context)?))
    }

    fn read_len(&mut self, context: &'static str) -> ArchiveResult<usize> {
        let len = self.read_i32(context)?;
        usize::try_from(len)
            .map_err(|_| ArchiveError::Decode(format!("negative length {} in {}", len, context)))
    }

    /// `count i32` followed by `count` length-prefixed byte strings.
    fn read_list(&mut self, context: &'static str) -> ArchiveResult<Vec<Vec<u8>>> {
        let count = self.read_len(context)?;
        // each entry needs at least its 4-byte length
        if count > self.remaining() / 4 {
            return Err(ArchiveError::Truncated(context));
        }
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let len = self.read_len(context)?;
            items.push(self.take(len, context)?.to_vec());
        }
        Ok(items)
    }
}
