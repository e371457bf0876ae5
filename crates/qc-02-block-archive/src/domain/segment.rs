//! # Segment Reader
//!
//! Big-endian layout of an archive segment:
//!
//! ```text
//! [0:4)          i32 format version (1 or 2)
//! [4:8)          i32 start height
//! [8:12)         i32 end height
//! [12:16)        i32 block count (unused)
//! [16:20)        i32 variable-header length V
//! [20:20+V)      variable header (opaque)
//! [20+V:24+V)    i32 reserved
//! index          i32 offset per height in [start, end], relative to data region
//! data region    per record: i32 height | i32 length | payload
//! ```

use crate::domain::entities::{BlockHeight, RecordVersion, SerializedBlock};
use crate::domain::errors::{read_error, ArchiveError, ArchiveResult};
use std::io::{Read, Seek, SeekFrom};

/// Fixed part of the segment header plus the derived index position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    pub version: i32,
    pub start: i32,
    pub end: i32,
    pub block_count: i32,
    /// Absolute file offset of the first index entry.
    pub index_start: u64,
}

impl SegmentHeader {
    pub fn covers(&self, height: BlockHeight) -> bool {
        i64::from(self.start) <= i64::from(height) && i64::from(height) <= i64::from(self.end)
    }

    /// Absolute file offset of the index entry for `height`.
    pub fn index_position(&self, height: BlockHeight) -> u64 {
        self.index_start + (i64::from(height) - i64::from(self.start)) as u64 * 4
    }

    /// Absolute file offset of the data region.
    pub fn data_start(&self) -> u64 {
        let entries = (i64::from(self.end) - i64::from(self.start) + 1).max(0) as u64;
        self.index_start + entries * 4
    }
}

fn read_i32<R: Read>(reader: &mut R, context: &'static str) -> ArchiveResult<i32> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| read_error(e, context))?;
    Ok(i32::from_be_bytes(buf))
}

fn non_negative(value: i32, what: &str) -> ArchiveResult<u64> {
    u64::try_from(value).map_err(|_| ArchiveError::Decode(format!("negative {}: {}", what, value)))
}

/// Read and check the segment header.
pub fn read_header<R: Read + Seek>(reader: &mut R) -> ArchiveResult<SegmentHeader> {
    reader.seek(SeekFrom::Start(0))?;
    let version = read_i32(reader, "format version")?;
    let start = read_i32(reader, "start height")?;
    let end = read_i32(reader, "end height")?;
    let block_count = read_i32(reader, "block count")?;
    let variable_len = non_negative(
        read_i32(reader, "variable header length")?,
        "variable header length",
    )?;

    reader.seek(SeekFrom::Current(variable_len as i64))?;
    let _reserved = read_i32(reader, "reserved length")?;

    Ok(SegmentHeader {
        version,
        start,
        end,
        block_count,
        index_start: 20 + variable_len + 4,
    })
}

/// Locate and read the raw record for `height`.
pub fn read_record<R: Read + Seek>(
    reader: &mut R,
    height: BlockHeight,
) -> ArchiveResult<SerializedBlock> {
    let header = read_header(reader)?;
    let version = RecordVersion::from_format(header.version)
        .ok_or(ArchiveError::UnsupportedVersion(header.version))?;

    if !header.covers(height) {
        return Err(ArchiveError::HeightOutOfRange {
            height: i64::from(height),
            start: i64::from(header.start),
            end: i64::from(header.end),
        });
    }

    reader.seek(SeekFrom::Start(header.index_position(height)))?;
    let offset = non_negative(read_i32(reader, "index entry")?, "record offset")?;

    reader.seek(SeekFrom::Start(header.data_start() + offset))?;
    let record_height = read_i32(reader, "record height")?;
    if i64::from(record_height) != i64::from(height) {
        return Err(ArchiveError::HeightMismatch {
            expected: height,
            found: i64::from(record_height),
        });
    }

    let length = non_negative(read_i32(reader, "record length")?, "record length")?;
    let mut bytes = Vec::new();
    reader.by_ref().take(length).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != length {
        return Err(ArchiveError::Truncated("record payload"));
    }

    Ok(SerializedBlock {
        height,
        version,
        bytes,
    })
}
