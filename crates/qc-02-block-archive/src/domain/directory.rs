//! # Segment Directory
//!
//! Which segment file owns which height range. Built by listing the archive
//! directory; file names are `<start>-<end>.<ext>`.

use crate::domain::entities::BlockHeight;
use crate::domain::errors::ArchiveResult;
use std::path::Path;
use tracing::warn;

/// One segment file and the inclusive height range it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentEntry {
    pub file_name: String,
    pub start: BlockHeight,
    pub end: BlockHeight,
    /// `end - start`.
    pub length: u32,
}

impl SegmentEntry {
    pub fn contains(&self, height: BlockHeight) -> bool {
        self.start <= height && height <= self.end
    }
}

/// Parse `<start>-<end>.<ext>`. `None` for anything else, including
/// `end < start`.
pub fn parse_segment_file_name(name: &str) -> Option<SegmentEntry> {
    let (stem, ext) = name.split_once('.')?;
    if ext.is_empty() {
        return None;
    }
    let (start, end) = stem.split_once('-')?;
    let start: BlockHeight = start.parse().ok()?;
    let end: BlockHeight = end.parse().ok()?;
    if end < start {
        return None;
    }
    Some(SegmentEntry {
        file_name: name.to_string(),
        start,
        end,
        length: end - start,
    })
}

/// Immutable snapshot of the archive directory, ordered by start height.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentDirectory {
    entries: Vec<SegmentEntry>,
}

impl SegmentDirectory {
    pub fn from_entries(mut entries: Vec<SegmentEntry>) -> Self {
        entries.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
        Self { entries }
    }

    /// List `dir`. A missing directory gives an empty snapshot; badly named
    /// files are skipped.
    pub fn scan(dir: &Path) -> ArchiveResult<Self> {
        if !dir.exists() {
            return Ok(Self::default());
        }

        let mut entries = Vec::new();
        for item in std::fs::read_dir(dir)? {
            let item = item?;
            if !item.file_type()?.is_file() {
                continue;
            }
            let name = item.file_name();
            let Some(name) = name.to_str() else {
                warn!("[qc-02] Skipping archive file with non-UTF-8 name: {:?}", name);
                continue;
            };
            match parse_segment_file_name(name) {
                Some(entry) => entries.push(entry),
                None => warn!("[qc-02] Skipping malformed archive file name: {}", name),
            }
        }
        Ok(Self::from_entries(entries))
    }

    /// First segment (by start height) containing `height`.
    pub fn find(&self, height: BlockHeight) -> Option<&SegmentEntry> {
        self.entries.iter().find(|entry| entry.contains(height))
    }

    /// Highest `end` across all segments, 0 if there are none.
    pub fn last_height(&self) -> BlockHeight {
        self.entries.iter().map(|entry| entry.end).max().unwrap_or(0)
    }

    pub fn entries(&self) -> &[SegmentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
