//! # Block Archive Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Serves finalized historical blocks from compacted, immutable segment files.
//! Each segment is named `<start>-<end>.<ext>` and holds one record per height
//! in its inclusive range. There is no write path here; segments are produced
//! elsewhere and never modified once written.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | A returned block is the block at the requested height | `domain/segment.rs` - record height check, `service.rs` - decoded height check |
//! | Unknown format versions are never decoded | `domain/segment.rs` - `read_record()` |
//! | A lookup miss drops the directory snapshot | `service.rs` - `try_fetch_serialized()` |
//! | Range fetches stop at the first gap | `service.rs` - `fetch_blocks_from_range()` |
//! | Read failures surface as "not found", never as panics | `service.rs` - `BlockArchiveApi` impl |
//!
//! ## Outbound Dependencies
//!
//! | Component | Trait | Purpose |
//! |-----------|-------|---------|
//! | Repository | `ArchiveIndex` | signature / reference / timestamp → height |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  service.rs        - BlockArchiveReader                         │
//! │  ports/inbound.rs  - BlockArchiveApi                            │
//! │  ports/outbound.rs - ArchiveIndex                               │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/directory.rs - SegmentDirectory, file-name parsing      │
//! │  domain/segment.rs   - segment header and record lookup         │
//! │  domain/codec.rs     - v1 / v2 record decoders                  │
//! │  domain/entities.rs  - ArchivedBlock, SerializedBlock           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use domain::*;
pub use ports::*;
pub use service::BlockArchiveReader;
