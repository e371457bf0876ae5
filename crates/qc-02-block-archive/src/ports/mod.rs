//! Ports layer for the Block Archive subsystem.
//!
//! - Inbound (Driving): `BlockArchiveApi`
//! - Outbound (Driven): `ArchiveIndex`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
