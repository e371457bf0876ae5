//! Ports layer for the Transaction Admission subsystem.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) ports: API exposed to the network layer and the node
//! - Outbound (Driven) ports: repository, chain state, sync, broadcast, time

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
