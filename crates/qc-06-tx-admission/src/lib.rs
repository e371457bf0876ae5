//! # Transaction Admission Subsystem
//!
//! **Subsystem ID:** 6
//!
//! ## Purpose
//!
//! Receives transactions relayed by peers, validates them in the background
//! and imports the good ones into the local unconfirmed-transaction store.
//! Newly imported signatures are announced to peers once per batch.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | At most one candidate per signature | `domain/queue.rs` - `insert_if_absent()` |
//! | Cooling-down signatures are never queued | `service/mod.rs` - `submit()` |
//! | Only `SignatureValid` candidates reach the repository | `domain/queue.rs` - `snapshot_validated()` |
//! | Past-deadline candidates are removed before import, whatever their tag | `service/mod.rs` - `validate_phase()` |
//! | No import while sync runs or is requested | `service/mod.rs` - `import_phase()` |
//! | Chain lock released on every exit from import | `ports/outbound.rs` - `ChainLockGuard` |
//! | Low-priority types never enter the unconfirmed cache | `service/mod.rs` - `import_batch()` |
//! | At most one announcement per import phase, sent after the chain lock is released | `service/mod.rs` - `import_phase()` |
//!
//! ## Candidate Lifecycle
//!
//! ```text
//! submit ──→ [Unvalidated] ──verify──→ [SignatureValid] ──save──→ (imported, announced)
//!                 │                          │
//!                 │ deadline <= tip           │ Invalid(reason)
//!                 ├──→ cool-down 10 min       ├──→ cool-down 1 h (24 h if too old)
//!                 │ bad signature             │ AlreadyExists
//!                 └──→ cool-down 1 h          └──→ (dropped)
//! ```
//!
//! ## Outbound Dependencies
//!
//! | Component | Trait | Purpose |
//! |-----------|-------|---------|
//! | Repository | `TransactionRepository` | Unconfirmed store, per-type validity |
//! | Chain state | `ChainState` | Tip timestamp, chain lock |
//! | Synchronizer | `SyncCoordinator` | Defer import during sync |
//! | Network | `SignatureBroadcaster` | Announce imported signatures |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/worker.rs     - AdmissionWorker (tokio interval)      │
//! │  adapters/chain_lock.rs - ChainLock, HeldChainLock              │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ drives ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  service/          - TransactionImporter                        │
//! │  ports/inbound.rs  - TransactionAdmissionApi                    │
//! │  ports/outbound.rs - repository, chain, sync, broadcast, time   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs  - Transaction, CandidateTransaction        │
//! │  domain/queue.rs     - CandidateQueue                           │
//! │  domain/invalid.rs   - InvalidTransactionRecords                │
//! │  domain/services.rs  - Ed25519 verification (rayon)             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let importer = Arc::new(TransactionImporter::new(deps, AdmissionConfig::default()));
//! let worker = AdmissionWorker::spawn(Arc::clone(&importer), importer.config().cycle_interval);
//!
//! // network receive path
//! importer.submit(tx);
//!
//! // node shutdown
//! worker.shutdown().await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::{AdmissionDependencies, TransactionImporter};
