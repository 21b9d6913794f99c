//! The proposal ledger.
//!
//! [`ProposalBook`] is the lifecycle state machine (pending → active →
//! closed, or pending → cancelled) with one vote per address.
//! [`LedgerContract`] is the surface the application consumes, and
//! [`MemoryLedger`] implements it in-process with a pending-transaction pool
//! so writes are only durable once confirmed.

pub mod book;
pub mod config;
pub mod contract;
pub mod memory;
pub mod snapshot;

pub use book::{LedgerProposal, ProposalBook, MIN_CANDIDATES};
pub use config::LedgerConfig;
pub use contract::LedgerContract;
pub use memory::MemoryLedger;
pub use snapshot::{LedgerSnapshot, SnapshotError};
