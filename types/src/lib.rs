//! Fundamental types for the ballot workspace.
//!
//! Defines what every other crate agrees on: account addresses, timestamps
//! and the clock seam, transaction hashes, proposal records, ledger calls and
//! receipts, the shared error taxonomy and the RPC envelopes.

pub mod address;
pub mod call;
pub mod error;
pub mod hash;
pub mod proposal;
pub mod time;
pub mod wire;

pub use address::Address;
pub use call::{LedgerCall, Receipt, TxStatus};
pub use error::{ErrorKind, LedgerError, LedgerResult, LifecycleAction};
pub use hash::TxHash;
pub use proposal::{
    Candidate, CandidateId, CandidateTally, NewProposal, Proposal, ProposalId, ProposalRecord,
    ProposalStatus, ResultRow,
};
pub use time::{Clock, SystemClock, Timestamp, SECS_PER_DAY};
pub use wire::{RpcRequest, RpcResponse};
