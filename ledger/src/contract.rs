//! The ledger contract surface the application consumes.
//!
//! Reads are idempotent and may be retried freely. Writes go through
//! [`LedgerContract::submit`], which only queues a transaction; the effect is
//! known once [`LedgerContract::confirm`] returns its receipt.

use async_trait::async_trait;
use ballot_types::{
    Address, Candidate, CandidateTally, LedgerCall, LedgerResult, ProposalId, ProposalRecord,
    Receipt, TxHash,
};

#[async_trait]
pub trait LedgerContract: Send + Sync {
    /// Number of proposals ever created; ids run from 0 to `count - 1`.
    async fn proposal_count(&self) -> LedgerResult<u64>;

    async fn proposal(&self, id: ProposalId) -> LedgerResult<ProposalRecord>;

    async fn proposal_candidates(&self, id: ProposalId) -> LedgerResult<Vec<Candidate>>;

    /// Per-candidate tallies, in candidate order.
    async fn proposal_results(&self, id: ProposalId) -> LedgerResult<Vec<CandidateTally>>;

    async fn has_voted(&self, id: ProposalId, voter: &Address) -> LedgerResult<bool>;

    /// Queue a state-changing call signed by `from`.
    async fn submit(&self, from: &Address, call: LedgerCall) -> LedgerResult<TxHash>;

    /// Wait for a submitted transaction to reach finality.
    ///
    /// A call the ledger refused still confirms, with a reverted receipt.
    async fn confirm(&self, tx: &TxHash) -> LedgerResult<Receipt>;
}
