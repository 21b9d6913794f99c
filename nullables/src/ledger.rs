//! Nullable ledger transports.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ballot_ledger::LedgerContract;
use ballot_types::{
    Address, Candidate, CandidateTally, LedgerCall, LedgerError, LedgerResult, ProposalId,
    ProposalRecord, Receipt, TxHash,
};

/// A ledger that cannot be reached: every call fails `Unavailable`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnreachableLedger;

fn unreachable() -> LedgerError {
    LedgerError::Unavailable("null ledger is unreachable".into())
}

#[async_trait]
impl LedgerContract for UnreachableLedger {
    async fn proposal_count(&self) -> LedgerResult<u64> {
        Err(unreachable())
    }

    async fn proposal(&self, _id: ProposalId) -> LedgerResult<ProposalRecord> {
        Err(unreachable())
    }

    async fn proposal_candidates(&self, _id: ProposalId) -> LedgerResult<Vec<Candidate>> {
        Err(unreachable())
    }

    async fn proposal_results(&self, _id: ProposalId) -> LedgerResult<Vec<CandidateTally>> {
        Err(unreachable())
    }

    async fn has_voted(&self, _id: ProposalId, _voter: &Address) -> LedgerResult<bool> {
        Err(unreachable())
    }

    async fn submit(&self, _from: &Address, _call: LedgerCall) -> LedgerResult<TxHash> {
        Err(unreachable())
    }

    async fn confirm(&self, _tx: &TxHash) -> LedgerResult<Receipt> {
        Err(unreachable())
    }
}

/// Wraps a real ledger, counting submissions and optionally losing the
/// connection on reads, on submission replies or before confirmation.
pub struct FlakyLedger {
    inner: Arc<dyn LedgerContract>,
    submits: AtomicUsize,
    drop_confirms: AtomicBool,
    drop_reads: AtomicBool,
    drop_submit_replies: AtomicBool,
    overstate_count: AtomicBool,
}

impl FlakyLedger {
    pub fn new(inner: Arc<dyn LedgerContract>) -> Self {
        Self {
            inner,
            submits: AtomicUsize::new(0),
            drop_confirms: AtomicBool::new(false),
            drop_reads: AtomicBool::new(false),
            drop_submit_replies: AtomicBool::new(false),
            overstate_count: AtomicBool::new(false),
        }
    }

    /// Submissions still reach the ledger, but their confirmations are lost.
    pub fn drop_confirms(&self, on: bool) {
        self.drop_confirms.store(on, Ordering::SeqCst);
    }

    pub fn drop_reads(&self, on: bool) {
        self.drop_reads.store(on, Ordering::SeqCst);
    }

    /// Submissions are queued by the ledger, but the hash never comes back.
    pub fn drop_submit_replies(&self, on: bool) {
        self.drop_submit_replies.store(on, Ordering::SeqCst);
    }

    /// Report `u64::MAX` proposals, as a misbehaving node might.
    pub fn overstate_count(&self, on: bool) {
        self.overstate_count.store(on, Ordering::SeqCst);
    }

    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    fn read_guard(&self) -> LedgerResult<()> {
        if self.drop_reads.load(Ordering::SeqCst) {
            Err(unreachable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LedgerContract for FlakyLedger {
    async fn proposal_count(&self) -> LedgerResult<u64> {
        self.read_guard()?;
        if self.overstate_count.load(Ordering::SeqCst) {
            return Ok(u64::MAX);
        }
        self.inner.proposal_count().await
    }

    async fn proposal(&self, id: ProposalId) -> LedgerResult<ProposalRecord> {
        self.read_guard()?;
        self.inner.proposal(id).await
    }

    async fn proposal_candidates(&self, id: ProposalId) -> LedgerResult<Vec<Candidate>> {
        self.read_guard()?;
        self.inner.proposal_candidates(id).await
    }

    async fn proposal_results(&self, id: ProposalId) -> LedgerResult<Vec<CandidateTally>> {
        self.read_guard()?;
        self.inner.proposal_results(id).await
    }

    async fn has_voted(&self, id: ProposalId, voter: &Address) -> LedgerResult<bool> {
        self.read_guard()?;
        self.inner.has_voted(id, voter).await
    }

    async fn submit(&self, from: &Address, call: LedgerCall) -> LedgerResult<TxHash> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        let hash = self.inner.submit(from, call).await?;
        if self.drop_submit_replies.load(Ordering::SeqCst) {
            return Err(LedgerError::ReplyLost(format!(
                "connection reset before {hash} was returned"
            )));
        }
        Ok(hash)
    }

    async fn confirm(&self, tx: &TxHash) -> LedgerResult<Receipt> {
        if self.drop_confirms.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("connection lost while confirming".into()));
        }
        self.inner.confirm(tx).await
    }
}
