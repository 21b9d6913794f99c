//! Ledger handles.
//!
//! A [`ReadHandle`] carries no identity and only reads. A [`WriteHandle`] is
//! bound to a signing identity; each state-changing call returns a
//! [`PendingTx`] immediately, and nothing has happened until
//! [`PendingTx::wait`] reports it confirmed.

use std::sync::Arc;

use ballot_ledger::LedgerContract;
use ballot_types::{
    Address, Candidate, CandidateId, CandidateTally, LedgerCall, LedgerError, LedgerResult,
    NewProposal, Proposal, ProposalId, ProposalRecord, TxHash, TxStatus,
};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// Read-only access to the ledger.
#[derive(Clone)]
pub struct ReadHandle {
    ledger: Arc<dyn LedgerContract>,
}

impl ReadHandle {
    pub(crate) fn new(ledger: Arc<dyn LedgerContract>) -> Self {
        Self { ledger }
    }

    pub async fn proposal_count(&self) -> LedgerResult<u64> {
        self.ledger.proposal_count().await
    }

    pub async fn proposal_record(&self, id: ProposalId) -> LedgerResult<ProposalRecord> {
        self.ledger.proposal(id).await
    }

    pub async fn candidates(&self, id: ProposalId) -> LedgerResult<Vec<Candidate>> {
        self.ledger.proposal_candidates(id).await
    }

    /// A proposal with its candidates attached.
    pub async fn proposal(&self, id: ProposalId) -> LedgerResult<Proposal> {
        let record = self.ledger.proposal(id).await?;
        let candidates = self.ledger.proposal_candidates(id).await?;
        Ok(Proposal::from_record(record, candidates))
    }

    pub async fn results(&self, id: ProposalId) -> LedgerResult<Vec<CandidateTally>> {
        self.ledger.proposal_results(id).await
    }

    pub async fn has_voted(&self, id: ProposalId, voter: &Address) -> LedgerResult<bool> {
        self.ledger.has_voted(id, voter).await
    }
}

/// Access to the ledger on behalf of a signing identity.
#[derive(Clone)]
pub struct WriteHandle {
    ledger: Arc<dyn LedgerContract>,
    signer: Address,
}

impl WriteHandle {
    pub(crate) fn new(ledger: Arc<dyn LedgerContract>, signer: Address) -> Self {
        Self { ledger, signer }
    }

    /// The identity every call from this handle is submitted as.
    pub fn signer(&self) -> &Address {
        &self.signer
    }

    pub fn reader(&self) -> ReadHandle {
        ReadHandle::new(Arc::clone(&self.ledger))
    }

    pub async fn create_proposal(&self, proposal: NewProposal) -> ClientResult<PendingTx> {
        self.submit(LedgerCall::CreateProposal(proposal)).await
    }

    pub async fn start_proposal(&self, id: ProposalId, duration_days: u32) -> ClientResult<PendingTx> {
        self.submit(LedgerCall::StartProposal { id, duration_days }).await
    }

    pub async fn close_proposal(&self, id: ProposalId) -> ClientResult<PendingTx> {
        self.submit(LedgerCall::CloseProposal { id }).await
    }

    pub async fn cancel_proposal(&self, id: ProposalId) -> ClientResult<PendingTx> {
        self.submit(LedgerCall::CancelProposal { id }).await
    }

    pub async fn vote(&self, proposal_id: ProposalId, candidate_id: CandidateId) -> ClientResult<PendingTx> {
        self.submit(LedgerCall::Vote {
            proposal_id,
            candidate_id,
        })
        .await
    }

    /// Submit once. Never retried: a resubmission could apply twice.
    ///
    /// A reply lost after the request was delivered is
    /// [`ClientError::SubmitUnknown`], not a plain failure.
    async fn submit(&self, call: LedgerCall) -> ClientResult<PendingTx> {
        let method = call.method();
        let hash = match self.ledger.submit(&self.signer, call).await {
            Ok(hash) => hash,
            Err(LedgerError::ReplyLost(reason)) => {
                warn!(method, signer = %self.signer, %reason, "submission reply lost");
                return Err(ClientError::SubmitUnknown { method, reason });
            }
            Err(e) => return Err(e.into()),
        };
        debug!(%hash, method, signer = %self.signer, "transaction submitted");
        Ok(PendingTx {
            hash,
            method,
            ledger: Arc::clone(&self.ledger),
        })
    }
}

/// The durable effect of a confirmed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block: u64,
    /// Set for proposal creation.
    pub proposal_id: Option<ProposalId>,
}

/// A submitted transaction whose outcome is not yet known.
#[must_use = "a submitted transaction has no known effect until it is awaited"]
pub struct PendingTx {
    hash: TxHash,
    method: &'static str,
    ledger: Arc<dyn LedgerContract>,
}

impl PendingTx {
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Wait for finality.
    ///
    /// A reverted receipt becomes the ledger's error. Failing to observe the
    /// receipt at all is [`ClientError::OutcomeUnknown`].
    pub async fn wait(self) -> ClientResult<Confirmation> {
        let receipt = match self.ledger.confirm(&self.hash).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(hash = %self.hash, method = self.method, error = %e, "confirmation not observed");
                return Err(ClientError::OutcomeUnknown {
                    tx_hash: self.hash,
                    reason: e.to_string(),
                });
            }
        };
        match receipt.status {
            TxStatus::Applied { proposal_id } => Ok(Confirmation {
                tx_hash: receipt.tx_hash,
                block: receipt.block,
                proposal_id,
            }),
            TxStatus::Reverted { error } => {
                debug!(hash = %self.hash, method = self.method, %error, "transaction reverted");
                Err(ClientError::Ledger(error))
            }
        }
    }
}
