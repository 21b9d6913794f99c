//! State-changing ledger calls and their receipts.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::hash::TxHash;
use crate::proposal::{CandidateId, NewProposal, ProposalId};

/// A state-changing call submitted to the ledger as a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum LedgerCall {
    CreateProposal(NewProposal),
    StartProposal {
        id: ProposalId,
        duration_days: u32,
    },
    CloseProposal {
        id: ProposalId,
    },
    CancelProposal {
        id: ProposalId,
    },
    Vote {
        proposal_id: ProposalId,
        candidate_id: CandidateId,
    },
}

impl LedgerCall {
    /// Method name, for logs and metrics.
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateProposal(_) => "create_proposal",
            Self::StartProposal { .. } => "start_proposal",
            Self::CloseProposal { .. } => "close_proposal",
            Self::CancelProposal { .. } => "cancel_proposal",
            Self::Vote { .. } => "vote",
        }
    }
}

/// Final outcome of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TxStatus {
    /// The call took effect. Creation reports the new proposal's id.
    Applied { proposal_id: Option<ProposalId> },
    /// The call was mined but the ledger refused it; no state changed.
    Reverted { error: LedgerError },
}

/// Receipt of a confirmed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block: u64,
    pub status: TxStatus,
}

impl Receipt {
    pub fn is_applied(&self) -> bool {
        matches!(self.status, TxStatus::Applied { .. })
    }
}
