//! JSON-RPC envelopes spoken between the client transport and the ledger node.
//!
//! Requests are JSON objects tagged by `action`; responses carry either a
//! `result` or a structured `error`.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::call::LedgerCall;
use crate::error::LedgerError;
use crate::hash::TxHash;
use crate::proposal::ProposalId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RpcRequest {
    ProposalCount,
    Proposal { id: ProposalId },
    ProposalCandidates { id: ProposalId },
    ProposalResults { id: ProposalId },
    HasVoted { id: ProposalId, address: Address },
    Submit { from: Address, call: LedgerCall },
    Confirm { hash: TxHash },
}

impl RpcRequest {
    /// Action name, for logs and metrics.
    pub fn action(&self) -> &'static str {
        match self {
            Self::ProposalCount => "proposal_count",
            Self::Proposal { .. } => "proposal",
            Self::ProposalCandidates { .. } => "proposal_candidates",
            Self::ProposalResults { .. } => "proposal_results",
            Self::HasVoted { .. } => "has_voted",
            Self::Submit { .. } => "submit",
            Self::Confirm { .. } => "confirm",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcResponse {
    Result(serde_json::Value),
    Error(LedgerError),
}
