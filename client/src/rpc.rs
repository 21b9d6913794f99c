//! JSON-RPC transport to a ledger node.
//!
//! A failure before the node could have acted on a request (connecting, a
//! non-success HTTP status) is [`LedgerError::Unavailable`]. A failure after
//! the request was delivered (a reset mid-reply, an undecodable body) is
//! [`LedgerError::ReplyLost`], since the node may already have applied it.

use std::time::Duration;

use async_trait::async_trait;
use ballot_ledger::LedgerContract;
use ballot_types::{
    Address, Candidate, CandidateTally, LedgerCall, LedgerError, LedgerResult, ProposalId,
    ProposalRecord, Receipt, RpcRequest, RpcResponse, TxHash,
};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{ClientError, ClientResult};

/// HTTP client for a ledger node.
///
/// Only the connect phase is bounded; a confirmation wait lasts as long as
/// the node takes to answer.
#[derive(Clone)]
pub struct RpcLedger {
    http: reqwest::Client,
    url: String,
}

impl RpcLedger {
    pub fn new(url: impl Into<String>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, request: RpcRequest) -> LedgerResult<T> {
        let action = request.action();
        trace!(action, url = %self.url, "rpc call");

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_builder() {
                    LedgerError::Unavailable(format!("{action}: request failed: {e}"))
                } else {
                    LedgerError::ReplyLost(format!("{action}: request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "{action}: node returned HTTP {}",
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::ReplyLost(format!("{action}: invalid response: {e}")))?;

        match body {
            RpcResponse::Result(value) => serde_json::from_value(value).map_err(|e| {
                LedgerError::ReplyLost(format!("{action}: unexpected result shape: {e}"))
            }),
            RpcResponse::Error(error) => Err(error),
        }
    }
}

#[async_trait]
impl LedgerContract for RpcLedger {
    async fn proposal_count(&self) -> LedgerResult<u64> {
        self.call(RpcRequest::ProposalCount).await
    }

    async fn proposal(&self, id: ProposalId) -> LedgerResult<ProposalRecord> {
        self.call(RpcRequest::Proposal { id }).await
    }

    async fn proposal_candidates(&self, id: ProposalId) -> LedgerResult<Vec<Candidate>> {
        self.call(RpcRequest::ProposalCandidates { id }).await
    }

    async fn proposal_results(&self, id: ProposalId) -> LedgerResult<Vec<CandidateTally>> {
        self.call(RpcRequest::ProposalResults { id }).await
    }

    async fn has_voted(&self, id: ProposalId, voter: &Address) -> LedgerResult<bool> {
        self.call(RpcRequest::HasVoted {
            id,
            address: voter.clone(),
        })
        .await
    }

    async fn submit(&self, from: &Address, call: LedgerCall) -> LedgerResult<TxHash> {
        self.call(RpcRequest::Submit {
            from: from.clone(),
            call,
        })
        .await
    }

    async fn confirm(&self, tx: &TxHash) -> LedgerResult<Receipt> {
        self.call(RpcRequest::Confirm { hash: *tx }).await
    }
}
