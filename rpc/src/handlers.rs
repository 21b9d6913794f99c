//! RPC request handlers.
//!
//! A request maps one-to-one onto a [`LedgerContract`] call. Ledger errors
//! are answered in the response body, not as HTTP failures, so the client
//! can tell a refusal from an unreachable node.

use ballot_ledger::LedgerContract;
use ballot_types::{LedgerError, LedgerResult, RpcRequest, RpcResponse};
use serde_json::Value;

pub async fn dispatch(ledger: &dyn LedgerContract, request: RpcRequest) -> RpcResponse {
    let result = match request {
        RpcRequest::ProposalCount => to_value(ledger.proposal_count().await),
        RpcRequest::Proposal { id } => to_value(ledger.proposal(id).await),
        RpcRequest::ProposalCandidates { id } => to_value(ledger.proposal_candidates(id).await),
        RpcRequest::ProposalResults { id } => to_value(ledger.proposal_results(id).await),
        RpcRequest::HasVoted { id, address } => to_value(ledger.has_voted(id, &address).await),
        RpcRequest::Submit { from, call } => to_value(ledger.submit(&from, call).await),
        RpcRequest::Confirm { hash } => to_value(ledger.confirm(&hash).await),
    };
    match result {
        Ok(value) => RpcResponse::Result(value),
        Err(error) => RpcResponse::Error(error),
    }
}

/// Parse a raw request body.
pub fn parse(body: &[u8]) -> Result<RpcRequest, LedgerError> {
    serde_json::from_slice(body)
        .map_err(|e| LedgerError::Validation(format!("malformed request: {e}")))
}

fn to_value<T: serde::Serialize>(result: LedgerResult<T>) -> LedgerResult<Value> {
    result.and_then(|v| {
        serde_json::to_value(v).map_err(|e| LedgerError::Unavailable(format!("encoding: {e}")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_ledger::{LedgerConfig, MemoryLedger};
    use ballot_types::{ErrorKind, ProposalId};

    #[tokio::test]
    async fn missing_proposal_is_an_error_body() {
        let ledger = MemoryLedger::new(LedgerConfig::default());
        let response = dispatch(&ledger, RpcRequest::Proposal { id: ProposalId(4) }).await;
        match response {
            RpcResponse::Error(e) => assert_eq!(e.kind(), ErrorKind::Validation),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn count_is_a_plain_number() {
        let ledger = MemoryLedger::new(LedgerConfig::default());
        let response = dispatch(&ledger, RpcRequest::ProposalCount).await;
        assert_eq!(response, RpcResponse::Result(serde_json::json!(0)));
    }

    #[test]
    fn garbage_body_is_a_validation_error() {
        let err = parse(b"{\"action\":\"teleport\"}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(parse(br#"{"action":"proposal_count"}"#).is_ok());
    }
}
