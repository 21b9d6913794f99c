//! Structured results for application-level writes.

use ballot_types::{ErrorKind, ProposalId, TxHash};
use serde::Serialize;

use crate::error::ClientError;
use crate::handle::Confirmation;

/// What happened to a write, in a form a caller can show without further
/// interpretation. Failures are reported here, never swallowed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<ProposalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zkp_configuration: Option<String>,
}

impl ActionOutcome {
    pub fn confirmed(message: impl Into<String>, confirmation: &Confirmation) -> Self {
        Self {
            success: true,
            message: message.into(),
            kind: None,
            tx_hash: Some(confirmation.tx_hash),
            proposal_id: confirmation.proposal_id,
            zkp_configuration: None,
        }
    }

    pub fn failed(error: &ClientError) -> Self {
        let tx_hash = match error {
            ClientError::OutcomeUnknown { tx_hash, .. } => Some(*tx_hash),
            _ => None,
        };
        Self {
            success: false,
            message: failure_message(error),
            kind: Some(error.kind()),
            tx_hash,
            proposal_id: None,
            zkp_configuration: None,
        }
    }

    pub fn with_zkp_configuration(mut self, config: impl Into<String>) -> Self {
        self.zkp_configuration = Some(config.into());
        self
    }
}

fn failure_message(error: &ClientError) -> String {
    match error {
        ClientError::NoSigner => "Wallet not connected.".to_string(),
        ClientError::Ledger(e) if e.kind() != ErrorKind::CollaboratorUnavailable => {
            format!("Transaction failed: {e}")
        }
        ClientError::OutcomeUnknown { tx_hash, reason } => format!(
            "Transaction {tx_hash} was submitted but its outcome is unknown ({reason}). Check before retrying."
        ),
        ClientError::SubmitUnknown { method, reason } => format!(
            "The {method} transaction may have been submitted but its outcome is unknown ({reason}). Check before retrying."
        ),
        other => other.to_string(),
    }
}
