use ballot_types::{ErrorKind, LedgerError, TxHash};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no wallet connected")]
    NoSigner,

    /// The ledger refused the call, either at submission or in a reverted receipt.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Submitted, but confirmation could not be observed. The call may or may
    /// not have been applied.
    #[error("outcome of transaction {tx_hash} is unknown: {reason}")]
    OutcomeUnknown { tx_hash: TxHash, reason: String },

    /// The submission reached the ledger but no hash came back. The call may
    /// be queued or already applied.
    #[error("`{method}` submission may have reached the ledger but its reply was lost: {reason}")]
    SubmitUnknown { method: &'static str, reason: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("an identical `{0}` submission is already in flight")]
    SubmitInFlight(String),

    #[error("config assistant failed: {0}")]
    Assistant(String),

    #[error("config error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSigner => ErrorKind::NoSigner,
            Self::Ledger(e) => e.kind(),
            Self::Validation(_) | Self::SubmitInFlight(_) | Self::Config(_) => {
                ErrorKind::Validation
            }
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::OutcomeUnknown { .. } | Self::SubmitUnknown { .. } | Self::Assistant(_) => {
                ErrorKind::CollaboratorUnavailable
            }
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::{Address, ProposalId};

    #[test]
    fn ledger_errors_keep_their_kind() {
        let err: ClientError = LedgerError::AlreadyVoted {
            proposal: ProposalId(1),
            voter: Address::from_seed(3),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::AlreadyVoted);
        assert_eq!(ClientError::NoSigner.kind(), ErrorKind::NoSigner);
    }

    #[test]
    fn unknown_outcome_is_not_a_success_kind() {
        let err = ClientError::OutcomeUnknown {
            tx_hash: TxHash::new([1; 32]),
            reason: "connection reset".into(),
        };
        assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
        assert!(err.to_string().contains("unknown"));
    }
}
