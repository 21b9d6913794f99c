//! Error taxonomy shared by the ledger, its transports and the client.
//!
//! `LedgerError` is serializable so a reverted transaction or a rejected
//! read can travel over RPC unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::address::Address;
use crate::hash::TxHash;
use crate::proposal::{CandidateId, ProposalId, ProposalStatus};
use crate::time::Timestamp;

/// A lifecycle operation, named in transition errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Start,
    Close,
    Cancel,
    Vote,
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Close => "close",
            Self::Cancel => "cancel",
            Self::Vote => "vote on",
        })
    }
}

/// Coarse failure classes reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    InvalidTransition,
    Unauthorized,
    AlreadyVoted,
    NoSigner,
    CollaboratorUnavailable,
}

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("proposal {proposal} has no candidate {candidate}")]
    UnknownCandidate {
        proposal: ProposalId,
        candidate: CandidateId,
    },

    #[error("cannot {action} a proposal that is {status}")]
    InvalidTransition {
        status: ProposalStatus,
        action: LifecycleAction,
    },

    #[error("voting ended at {0}")]
    VotingEnded(Timestamp),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("{voter} has already voted on proposal {proposal}")]
    AlreadyVoted { proposal: ProposalId, voter: Address },

    #[error("transaction {0} is not known to the ledger")]
    UnknownTransaction(TxHash),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The request reached the ledger but its answer did not come back, so
    /// any effect it had is unknown.
    #[error("ledger reply lost: {0}")]
    ReplyLost(String),
}

impl LedgerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::ProposalNotFound(_) | Self::UnknownCandidate { .. } => {
                ErrorKind::Validation
            }
            Self::InvalidTransition { .. } | Self::VotingEnded(_) => ErrorKind::InvalidTransition,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::AlreadyVoted { .. } => ErrorKind::AlreadyVoted,
            Self::UnknownTransaction(_) | Self::Unavailable(_) | Self::ReplyLost(_) => {
                ErrorKind::CollaboratorUnavailable
            }
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_serialize_with_kind_tag() {
        let err = LedgerError::InvalidTransition {
            status: ProposalStatus::Closed,
            action: LifecycleAction::Vote,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "invalid_transition");
        assert_eq!(json["detail"]["status"], "closed");
        let back: LedgerError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn display_is_human_readable() {
        let err = LedgerError::InvalidTransition {
            status: ProposalStatus::Closed,
            action: LifecycleAction::Vote,
        };
        assert_eq!(err.to_string(), "cannot vote on a proposal that is closed");
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            LedgerError::VotingEnded(Timestamp::new(1)).kind(),
            ErrorKind::InvalidTransition
        );
        assert_eq!(
            LedgerError::ProposalNotFound(ProposalId(9)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::Unavailable("down".into()).kind(),
            ErrorKind::CollaboratorUnavailable
        );
        assert_eq!(
            LedgerError::ReplyLost("reset".into()).kind(),
            ErrorKind::CollaboratorUnavailable
        );
    }
}
