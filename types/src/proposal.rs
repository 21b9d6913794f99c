//! Proposals, candidates and result rows.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;
use crate::time::Timestamp;

/// Ledger-assigned proposal identifier (monotonic from 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Candidate identifier, unique within its proposal (its creation index).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a proposal.
///
/// `Pending → Active → Closed`, or `Pending → Cancelled`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Active,
    Closed,
    Cancelled,
}

impl ProposalStatus {
    /// Integer encoding used by the ledger.
    pub fn code(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Active => 1,
            Self::Closed => 2,
            Self::Cancelled => 3,
        }
    }

    /// Decode a ledger status. Unknown codes fall back to `Pending`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Active,
            2 => Self::Closed,
            3 => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    /// No further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }

    /// Listing order: active first, then pending, closed, cancelled.
    pub fn display_rank(&self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Pending => 1,
            Self::Closed => 2,
            Self::Cancelled => 3,
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named option on a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
}

/// The raw proposal record as the ledger returns it.
///
/// `status` is the integer code and `end_time` is [`Timestamp::EPOCH`] until
/// the proposal has been started.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub status: u8,
    pub duration_days: u32,
    pub end_time: Timestamp,
    pub creator: Address,
    pub zkp_configuration: String,
}

/// A proposal rehydrated for the application: typed status, candidates attached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub candidates: Vec<Candidate>,
    pub status: ProposalStatus,
    pub duration_days: u32,
    pub end_date: Option<Timestamp>,
    pub creator: Address,
    pub zkp_configuration: String,
}

impl Proposal {
    /// Combine a ledger record with its candidate list.
    pub fn from_record(record: ProposalRecord, candidates: Vec<Candidate>) -> Self {
        let end_date = (record.end_time != Timestamp::EPOCH).then_some(record.end_time);
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            candidates,
            status: ProposalStatus::from_code(record.status),
            duration_days: record.duration_days,
            end_date,
            creator: record.creator,
            zkp_configuration: record.zkp_configuration,
        }
    }

    /// Look up a candidate by id.
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }
}

/// Input to proposal creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub candidate_names: Vec<String>,
    pub duration_days: u32,
    pub zkp_configuration: String,
}

/// One row of the ledger's results query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
    pub name: String,
    pub vote_count: u64,
}

/// One row of a proposal's results, resolved to its candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub candidate_id: CandidateId,
    pub name: String,
    pub votes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for status in [
            ProposalStatus::Pending,
            ProposalStatus::Active,
            ProposalStatus::Closed,
            ProposalStatus::Cancelled,
        ] {
            assert_eq!(ProposalStatus::from_code(status.code()), status);
        }
    }

    #[test]
    fn unknown_status_code_maps_to_pending() {
        assert_eq!(ProposalStatus::from_code(4), ProposalStatus::Pending);
        assert_eq!(ProposalStatus::from_code(255), ProposalStatus::Pending);
    }

    #[test]
    fn record_without_end_time_has_no_end_date() {
        let record = ProposalRecord {
            id: ProposalId(3),
            title: "Budget".into(),
            description: "Raise the budget".into(),
            status: 0,
            duration_days: 7,
            end_time: Timestamp::EPOCH,
            creator: Address::from_seed(1),
            zkp_configuration: String::new(),
        };
        let proposal = Proposal::from_record(record.clone(), Vec::new());
        assert_eq!(proposal.end_date, None);
        assert_eq!(proposal.status, ProposalStatus::Pending);

        let started = ProposalRecord {
            status: 1,
            end_time: Timestamp::new(500),
            ..record
        };
        let proposal = Proposal::from_record(started, Vec::new());
        assert_eq!(proposal.end_date, Some(Timestamp::new(500)));
        assert_eq!(proposal.status, ProposalStatus::Active);
    }
}
