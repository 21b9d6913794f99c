//! Application reads.
//!
//! Every read failure is logged and degrades to an empty, absent or negative
//! answer so a caller's view stays usable. The next poll simply tries again.

use ballot_types::{
    Address, CandidateId, LedgerError, Proposal, ProposalId, ProposalStatus, ResultRow,
};
use tracing::warn;

use crate::handle::ReadHandle;

/// Upper bound on the ids a single listing walks.
pub const MAX_LISTED_PROPOSALS: u64 = 10_000;

/// All proposals, active first, then pending, closed and cancelled.
///
/// Ids are dense from zero, so the walk stops at the first id the ledger
/// does not know even if the reported count is larger.
pub async fn list_proposals(read: &ReadHandle) -> Vec<Proposal> {
    let count = match read.proposal_count().await {
        Ok(count) => count,
        Err(e) => {
            warn!(error = %e, "failed to fetch proposal count");
            return Vec::new();
        }
    };

    if count > MAX_LISTED_PROPOSALS {
        warn!(count, limit = MAX_LISTED_PROPOSALS, "ledger reports more proposals than will be listed");
    }

    let mut proposals = Vec::new();
    for id in (0..count.min(MAX_LISTED_PROPOSALS)).map(ProposalId) {
        match read.proposal(id).await {
            Ok(proposal) => proposals.push(proposal),
            Err(LedgerError::ProposalNotFound(_)) => {
                warn!(%id, count, "proposal count overstated; stopping");
                break;
            }
            Err(e) => warn!(%id, error = %e, "failed to fetch proposal"),
        }
    }
    proposals.sort_by_key(|p| p.status.display_rank());
    proposals
}

pub async fn find_proposal(read: &ReadHandle, id: ProposalId) -> Option<Proposal> {
    match read.proposal(id).await {
        Ok(proposal) => Some(proposal),
        Err(e) => {
            warn!(%id, error = %e, "failed to fetch proposal");
            None
        }
    }
}

pub async fn proposals_by_creator(read: &ReadHandle, creator: &Address) -> Vec<Proposal> {
    list_proposals(read)
        .await
        .into_iter()
        .filter(|p| &p.creator == creator)
        .collect()
}

pub async fn active_proposals(read: &ReadHandle) -> Vec<Proposal> {
    with_status(read, ProposalStatus::Active).await
}

/// Closed proposals, whose results are final.
pub async fn past_proposals(read: &ReadHandle) -> Vec<Proposal> {
    with_status(read, ProposalStatus::Closed).await
}

async fn with_status(read: &ReadHandle, status: ProposalStatus) -> Vec<Proposal> {
    list_proposals(read)
        .await
        .into_iter()
        .filter(|p| p.status == status)
        .collect()
}

/// Current tallies. The ledger returns them in candidate order, so each row's
/// position is its candidate id.
pub async fn fetch_results(read: &ReadHandle, id: ProposalId) -> Vec<ResultRow> {
    match read.results(id).await {
        Ok(tallies) => tallies
            .into_iter()
            .enumerate()
            .map(|(index, tally)| ResultRow {
                candidate_id: CandidateId(index as u64),
                name: tally.name,
                votes: tally.vote_count,
            })
            .collect(),
        Err(e) => {
            warn!(%id, error = %e, "failed to fetch results");
            Vec::new()
        }
    }
}

pub async fn fetch_has_voted(read: &ReadHandle, id: ProposalId, voter: &Address) -> bool {
    match read.has_voted(id, voter).await {
        Ok(voted) => voted,
        Err(e) => {
            warn!(%id, %voter, error = %e, "failed to check vote status");
            false
        }
    }
}
