//! The proposal book: every proposal, its tallies and who has voted.
//!
//! This is the lifecycle state machine the rest of the workspace assumes of
//! its ledger:
//!
//! ```text
//! Pending ──start──▶ Active ──close──▶ Closed
//!    │
//!    └──cancel──▶ Cancelled
//! ```
//!
//! Every mutating method validates all of its preconditions before touching
//! any state, so a rejected call leaves the book exactly as it was. A vote
//! bumps the candidate's tally and records the voter in the same `&mut self`
//! step.

use std::collections::BTreeSet;

use ballot_types::{
    Address, Candidate, CandidateId, CandidateTally, LedgerCall, LedgerError, LedgerResult,
    LifecycleAction, NewProposal, ProposalId, ProposalRecord, ProposalStatus, Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LedgerConfig;

/// Minimum number of candidates on a proposal.
pub const MIN_CANDIDATES: usize = 2;

/// A proposal as the ledger stores it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerProposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    /// Candidate names; a candidate's id is its index here.
    pub candidates: Vec<String>,
    pub status: ProposalStatus,
    pub duration_days: u32,
    pub end_time: Option<Timestamp>,
    pub creator: Address,
    pub zkp_configuration: String,
    pub created_at: Timestamp,
    /// Parallel to `candidates`.
    tallies: Vec<u64>,
    voters: BTreeSet<Address>,
}

impl LedgerProposal {
    pub fn record(&self) -> ProposalRecord {
        ProposalRecord {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.code(),
            duration_days: self.duration_days,
            end_time: self.end_time.unwrap_or(Timestamp::EPOCH),
            creator: self.creator.clone(),
            zkp_configuration: self.zkp_configuration.clone(),
        }
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.candidates
            .iter()
            .enumerate()
            .map(|(i, name)| Candidate {
                id: CandidateId(i as u64),
                name: name.clone(),
            })
            .collect()
    }

    pub fn tallies(&self) -> Vec<CandidateTally> {
        self.candidates
            .iter()
            .zip(&self.tallies)
            .map(|(name, &vote_count)| CandidateTally {
                name: name.clone(),
                vote_count,
            })
            .collect()
    }

    pub fn total_votes(&self) -> u64 {
        self.tallies.iter().sum()
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains(voter)
    }

    fn require_status(&self, expected: ProposalStatus, action: LifecycleAction) -> LedgerResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(LedgerError::InvalidTransition {
                status: self.status,
                action,
            })
        }
    }
}

/// All proposals held by one ledger, plus the policy it enforces.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalBook {
    config: LedgerConfig,
    proposals: Vec<LedgerProposal>,
}

impl ProposalBook {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            proposals: Vec::new(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Replace the policy, keeping every proposal.
    pub fn set_config(&mut self, config: LedgerConfig) {
        self.config = config;
    }

    pub fn count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn get(&self, id: ProposalId) -> LedgerResult<&LedgerProposal> {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.proposals.get(idx))
            .ok_or(LedgerError::ProposalNotFound(id))
    }

    fn get_mut(&mut self, id: ProposalId) -> LedgerResult<&mut LedgerProposal> {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.proposals.get_mut(idx))
            .ok_or(LedgerError::ProposalNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerProposal> {
        self.proposals.iter()
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn record(&self, id: ProposalId) -> LedgerResult<ProposalRecord> {
        self.get(id).map(LedgerProposal::record)
    }

    pub fn candidates(&self, id: ProposalId) -> LedgerResult<Vec<Candidate>> {
        self.get(id).map(LedgerProposal::candidates)
    }

    /// Current tally per candidate; valid in every state.
    pub fn results(&self, id: ProposalId) -> LedgerResult<Vec<CandidateTally>> {
        self.get(id).map(LedgerProposal::tallies)
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> LedgerResult<bool> {
        self.get(id).map(|p| p.has_voted(voter))
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Create a proposal in `Pending`.
    pub fn create(
        &mut self,
        creator: &Address,
        proposal: NewProposal,
        now: Timestamp,
    ) -> LedgerResult<ProposalId> {
        let title = proposal.title.trim();
        let description = proposal.description.trim();
        if title.is_empty() {
            return Err(LedgerError::Validation("title must not be empty".into()));
        }
        if description.is_empty() {
            return Err(LedgerError::Validation("description must not be empty".into()));
        }
        if proposal.candidate_names.len() < MIN_CANDIDATES {
            return Err(LedgerError::Validation(format!(
                "a proposal needs at least {MIN_CANDIDATES} candidates, got {}",
                proposal.candidate_names.len()
            )));
        }
        let candidates: Vec<String> = proposal
            .candidate_names
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        if let Some(pos) = candidates.iter().position(String::is_empty) {
            return Err(LedgerError::Validation(format!("candidate {pos} has an empty name")));
        }
        if proposal.duration_days == 0 {
            return Err(LedgerError::Validation("duration must be at least one day".into()));
        }

        let id = ProposalId(self.count());
        let tallies = vec![0; candidates.len()];
        self.proposals.push(LedgerProposal {
            id,
            title: title.to_string(),
            description: description.to_string(),
            candidates,
            status: ProposalStatus::Pending,
            duration_days: proposal.duration_days,
            end_time: None,
            creator: creator.clone(),
            zkp_configuration: proposal.zkp_configuration,
            created_at: now,
            tallies,
            voters: BTreeSet::new(),
        });
        debug!(%id, %creator, "proposal created");
        Ok(id)
    }

    /// `Pending → Active`; the end date becomes `now + duration_days`.
    pub fn start(
        &mut self,
        caller: &Address,
        id: ProposalId,
        duration_days: u32,
        now: Timestamp,
    ) -> LedgerResult<Timestamp> {
        self.require_operator(caller, LifecycleAction::Start)?;
        if duration_days == 0 {
            return Err(LedgerError::Validation("duration must be at least one day".into()));
        }
        let proposal = self.get_mut(id)?;
        proposal.require_status(ProposalStatus::Pending, LifecycleAction::Start)?;

        let end = now.plus_days(duration_days);
        proposal.status = ProposalStatus::Active;
        proposal.end_time = Some(end);
        debug!(%id, end = end.as_secs(), "proposal started");
        Ok(end)
    }

    /// `Active → Closed`; the tallies become final.
    pub fn close(&mut self, caller: &Address, id: ProposalId) -> LedgerResult<()> {
        self.require_operator(caller, LifecycleAction::Close)?;
        let proposal = self.get_mut(id)?;
        proposal.require_status(ProposalStatus::Active, LifecycleAction::Close)?;
        proposal.status = ProposalStatus::Closed;
        debug!(%id, total = proposal.total_votes(), "proposal closed");
        Ok(())
    }

    /// `Pending → Cancelled`, only by the proposal's creator.
    pub fn cancel(&mut self, caller: &Address, id: ProposalId) -> LedgerResult<()> {
        let proposal = self.get_mut(id)?;
        if &proposal.creator != caller {
            return Err(LedgerError::Unauthorized(format!(
                "only the creator of proposal {id} may cancel it"
            )));
        }
        proposal.require_status(ProposalStatus::Pending, LifecycleAction::Cancel)?;
        proposal.status = ProposalStatus::Cancelled;
        debug!(%id, "proposal cancelled");
        Ok(())
    }

    /// Record one vote. At most one vote per voter per proposal is accepted.
    pub fn vote(
        &mut self,
        voter: &Address,
        id: ProposalId,
        candidate: CandidateId,
        now: Timestamp,
    ) -> LedgerResult<()> {
        let accept_after_end = self.config.accept_votes_after_end;
        let proposal = self.get_mut(id)?;
        proposal.require_status(ProposalStatus::Active, LifecycleAction::Vote)?;
        if let Some(end) = proposal.end_time {
            if !accept_after_end && end.has_passed(now) {
                return Err(LedgerError::VotingEnded(end));
            }
        }
        let slot = usize::try_from(candidate.0)
            .ok()
            .filter(|&idx| idx < proposal.tallies.len())
            .ok_or(LedgerError::UnknownCandidate {
                proposal: id,
                candidate,
            })?;
        if proposal.voters.contains(voter) {
            return Err(LedgerError::AlreadyVoted {
                proposal: id,
                voter: voter.clone(),
            });
        }

        proposal.voters.insert(voter.clone());
        proposal.tallies[slot] += 1;
        debug!(%id, %candidate, "vote recorded");
        Ok(())
    }

    /// Apply a submitted call on behalf of `from`.
    ///
    /// Returns the new proposal's id for a creation, `None` otherwise.
    pub fn apply(
        &mut self,
        from: &Address,
        call: LedgerCall,
        now: Timestamp,
    ) -> LedgerResult<Option<ProposalId>> {
        match call {
            LedgerCall::CreateProposal(proposal) => self.create(from, proposal, now).map(Some),
            LedgerCall::StartProposal { id, duration_days } => {
                self.start(from, id, duration_days, now).map(|_| None)
            }
            LedgerCall::CloseProposal { id } => self.close(from, id).map(|_| None),
            LedgerCall::CancelProposal { id } => self.cancel(from, id).map(|_| None),
            LedgerCall::Vote {
                proposal_id,
                candidate_id,
            } => self.vote(from, proposal_id, candidate_id, now).map(|_| None),
        }
    }

    fn require_operator(&self, caller: &Address, action: LifecycleAction) -> LedgerResult<()> {
        if self.config.is_operator(caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(format!(
                "{caller} is not allowed to {action} proposals"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::SECS_PER_DAY;

    fn operator() -> Address {
        Address::from_seed(0xad)
    }

    fn creator() -> Address {
        Address::from_seed(0xc0)
    }

    fn voter(seed: u8) -> Address {
        Address::from_seed(seed)
    }

    fn book() -> ProposalBook {
        ProposalBook::new(LedgerConfig::with_operator(operator()))
    }

    fn yes_no(duration_days: u32) -> NewProposal {
        NewProposal {
            title: "Increase the treasury budget".into(),
            description: "Should we increase the treasury budget by 10%?".into(),
            candidate_names: vec!["Yes".into(), "No".into()],
            duration_days,
            zkp_configuration: "zkp:test".into(),
        }
    }

    fn active_proposal(book: &mut ProposalBook) -> ProposalId {
        let id = book.create(&creator(), yes_no(7), Timestamp::new(100)).unwrap();
        book.start(&operator(), id, 7, Timestamp::new(1_000)).unwrap();
        id
    }

    // ── Creation ─────────────────────────────────────────────────────────

    #[test]
    fn create_starts_pending_without_end_date() {
        let mut book = book();
        let id = book.create(&creator(), yes_no(7), Timestamp::new(100)).unwrap();
        let record = book.record(id).unwrap();
        assert_eq!(record.status, ProposalStatus::Pending.code());
        assert_eq!(record.end_time, Timestamp::EPOCH);
        assert_eq!(record.zkp_configuration, "zkp:test");
        assert_eq!(book.candidates(id).unwrap().len(), 2);
    }

    #[test]
    fn ids_are_assigned_sequentially() {
        let mut book = book();
        let a = book.create(&creator(), yes_no(7), Timestamp::new(1)).unwrap();
        let b = book.create(&creator(), yes_no(3), Timestamp::new(2)).unwrap();
        assert_eq!(a, ProposalId(0));
        assert_eq!(b, ProposalId(1));
        assert_eq!(book.count(), 2);
    }

    #[test]
    fn create_rejects_single_candidate() {
        let mut book = book();
        let mut proposal = yes_no(7);
        proposal.candidate_names = vec!["Only".into()];
        let err = book.create(&creator(), proposal, Timestamp::new(1)).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(book.count(), 0);
    }

    #[test]
    fn create_rejects_blank_fields() {
        let mut book = book();

        let mut blank_title = yes_no(7);
        blank_title.title = "   ".into();
        assert!(book.create(&creator(), blank_title, Timestamp::new(1)).is_err());

        let mut blank_candidate = yes_no(7);
        blank_candidate.candidate_names = vec!["Yes".into(), " ".into()];
        assert!(book.create(&creator(), blank_candidate, Timestamp::new(1)).is_err());

        assert!(book.create(&creator(), yes_no(0), Timestamp::new(1)).is_err());
        assert_eq!(book.count(), 0);
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    #[test]
    fn start_sets_end_date() {
        let mut book = book();
        let id = book.create(&creator(), yes_no(7), Timestamp::new(100)).unwrap();
        let end = book.start(&operator(), id, 7, Timestamp::new(1_000)).unwrap();
        assert_eq!(end.as_secs(), 1_000 + 7 * SECS_PER_DAY);
        let record = book.record(id).unwrap();
        assert_eq!(record.status, ProposalStatus::Active.code());
        assert_eq!(record.end_time, end);
    }

    #[test]
    fn start_requires_operator() {
        let mut book = book();
        let id = book.create(&creator(), yes_no(7), Timestamp::new(100)).unwrap();
        let err = book.start(&creator(), id, 7, Timestamp::new(1_000)).unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
        assert_eq!(book.record(id).unwrap().status, ProposalStatus::Pending.code());
    }

    #[test]
    fn start_twice_is_invalid() {
        let mut book = book();
        let id = active_proposal(&mut book);
        let err = book.start(&operator(), id, 7, Timestamp::new(2_000)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidTransition {
                status: ProposalStatus::Active,
                action: LifecycleAction::Start,
            }
        );
    }

    #[test]
    fn close_requires_operator() {
        let mut book = book();
        let id = active_proposal(&mut book);
        let err = book.close(&creator(), id).unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
        assert_eq!(book.record(id).unwrap().status, ProposalStatus::Active.code());

        book.close(&operator(), id).unwrap();
        assert_eq!(book.record(id).unwrap().status, ProposalStatus::Closed.code());
    }

    #[test]
    fn close_pending_is_invalid() {
        let mut book = book();
        let id = book.create(&creator(), yes_no(7), Timestamp::new(100)).unwrap();
        let err = book.close(&operator(), id).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransition { .. }));
    }

    #[test]
    fn cancel_by_non_creator_is_unauthorized() {
        let mut book = book();
        let id = book.create(&creator(), yes_no(7), Timestamp::new(100)).unwrap();
        let err = book.cancel(&voter(1), id).unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
        assert_eq!(book.record(id).unwrap().status, ProposalStatus::Pending.code());
    }

    #[test]
    fn cancel_only_from_pending() {
        let mut book = book();
        let pending = book.create(&creator(), yes_no(7), Timestamp::new(100)).unwrap();
        book.cancel(&creator(), pending).unwrap();
        assert_eq!(
            book.record(pending).unwrap().status,
            ProposalStatus::Cancelled.code()
        );

        let active = active_proposal(&mut book);
        let err = book.cancel(&creator(), active).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransition { .. }));

        // Cancelled is terminal.
        let err = book.start(&operator(), pending, 7, Timestamp::new(5)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransition { .. }));
    }

    #[test]
    fn unknown_proposal_is_not_found() {
        let mut book = book();
        assert_eq!(
            book.close(&operator(), ProposalId(42)).unwrap_err(),
            LedgerError::ProposalNotFound(ProposalId(42))
        );
        assert!(book.results(ProposalId(42)).is_err());
    }

    // ── Voting ───────────────────────────────────────────────────────────

    #[test]
    fn second_vote_is_rejected_and_tally_unchanged() {
        let mut book = book();
        let id = active_proposal(&mut book);
        let a = voter(1);
        book.vote(&a, id, CandidateId(0), Timestamp::new(2_000)).unwrap();
        let err = book.vote(&a, id, CandidateId(1), Timestamp::new(2_001)).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyVoted { .. }));

        let results = book.results(id).unwrap();
        assert_eq!(results[0].vote_count, 1);
        assert_eq!(results[1].vote_count, 0);
        assert!(book.has_voted(id, &a).unwrap());
    }

    #[test]
    fn vote_on_pending_or_closed_is_invalid() {
        let mut book = book();
        let pending = book.create(&creator(), yes_no(7), Timestamp::new(100)).unwrap();
        let err = book.vote(&voter(1), pending, CandidateId(0), Timestamp::new(200)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransition { .. }));

        let closed = active_proposal(&mut book);
        book.close(&operator(), closed).unwrap();
        let err = book.vote(&voter(1), closed, CandidateId(0), Timestamp::new(2_000)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidTransition {
                status: ProposalStatus::Closed,
                action: LifecycleAction::Vote,
            }
        );
        assert!(!book.has_voted(closed, &voter(1)).unwrap());
    }

    #[test]
    fn vote_for_unknown_candidate_is_rejected_without_marking_voter() {
        let mut book = book();
        let id = active_proposal(&mut book);
        let err = book.vote(&voter(1), id, CandidateId(5), Timestamp::new(2_000)).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownCandidate { .. }));
        assert!(!book.has_voted(id, &voter(1)).unwrap());
        // The voter can still cast a valid vote afterwards.
        book.vote(&voter(1), id, CandidateId(1), Timestamp::new(2_001)).unwrap();
    }

    #[test]
    fn expired_proposal_rejects_votes_by_default() {
        let mut book = book();
        let id = active_proposal(&mut book);
        let end = book.get(id).unwrap().end_time.unwrap();
        let err = book.vote(&voter(1), id, CandidateId(0), end).unwrap_err();
        assert_eq!(err, LedgerError::VotingEnded(end));
    }

    #[test]
    fn expired_proposal_accepts_votes_when_configured() {
        let mut config = LedgerConfig::with_operator(operator());
        config.accept_votes_after_end = true;
        let mut book = ProposalBook::new(config);
        let id = active_proposal(&mut book);
        let end = book.get(id).unwrap().end_time.unwrap();
        book.vote(&voter(1), id, CandidateId(0), end.plus_days(1)).unwrap();
        assert_eq!(book.get(id).unwrap().total_votes(), 1);
    }

    #[test]
    fn results_are_empty_tallies_before_votes() {
        let mut book = book();
        let id = book.create(&creator(), yes_no(7), Timestamp::new(100)).unwrap();
        let results = book.results(id).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.vote_count == 0));
    }

    #[test]
    fn apply_dispatches_calls() {
        let mut book = book();
        let created = book
            .apply(&creator(), LedgerCall::CreateProposal(yes_no(7)), Timestamp::new(1))
            .unwrap();
        assert_eq!(created, Some(ProposalId(0)));
        book.apply(
            &operator(),
            LedgerCall::StartProposal {
                id: ProposalId(0),
                duration_days: 7,
            },
            Timestamp::new(2),
        )
        .unwrap();
        book.apply(
            &voter(9),
            LedgerCall::Vote {
                proposal_id: ProposalId(0),
                candidate_id: CandidateId(1),
            },
            Timestamp::new(3),
        )
        .unwrap();
        assert_eq!(book.results(ProposalId(0)).unwrap()[1].vote_count, 1);
    }
}
