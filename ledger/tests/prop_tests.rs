use proptest::prelude::*;

use ballot_ledger::{LedgerConfig, ProposalBook};
use ballot_types::{
    Address, CandidateId, LedgerCall, LedgerError, NewProposal, ProposalId, ProposalStatus,
    Timestamp,
};

fn operator() -> Address {
    Address::from_seed(0xad)
}

fn new_proposal(candidates: usize) -> NewProposal {
    NewProposal {
        title: "Property proposal".into(),
        description: "Generated by a property test".into(),
        candidate_names: (0..candidates).map(|i| format!("Option {i}")).collect(),
        duration_days: 7,
        zkp_configuration: String::new(),
    }
}

fn active_book(candidates: usize) -> ProposalBook {
    let mut book = ProposalBook::new(LedgerConfig::with_operator(operator()));
    let id = book
        .create(&Address::from_seed(1), new_proposal(candidates), Timestamp::new(0))
        .unwrap();
    book.start(&operator(), id, 7, Timestamp::new(1)).unwrap();
    book
}

fn arb_call() -> impl Strategy<Value = (u8, LedgerCall)> {
    let id = ProposalId(0);
    prop_oneof![
        (0u8..4).prop_map(move |who| (who, LedgerCall::StartProposal { id, duration_days: 1 })),
        (0u8..4).prop_map(move |who| (who, LedgerCall::CloseProposal { id })),
        (0u8..4).prop_map(move |who| (who, LedgerCall::CancelProposal { id })),
        (0u8..4, 0u64..3).prop_map(move |(who, c)| (
            who,
            LedgerCall::Vote {
                proposal_id: id,
                candidate_id: CandidateId(c),
            }
        )),
    ]
}

fn allowed(from: ProposalStatus, to: ProposalStatus) -> bool {
    from == to
        || matches!(
            (from, to),
            (ProposalStatus::Pending, ProposalStatus::Active)
                | (ProposalStatus::Active, ProposalStatus::Closed)
                | (ProposalStatus::Pending, ProposalStatus::Cancelled)
        )
}

proptest! {
    /// Fewer than two candidates never makes it into the book.
    #[test]
    fn creation_requires_two_candidates(candidates in 0usize..6) {
        let mut book = ProposalBook::new(LedgerConfig::default());
        let result = book.create(&Address::from_seed(1), new_proposal(candidates), Timestamp::new(0));
        if candidates < 2 {
            prop_assert!(matches!(result, Err(LedgerError::Validation(_))), "expected a validation error");
            prop_assert_eq!(book.count(), 0);
        } else {
            let id = result.unwrap();
            prop_assert_eq!(book.candidates(id).unwrap().len(), candidates);
        }
    }

    /// Each voter is counted at most once, whatever they try.
    #[test]
    fn one_vote_per_address(attempts in prop::collection::vec((0u8..8, 0u64..3), 1..60)) {
        let mut book = active_book(3);
        let id = ProposalId(0);
        let mut voted = std::collections::BTreeSet::new();
        for (step, (who, candidate)) in attempts.into_iter().enumerate() {
            let voter = Address::from_seed(who);
            let result = book.vote(&voter, id, CandidateId(candidate), Timestamp::new(10 + step as u64));
            if voted.contains(&who) {
                let already = matches!(result, Err(LedgerError::AlreadyVoted { .. }));
                prop_assert!(already, "expected AlreadyVoted");
            } else {
                prop_assert!(result.is_ok());
                voted.insert(who);
            }
        }
        let total: u64 = book.results(id).unwrap().iter().map(|r| r.vote_count).sum();
        prop_assert_eq!(total, voted.len() as u64);
    }

    /// Totals never decrease, whatever sequence of calls is applied.
    #[test]
    fn totals_are_monotonic(calls in prop::collection::vec(arb_call(), 1..80)) {
        let mut book = active_book(3);
        let id = ProposalId(0);
        let mut last_total = 0u64;
        let mut last_status = ProposalStatus::Active;
        for (step, (who, call)) in calls.into_iter().enumerate() {
            let from = if who == 0 { operator() } else { Address::from_seed(who) };
            let _ = book.apply(&from, call, Timestamp::new(100 + step as u64));

            let total: u64 = book.results(id).unwrap().iter().map(|r| r.vote_count).sum();
            prop_assert!(total >= last_total);
            last_total = total;

            let status = ProposalStatus::from_code(book.record(id).unwrap().status);
            prop_assert!(allowed(last_status, status), "illegal transition {last_status} -> {status}");
            last_status = status;
        }
    }
}
