//! Result aggregation for display.
//!
//! Always derived from a fresh read; nothing here is cached. The Yes/No
//! winner heuristic lives only here so proposals with any number of options
//! are never shaped by it.

use ballot_types::{CandidateId, ResultRow};
use serde::Serialize;

/// One candidate's share of the vote.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TallyLine {
    pub candidate_id: CandidateId,
    pub name: String,
    pub votes: u64,
    /// 0.0..=100.0; 0 when nobody has voted.
    pub percentage: f64,
}

/// Outcome of a two-option Yes/No proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOutcome {
    Yes,
    No,
    Tie,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultSummary {
    pub lines: Vec<TallyLine>,
    pub total_votes: u64,
    /// Only for exactly two candidates named Yes and No, case-insensitively.
    pub binary_outcome: Option<BinaryOutcome>,
}

impl ResultSummary {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let total_votes: u64 = rows.iter().map(|r| r.votes).sum();
        let lines = rows
            .iter()
            .map(|r| TallyLine {
                candidate_id: r.candidate_id,
                name: r.name.clone(),
                votes: r.votes,
                percentage: percentage(r.votes, total_votes),
            })
            .collect();
        Self {
            lines,
            total_votes,
            binary_outcome: binary_outcome(rows),
        }
    }

    /// The line with the most votes, if there is a unique one.
    pub fn leader(&self) -> Option<&TallyLine> {
        let max = self.lines.iter().map(|l| l.votes).max()?;
        let mut leaders = self.lines.iter().filter(|l| l.votes == max);
        let first = leaders.next()?;
        leaders.next().is_none().then_some(first)
    }
}

fn percentage(votes: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        votes as f64 * 100.0 / total as f64
    }
}

fn binary_outcome(rows: &[ResultRow]) -> Option<BinaryOutcome> {
    let [a, b] = rows else {
        return None;
    };
    let (yes, no) = match (a.name.trim().to_lowercase().as_str(), b.name.trim().to_lowercase().as_str()) {
        ("yes", "no") => (a.votes, b.votes),
        ("no", "yes") => (b.votes, a.votes),
        _ => return None,
    };
    Some(match yes.cmp(&no) {
        std::cmp::Ordering::Greater => BinaryOutcome::Yes,
        std::cmp::Ordering::Less => BinaryOutcome::No,
        std::cmp::Ordering::Equal => BinaryOutcome::Tie,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(entries: &[(&str, u64)]) -> Vec<ResultRow> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (name, votes))| ResultRow {
                candidate_id: CandidateId(i as u64),
                name: name.to_string(),
                votes: *votes,
            })
            .collect()
    }

    #[test]
    fn no_votes_means_zero_percent() {
        let summary = ResultSummary::from_rows(&rows(&[("Yes", 0), ("No", 0)]));
        assert_eq!(summary.total_votes, 0);
        assert!(summary.lines.iter().all(|l| l.percentage == 0.0));
        assert_eq!(summary.binary_outcome, Some(BinaryOutcome::Tie));
        assert!(summary.leader().is_none());
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let summary = ResultSummary::from_rows(&rows(&[("A", 1), ("B", 1), ("C", 1)]));
        let sum: f64 = summary.lines.iter().map(|l| l.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert_eq!(summary.binary_outcome, None);
    }

    #[test]
    fn yes_no_winner_is_case_insensitive_and_order_free() {
        let summary = ResultSummary::from_rows(&rows(&[("no", 3), ("YES", 5)]));
        assert_eq!(summary.binary_outcome, Some(BinaryOutcome::Yes));
        assert_eq!(summary.leader().map(|l| l.name.as_str()), Some("YES"));

        let summary = ResultSummary::from_rows(&rows(&[("Yes", 1), ("No", 2)]));
        assert_eq!(summary.binary_outcome, Some(BinaryOutcome::No));
    }

    #[test]
    fn two_options_not_named_yes_no_have_no_binary_outcome() {
        let summary = ResultSummary::from_rows(&rows(&[("Alice", 4), ("Bob", 1)]));
        assert_eq!(summary.binary_outcome, None);
        assert_eq!(summary.lines[0].percentage, 80.0);
    }
}
