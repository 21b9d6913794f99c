//! Client-side commands: everything except `ledger run`.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use ballot_client::queries::{
    active_proposals, fetch_has_voted, fetch_results, find_proposal, list_proposals,
    past_proposals, proposals_by_creator,
};
use ballot_client::{
    watch_results, ActionOutcome, BinaryOutcome, ClientConfig, ConfigAssistant, HttpAssistant,
    LedgerConnector, ProposalActions, ProposalForm, ResultSummary, TemplateAssistant,
};
use ballot_types::{
    Address, Candidate, CandidateId, Proposal, ProposalId, ProposalStatus, Timestamp,
};
use ballot_utils::format_remaining;
use serde::Serialize;
use tracing::debug;

use crate::cli::Command;

pub struct App {
    actions: ProposalActions,
    config: ClientConfig,
    json: bool,
}

impl App {
    pub fn new(config: ClientConfig, json: bool) -> anyhow::Result<Self> {
        let connector = LedgerConnector::from_config(&config)?;
        let assistant: Arc<dyn ConfigAssistant> = match &config.assistant_url {
            Some(url) => Arc::new(HttpAssistant::new(url.as_str())?),
            None => Arc::new(TemplateAssistant),
        };
        let mut actions = ProposalActions::new(connector, assistant);
        if let Some(admin) = &config.admin_address {
            actions = actions.with_admin(Address::parse(admin).context("invalid admin address")?);
        }
        debug!(rpc_url = %config.rpc_url, "client ready");
        Ok(Self {
            actions,
            config,
            json,
        })
    }

    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Ledger { .. } => bail!("`ledger` commands are handled by the node"),
            Command::List {
                creator,
                active,
                past,
            } => self.list(creator, active, past).await,
            Command::Show { id } => self.show(ProposalId(id)).await,
            Command::Propose {
                title,
                description,
                candidates,
                days,
            } => {
                let mut form = ProposalForm::new(title, description).with_duration_days(days);
                if !candidates.is_empty() {
                    form = form.with_candidates(candidates);
                }
                self.finish(self.actions.create_proposal(&form).await)
            }
            Command::Start { id } => self.finish(self.actions.start_proposal(ProposalId(id)).await),
            Command::Close { id } => self.finish(self.actions.close_proposal(ProposalId(id)).await),
            Command::Cancel { id } => {
                self.finish(self.actions.cancel_proposal(ProposalId(id)).await)
            }
            Command::Vote { id, candidate } => {
                let id = ProposalId(id);
                let candidate = self.resolve_candidate(id, &candidate).await?;
                self.finish(self.actions.cast_vote(id, candidate).await)
            }
            Command::Results { id, watch } => {
                if watch {
                    self.watch(ProposalId(id)).await
                } else {
                    self.results(ProposalId(id)).await
                }
            }
            Command::HasVoted { id, address } => self.has_voted(ProposalId(id), address).await,
        }
    }

    async fn list(&self, creator: Option<String>, active: bool, past: bool) -> anyhow::Result<()> {
        let read = self.actions.connector().read_handle();
        let proposals = match creator {
            Some(raw) => {
                let creator = Address::parse(&raw).context("invalid --creator")?;
                proposals_by_creator(&read, &creator).await
            }
            None if active => active_proposals(&read).await,
            None if past => past_proposals(&read).await,
            None => list_proposals(&read).await,
        };
        self.emit(&proposals, || {
            if proposals.is_empty() {
                return "no proposals".to_string();
            }
            proposals.iter().map(render_proposal).collect::<Vec<_>>().join("\n")
        })
    }

    async fn show(&self, id: ProposalId) -> anyhow::Result<()> {
        let read = self.actions.connector().read_handle();
        let proposal = find_proposal(&read, id)
            .await
            .ok_or_else(|| anyhow!("proposal {id} not found or ledger unreachable"))?;
        self.emit(&proposal, || render_proposal(&proposal))
    }

    async fn results(&self, id: ProposalId) -> anyhow::Result<()> {
        let rows = fetch_results(&self.actions.connector().read_handle(), id).await;
        let summary = ResultSummary::from_rows(&rows);
        self.emit(&summary, || render_summary(&summary))
    }

    async fn watch(&self, id: ProposalId) -> anyhow::Result<()> {
        let read = self.actions.connector().read_handle();
        let mut poller = watch_results(read, id, self.config.poll_interval());
        let mut last = None;
        loop {
            tokio::select! {
                rows = poller.changed() => {
                    let Some(rows) = rows else { break };
                    let summary = ResultSummary::from_rows(&rows);
                    if last.as_ref() != Some(&summary) {
                        self.emit(&summary, || render_summary(&summary))?;
                        last = Some(summary);
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        poller.stop();
        Ok(())
    }

    async fn has_voted(&self, id: ProposalId, address: Option<String>) -> anyhow::Result<()> {
        let voter = match address {
            Some(raw) => Address::parse(&raw).context("invalid --address")?,
            None => self
                .actions
                .connector()
                .account()
                .await
                .ok_or_else(|| anyhow!("no --address given and no wallet configured"))?,
        };
        let voted = fetch_has_voted(&self.actions.connector().read_handle(), id, &voter).await;
        self.emit(&voted, || {
            if voted {
                format!("{voter} has voted on proposal {id}")
            } else {
                format!("{voter} has not voted on proposal {id}")
            }
        })
    }

    async fn resolve_candidate(&self, id: ProposalId, raw: &str) -> anyhow::Result<CandidateId> {
        let candidates = find_proposal(&self.actions.connector().read_handle(), id)
            .await
            .map(|p| p.candidates)
            .unwrap_or_default();
        pick_candidate(&candidates, raw)
            .ok_or_else(|| anyhow!("proposal {id} has no candidate {raw:?}"))
    }

    fn finish(&self, outcome: ActionOutcome) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else if outcome.success {
            println!("{}", outcome.message);
            if let Some(id) = outcome.proposal_id {
                println!("proposal id: {id}");
            }
            if let Some(hash) = outcome.tx_hash {
                println!("transaction: {hash}");
            }
        }
        if outcome.success {
            Ok(())
        } else {
            Err(anyhow!(outcome.message))
        }
    }

    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce() -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", human());
        }
        Ok(())
    }
}

/// A candidate by name (case-insensitive), else by index written `N` or `#N`.
/// A name wins over an index, so a candidate called "2024" stays reachable.
fn pick_candidate(candidates: &[Candidate], raw: &str) -> Option<CandidateId> {
    let raw = raw.trim();
    if let Some(c) = candidates.iter().find(|c| c.name.eq_ignore_ascii_case(raw)) {
        return Some(c.id);
    }
    raw.strip_prefix('#')
        .unwrap_or(raw)
        .parse::<u64>()
        .ok()
        .map(CandidateId)
}

fn render_proposal(p: &Proposal) -> String {
    let timing = match p.status {
        ProposalStatus::Pending => format!("runs {} days once started", p.duration_days),
        ProposalStatus::Active => {
            format_remaining(p.end_date.map(|end| end.remaining_from(Timestamp::now())))
        }
        ProposalStatus::Closed | ProposalStatus::Cancelled => p.status.to_string(),
    };
    let candidates: Vec<String> = p
        .candidates
        .iter()
        .map(|c| format!("{} {}", c.id, c.name))
        .collect();
    format!(
        "#{} [{}] {}\n    {}\n    creator {}, {}\n    candidates: {}",
        p.id,
        p.status,
        p.title,
        p.description,
        p.creator,
        timing,
        candidates.join(", ")
    )
}

fn render_summary(summary: &ResultSummary) -> String {
    let mut out: Vec<String> = summary
        .lines
        .iter()
        .map(|l| {
            format!(
                "{:>3}  {:<20} {:>6} votes  {:>5.1}%",
                l.candidate_id, l.name, l.votes, l.percentage
            )
        })
        .collect();
    let verdict = match summary.binary_outcome {
        Some(BinaryOutcome::Yes) => "; Yes wins",
        Some(BinaryOutcome::No) => "; No wins",
        Some(BinaryOutcome::Tie) => "; tie",
        None => "",
    };
    out.push(format!("total {} votes{}", summary.total_votes, verdict));
    out.join("\n")
}
