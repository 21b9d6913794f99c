//! Application-level writes.
//!
//! Each action resolves to an [`ActionOutcome`]; nothing here returns an
//! error or panics. An action is only reported successful once its
//! transaction is confirmed, and a failed write is never retried.

use std::sync::Arc;

use ballot_types::{Address, CandidateId, ProposalId};
use tracing::{info, warn};

use crate::assist::ConfigAssistant;
use crate::connector::LedgerConnector;
use crate::error::{ClientError, ClientResult};
use crate::form::ProposalForm;
use crate::guard::SubmitGuard;
use crate::handle::{PendingTx, WriteHandle};
use crate::outcome::ActionOutcome;

pub struct ProposalActions {
    connector: LedgerConnector,
    assistant: Arc<dyn ConfigAssistant>,
    admin: Option<Address>,
    guard: SubmitGuard,
}

impl ProposalActions {
    pub fn new(connector: LedgerConnector, assistant: Arc<dyn ConfigAssistant>) -> Self {
        Self {
            connector,
            assistant,
            admin: None,
            guard: SubmitGuard::new(),
        }
    }

    /// Restrict start and close to `admin`.
    pub fn with_admin(mut self, admin: Address) -> Self {
        self.admin = Some(admin);
        self
    }

    pub fn connector(&self) -> &LedgerConnector {
        &self.connector
    }

    pub fn guard(&self) -> &SubmitGuard {
        &self.guard
    }

    pub async fn create_proposal(&self, form: &ProposalForm) -> ActionOutcome {
        report("create_proposal", self.try_create(form).await)
    }

    /// Start a pending proposal for the duration it was created with.
    pub async fn start_proposal(&self, id: ProposalId) -> ActionOutcome {
        report("start_proposal", self.try_start(id).await)
    }

    pub async fn close_proposal(&self, id: ProposalId) -> ActionOutcome {
        report("close_proposal", self.try_close(id).await)
    }

    /// Cancel a pending proposal. Only its creator may do so.
    pub async fn cancel_proposal(&self, id: ProposalId) -> ActionOutcome {
        report("cancel_proposal", self.try_cancel(id).await)
    }

    pub async fn cast_vote(&self, id: ProposalId, candidate: CandidateId) -> ActionOutcome {
        report("cast_vote", self.try_vote(id, candidate).await)
    }

    async fn try_create(&self, form: &ProposalForm) -> ClientResult<ActionOutcome> {
        let valid = form.validate().map_err(|errors| {
            let detail: Vec<String> = errors.iter().map(ToString::to_string).collect();
            ClientError::Validation(detail.join("; "))
        })?;
        let handle = self.connector.write_handle().await?;
        let _permit = self
            .guard
            .acquire(format!("create_proposal:{}:{}", handle.signer(), valid.title))?;

        let zkp_configuration = self
            .assistant
            .configure(&valid.candidate_names)
            .await
            .map_err(|e| ClientError::Assistant(e.to_string()))?;

        let pending = handle
            .create_proposal(valid.into_new_proposal(zkp_configuration.clone()))
            .await?;
        let outcome = confirm(pending, "Proposal created successfully!").await?;
        Ok(outcome.with_zkp_configuration(zkp_configuration))
    }

    async fn try_start(&self, id: ProposalId) -> ClientResult<ActionOutcome> {
        let handle = self.admin_handle("start").await?;
        let _permit = self.guard.acquire(format!("start_proposal:{id}"))?;
        let proposal = handle.reader().proposal(id).await?;
        let pending = handle.start_proposal(id, proposal.duration_days).await?;
        confirm(pending, "Proposal started successfully.").await
    }

    async fn try_close(&self, id: ProposalId) -> ClientResult<ActionOutcome> {
        let handle = self.admin_handle("close").await?;
        let _permit = self.guard.acquire(format!("close_proposal:{id}"))?;
        let pending = handle.close_proposal(id).await?;
        confirm(pending, "Proposal closed successfully.").await
    }

    async fn try_cancel(&self, id: ProposalId) -> ClientResult<ActionOutcome> {
        let handle = self.connector.write_handle().await?;
        let proposal = handle.reader().proposal(id).await?;
        if &proposal.creator != handle.signer() {
            return Err(ClientError::Unauthorized(
                "You are not authorized to cancel this proposal.".to_string(),
            ));
        }
        let _permit = self.guard.acquire(format!("cancel_proposal:{id}"))?;
        let pending = handle.cancel_proposal(id).await?;
        confirm(pending, "Proposal cancelled successfully.").await
    }

    async fn try_vote(&self, id: ProposalId, candidate: CandidateId) -> ClientResult<ActionOutcome> {
        let handle = self.connector.write_handle().await?;
        let _permit = self
            .guard
            .acquire(format!("vote:{id}:{}", handle.signer()))?;
        let pending = handle.vote(id, candidate).await?;
        confirm(pending, "Your vote has been cast successfully!").await
    }

    async fn admin_handle(&self, action: &str) -> ClientResult<WriteHandle> {
        let handle = self.connector.write_handle().await?;
        if let Some(admin) = &self.admin {
            if admin != handle.signer() {
                return Err(ClientError::Unauthorized(format!(
                    "only the administrator may {action} proposals"
                )));
            }
        }
        Ok(handle)
    }
}

async fn confirm(pending: PendingTx, message: &str) -> ClientResult<ActionOutcome> {
    let confirmation = pending.wait().await?;
    Ok(ActionOutcome::confirmed(message, &confirmation))
}

fn report(action: &'static str, result: ClientResult<ActionOutcome>) -> ActionOutcome {
    match result {
        Ok(outcome) => {
            info!(action, tx = ?outcome.tx_hash, proposal = ?outcome.proposal_id, "action confirmed");
            outcome
        }
        Err(e) => {
            warn!(action, error = %e, kind = ?e.kind(), "action failed");
            ActionOutcome::failed(&e)
        }
    }
}
