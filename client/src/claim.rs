//! Claim protocol: the creator collects a fully funded proposal.

use factfund_ledger::LedgerIndex;
use factfund_types::{FundError, Principal, ProposalId};

use crate::backend::Backend;
use crate::client::FundingClient;
use crate::proposal::{ClaimState, ProposalView};
use crate::reconciler::Balance;

/// How the confirming refetch resolved a pending claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The backend reports the proposal claimed.
    Committed,
    /// The backend still reports it unclaimed; the view was reset.
    RolledBack,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub outcome: ClaimOutcome,
    pub proposal: ProposalView,
    pub balance: Balance,
}

/// Local gate for a claim of `view` by `caller`.
pub fn check_claim(view: &ProposalView, caller: &Principal) -> Result<(), FundError> {
    if !view.is_creator(caller) {
        return Err(FundError::Authorization(format!(
            "only the creator of proposal {} can claim it",
            view.id()
        )));
    }
    if view.is_claimed() {
        return Err(FundError::Validation(format!(
            "proposal {} has already been claimed",
            view.id()
        )));
    }
    if !view.goal_reached() {
        return Err(FundError::Validation(format!(
            "proposal {} has raised {} of {}",
            view.id(),
            view.raised,
            view.required()
        )));
    }
    if view.raised.is_zero() {
        return Err(FundError::Validation(format!(
            "proposal {} has nothing to claim",
            view.id()
        )));
    }
    Ok(())
}

impl<B: Backend, L: LedgerIndex> FundingClient<B, L> {
    /// Claim proposal `id` for the calling user.
    pub async fn claim(&self, id: ProposalId) -> Result<ClaimReceipt, FundError> {
        let mut view = self.proposal(id).await?;
        self.claim_view(&mut view).await
    }

    /// Claim against a view the caller holds.
    ///
    /// The raised amount is re-read before the gate. After the backend call
    /// the view moves to [`ClaimState::Pending`], and the confirming refetch
    /// replaces it with the backend's record. A rejected claim only updates
    /// the view's raised amount.
    pub async fn claim_view(&self, view: &mut ProposalView) -> Result<ClaimReceipt, FundError> {
        let id = view.id();
        let user = self.backend().get_or_create_user().await?;
        view.raised = self.ledger().account_balance(&view.proposal.account_id).await?;
        check_claim(view, &user.principal)?;

        tracing::debug!(proposal = %id, raised = view.raised.e8s(), "sending claim");
        self.backend().claim_proposal(id).await?;
        view.claim = ClaimState::Pending;
        self.settle().await;

        let proposal = self.backend().get_proposal(id).await?;
        let raised = self.ledger().account_balance(&proposal.account_id).await?;
        view.refresh(proposal, raised);
        let outcome = match view.claim {
            ClaimState::Committed => {
                tracing::info!(proposal = %id, "claim committed");
                ClaimOutcome::Committed
            }
            _ => {
                tracing::warn!(proposal = %id, "claim not confirmed by backend, rolled back");
                ClaimOutcome::RolledBack
            }
        };

        // The claim can release locked funds, so the user record is re-read.
        let (_, balance) = self.reconcile_current().await?;
        Ok(ClaimReceipt {
            outcome,
            proposal: view.clone(),
            balance,
        })
    }
}
