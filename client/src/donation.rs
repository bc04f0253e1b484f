//! Donation protocol.

use factfund_ledger::LedgerIndex;
use factfund_types::{E8s, FundError, ProposalId};

use crate::backend::Backend;
use crate::client::FundingClient;
use crate::proposal::ProposalView;
use crate::reconciler::Balance;

/// Result of a successful donation, re-read from the ledger after settling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DonationReceipt {
    pub proposal: ProposalView,
    pub balance: Balance,
}

/// Local gate for a donation of `amount` towards a goal of `required` with
/// `raised` already collected.
pub fn check_donation(required: E8s, raised: E8s, amount: E8s) -> Result<(), FundError> {
    if amount.is_zero() {
        return Err(FundError::Validation(
            "donation amount must be greater than zero".into(),
        ));
    }
    let remaining = required.saturating_sub(raised);
    if amount > remaining {
        return Err(FundError::Validation(format!(
            "donation of {amount} exceeds the remaining {remaining}"
        )));
    }
    Ok(())
}

impl<B: Backend, L: LedgerIndex> FundingClient<B, L> {
    /// Donate `amount` to proposal `id`.
    ///
    /// Raised is queried from the ledger right before the gate and again after
    /// the settle delay. A failed attempt leaves nothing to undo and can be
    /// retried.
    pub async fn donate(&self, id: ProposalId, amount: E8s) -> Result<DonationReceipt, FundError> {
        // Amount-only pass of the gate so a zero donation makes no calls.
        check_donation(E8s::new(u64::MAX), E8s::ZERO, amount)?;

        let before = self.proposal(id).await?;
        check_donation(before.required(), before.raised, amount)?;

        tracing::debug!(proposal = %id, amount = amount.e8s(), "sending donation");
        self.backend().donate_to_proposal(id, amount).await?;
        self.settle().await;

        let proposal = self.proposal(id).await?;
        let (_, balance) = self.reconcile_current().await?;
        tracing::info!(
            proposal = %id,
            amount = amount.e8s(),
            raised = proposal.raised.e8s(),
            "donation settled"
        );
        Ok(DonationReceipt { proposal, balance })
    }
}
