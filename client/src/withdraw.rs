//! Withdrawal of available funds to an external principal.

use factfund_ledger::LedgerIndex;
use factfund_types::{E8s, FundError, Principal, Subaccount};

use crate::backend::Backend;
use crate::client::FundingClient;
use crate::reconciler::{reconcile, Balance};

impl<B: Backend, L: LedgerIndex> FundingClient<B, L> {
    /// Withdraw `amount` from the caller's available balance and return the
    /// balance re-read after settling.
    pub async fn withdraw(
        &self,
        amount: E8s,
        recipient: &Principal,
        subaccount: Option<Subaccount>,
    ) -> Result<Balance, FundError> {
        if amount.is_zero() {
            return Err(FundError::Validation(
                "withdrawal amount must be greater than zero".into(),
            ));
        }

        let user = self.backend().get_or_create_user().await?;
        let before = reconcile(self.ledger(), &user).await?;
        if amount > before.available {
            return Err(FundError::InsufficientBalance {
                needed: amount,
                available: before.available,
            });
        }

        self.backend()
            .withdraw_from_user_account(amount, recipient, subaccount)
            .await?;
        self.settle().await;

        let (_, after) = self.reconcile_current().await?;
        tracing::info!(
            recipient = %recipient,
            amount = amount.e8s(),
            available = after.available.e8s(),
            "withdrawal settled"
        );
        Ok(after)
    }
}
