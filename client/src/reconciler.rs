//! Balance reconciliation against the ledger index.

use factfund_ledger::LedgerIndex;
use factfund_types::{E8s, FundError, User};
use std::fmt;

use crate::backend::Backend;
use crate::client::FundingClient;

/// A user's balance split, derived fresh from the ledger on every call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Balance {
    pub total: E8s,
    pub locked: E8s,
    pub available: E8s,
}

impl Balance {
    /// `available = total - locked`, saturating at zero.
    pub fn derive(total: E8s, locked: E8s) -> Self {
        Self {
            total,
            locked,
            available: total.saturating_sub(locked),
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total {} (locked {}, available {})",
            self.total, self.locked, self.available
        )
    }
}

/// Query the ledger balance of `user`'s account and split it.
pub async fn reconcile(ledger: &impl LedgerIndex, user: &User) -> Result<Balance, FundError> {
    let total = ledger.account_balance(&user.account_id).await?;
    let balance = Balance::derive(total, user.locked_balance);
    tracing::debug!(
        account = %user.account_id,
        total = balance.total.e8s(),
        locked = balance.locked.e8s(),
        available = balance.available.e8s(),
        "reconciled balance"
    );
    Ok(balance)
}

impl<B: Backend, L: LedgerIndex> FundingClient<B, L> {
    /// Reconcile a user record the caller already holds.
    pub async fn balance(&self, user: &User) -> Result<Balance, FundError> {
        reconcile(self.ledger(), user).await
    }

    /// Fetch the caller's user record and reconcile it.
    pub async fn reconcile_current(&self) -> Result<(User, Balance), FundError> {
        let user = self.backend().get_or_create_user().await?;
        let balance = reconcile(self.ledger(), &user).await?;
        Ok((user, balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_is_total_minus_locked() {
        let b = Balance::derive(E8s::new(300_000_000), E8s::new(100_000_000));
        assert_eq!(b.available, E8s::new(200_000_000));
    }

    #[test]
    fn locked_above_total_saturates() {
        let b = Balance::derive(E8s::new(5), E8s::new(10));
        assert_eq!(b.available, E8s::ZERO);
        assert_eq!(b.locked, E8s::new(10));
    }

    #[test]
    fn display_lists_all_three_parts() {
        let b = Balance::derive(E8s::from_tokens(2), E8s::from_tokens(1));
        let text = b.to_string();
        assert!(text.contains("2.00000000 ICP"));
        assert!(text.contains("available 1.00000000 ICP"));
    }
}
