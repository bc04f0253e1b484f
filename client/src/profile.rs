//! The caller's profile: user record, balance and classified history.

use factfund_ledger::{ClassifiedTransaction, Classifier, LedgerIndex, TransactionQuery};
use factfund_types::{FundError, TimestampMs, User};

use crate::backend::Backend;
use crate::client::FundingClient;
use crate::reconciler::{reconcile, Balance};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub user: User,
    pub balance: Balance,
    /// Newest first, as returned by the index.
    pub transactions: Vec<ClassifiedTransaction>,
}

impl<B: Backend, L: LedgerIndex> FundingClient<B, L> {
    pub async fn profile(&self) -> Result<Profile, FundError> {
        let user = self.backend().get_or_create_user().await?;
        let balance = reconcile(self.ledger(), &user).await?;

        let query = TransactionQuery::latest(user.account_id.clone(), self.history_limit);
        let page = self.ledger().account_transactions(&query).await?;
        let transactions =
            Classifier::new(&user.account_id, TimestampMs::now()).classify_all(&page.transactions);
        tracing::debug!(
            account = %user.account_id,
            transactions = transactions.len(),
            "loaded profile"
        );

        Ok(Profile {
            user,
            balance,
            transactions,
        })
    }
}
