//! The ledger index collaborator.

use async_trait::async_trait;
use factfund_types::{deserialize_optional, AccountId, E8s, FundError};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Query-only view of the external ledger index.
///
/// The index is the single source of truth for balances. Implementations
/// surface call failures as [`FundError::Transport`] and index-signaled
/// errors through the canonical tagged result.
#[async_trait(?Send)]
pub trait LedgerIndex {
    /// `get_account_identifier_balance`: current balance in e8s.
    async fn account_balance(&self, account: &AccountId) -> Result<E8s, FundError>;

    /// `get_account_identifier_transactions`: newest first, raw records.
    ///
    /// Records are returned undecoded so a single malformed entry cannot
    /// fail the whole page.
    async fn account_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<TransactionsPage, FundError>;
}

#[async_trait(?Send)]
impl<T: LedgerIndex + ?Sized> LedgerIndex for Rc<T> {
    async fn account_balance(&self, account: &AccountId) -> Result<E8s, FundError> {
        (**self).account_balance(account).await
    }

    async fn account_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<TransactionsPage, FundError> {
        (**self).account_transactions(query).await
    }
}

/// Arguments of `get_account_identifier_transactions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionQuery {
    pub account_identifier: AccountId,
    pub max_results: u64,
    /// Transaction id to page back from; `None` starts at the newest.
    pub start: Option<u64>,
}

impl TransactionQuery {
    pub fn latest(account_identifier: AccountId, max_results: u64) -> Self {
        Self {
            account_identifier,
            max_results,
            start: None,
        }
    }
}

/// Successful payload of a history query.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TransactionsPage {
    pub transactions: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub oldest_tx_id: Option<u64>,
}
