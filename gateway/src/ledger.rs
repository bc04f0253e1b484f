//! Ledger index over the HTTP gateway.

use async_trait::async_trait;
use factfund_ledger::{LedgerIndex, TransactionQuery, TransactionsPage};
use factfund_types::{AccountId, E8s, FundError};
use serde_json::json;

use crate::client::GatewayClient;

pub struct HttpLedgerIndex {
    gateway: GatewayClient,
}

impl HttpLedgerIndex {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }
}

#[async_trait(?Send)]
impl LedgerIndex for HttpLedgerIndex {
    async fn account_balance(&self, account: &AccountId) -> Result<E8s, FundError> {
        self.gateway
            .call(
                "get_account_identifier_balance",
                &json!({ "account_identifier": account }),
            )
            .await
    }

    async fn account_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<TransactionsPage, FundError> {
        self.gateway
            .call_result("get_account_identifier_transactions", query)
            .await
    }
}
