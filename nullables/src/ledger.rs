//! Nullable ledger index backed by in-memory balances.

use async_trait::async_trait;
use factfund_ledger::{
    LedgerIndex, LedgerTimestamp, LedgerTransaction, Operation, TransactionQuery,
    TransactionWithId, TransactionsPage,
};
use factfund_types::{AccountId, E8s, FundError, Tokens};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Nanosecond timestamp of the first recorded transaction.
const GENESIS_NANOS: u64 = 1_700_000_000_000_000_000;

/// Ledger transfer fee charged on every transfer.
pub const TRANSFER_FEE: E8s = E8s::new(10_000);

struct Entry {
    accounts: Vec<String>,
    raw: serde_json::Value,
}

/// An in-memory ledger that answers index queries.
///
/// Balances are keyed by lowercase account hex. History is kept in insertion
/// order and returned newest first.
pub struct NullLedger {
    balances: RefCell<HashMap<String, E8s>>,
    history: RefCell<Vec<Entry>>,
    next_id: Cell<u64>,
    clock_nanos: Cell<u64>,
    charge_fees: Cell<bool>,
    fail_next: RefCell<Option<FundError>>,
    balance_queries: Cell<usize>,
    history_queries: Cell<usize>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            balances: RefCell::new(HashMap::new()),
            history: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            clock_nanos: Cell::new(GENESIS_NANOS),
            charge_fees: Cell::new(false),
            fail_next: RefCell::new(None),
            balance_queries: Cell::new(0),
            history_queries: Cell::new(0),
        }
    }

    fn key(account: &str) -> String {
        account.to_ascii_lowercase()
    }

    /// Overwrite an account balance without recording a transaction.
    pub fn set_balance(&self, account: &AccountId, amount: E8s) {
        self.balances
            .borrow_mut()
            .insert(Self::key(account.as_str()), amount);
    }

    pub fn balance_of(&self, account: &AccountId) -> E8s {
        self.balances
            .borrow()
            .get(&Self::key(account.as_str()))
            .copied()
            .unwrap_or(E8s::ZERO)
    }

    /// Deduct [`TRANSFER_FEE`] from the sender of every transfer.
    pub fn charge_fees(&self, enabled: bool) {
        self.charge_fees.set(enabled);
    }

    /// Make the next index query fail with `error`.
    pub fn fail_next(&self, error: FundError) {
        *self.fail_next.borrow_mut() = Some(error);
    }

    pub fn balance_queries(&self) -> usize {
        self.balance_queries.get()
    }

    pub fn history_queries(&self) -> usize {
        self.history_queries.get()
    }

    /// Move `amount` between accounts and record the transfer with `memo`.
    pub fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: E8s,
        memo: &str,
    ) -> Result<u64, FundError> {
        let fee = if self.charge_fees.get() {
            TRANSFER_FEE
        } else {
            E8s::ZERO
        };
        let debit = amount
            .checked_add(fee)
            .ok_or_else(|| FundError::Rejected("Amount overflow".into()))?;
        let available = self.balance_of(from);
        let rest = available
            .checked_sub(debit)
            .ok_or_else(|| FundError::Rejected("Insufficient funds".into()))?;

        self.set_balance(from, rest);
        self.set_balance(to, self.balance_of(to).saturating_add(amount));

        let operation = Operation::Transfer {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
            amount: Tokens { e8s: amount },
            fee: Tokens { e8s: fee },
        };
        Ok(self.record(
            vec![from.as_str().to_string(), to.as_str().to_string()],
            operation,
            memo,
        ))
    }

    /// Credit `to` from the minting account.
    pub fn mint(&self, to: &AccountId, amount: E8s) -> u64 {
        self.set_balance(to, self.balance_of(to).saturating_add(amount));
        let operation = Operation::Mint {
            to: to.as_str().to_string(),
            amount: Tokens { e8s: amount },
        };
        self.record(vec![to.as_str().to_string()], operation, "")
    }

    /// Append a raw record to `account`'s history, bypassing balances.
    pub fn push_raw(&self, account: &AccountId, raw: serde_json::Value) {
        self.history.borrow_mut().push(Entry {
            accounts: vec![Self::key(account.as_str())],
            raw,
        });
    }

    fn record(&self, accounts: Vec<String>, operation: Operation, memo: &str) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let nanos = self.clock_nanos.get();
        self.clock_nanos.set(nanos + 1_000_000_000);

        let record = TransactionWithId {
            id,
            transaction: LedgerTransaction {
                operation,
                memo: 0,
                icrc1_memo: (!memo.is_empty()).then(|| memo.as_bytes().to_vec()),
                timestamp: Some(LedgerTimestamp {
                    timestamp_nanos: nanos,
                }),
            },
        };
        let raw = serde_json::to_value(&record).unwrap_or(serde_json::Value::Null);
        self.history.borrow_mut().push(Entry {
            accounts: accounts.iter().map(|a| Self::key(a)).collect(),
            raw,
        });
        id
    }

    fn take_failure(&self) -> Result<(), FundError> {
        match self.fail_next.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl LedgerIndex for NullLedger {
    async fn account_balance(&self, account: &AccountId) -> Result<E8s, FundError> {
        self.balance_queries.set(self.balance_queries.get() + 1);
        self.take_failure()?;
        Ok(self.balance_of(account))
    }

    async fn account_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<TransactionsPage, FundError> {
        self.history_queries.set(self.history_queries.get() + 1);
        self.take_failure()?;

        let subject = Self::key(query.account_identifier.as_str());
        let history = self.history.borrow();
        let transactions: Vec<serde_json::Value> = history
            .iter()
            .rev()
            .filter(|entry| entry.accounts.contains(&subject))
            .map(|entry| entry.raw.clone())
            .take(query.max_results as usize)
            .collect();
        let oldest_tx_id = history
            .iter()
            .find(|entry| entry.accounts.contains(&subject))
            .and_then(|entry| entry.raw.get("id"))
            .and_then(serde_json::Value::as_u64);
        Ok(TransactionsPage {
            transactions,
            oldest_tx_id,
        })
    }
}
