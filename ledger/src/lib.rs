//! Ledger side of the FactFund client.
//!
//! - [`LedgerIndex`]: the external index service answering balance and
//!   history queries for an account identifier
//! - [`record`]: the wire shape of raw ledger transactions
//! - [`classifier`]: reconstructs donate/claim/fee/deposit/withdraw meaning
//!   from raw records using address and memo heuristics

pub mod classifier;
pub mod index;
pub mod record;

pub use classifier::{ClassifiedTransaction, Classifier, TxKind};
pub use index::{LedgerIndex, TransactionQuery, TransactionsPage};
pub use record::{LedgerTimestamp, LedgerTransaction, Operation, TransactionWithId};
