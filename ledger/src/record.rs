//! Wire shape of raw ledger index records.

use factfund_types::{deserialize_optional, Tokens};
use serde::{Deserialize, Serialize};

/// One entry of a history page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithId {
    pub id: u64,
    pub transaction: LedgerTransaction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub operation: Operation,
    /// Legacy numeric memo; kept for completeness, not used for classification.
    #[serde(default)]
    pub memo: u64,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub icrc1_memo: Option<Vec<u8>>,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub timestamp: Option<LedgerTimestamp>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTimestamp {
    pub timestamp_nanos: u64,
}

/// Ledger operations the client understands. Any other variant fails to
/// decode and is reported as an unknown record by the classifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Transfer {
        from: String,
        to: String,
        amount: Tokens,
        #[serde(default)]
        fee: Tokens,
    },
    Mint {
        to: String,
        amount: Tokens,
    },
    Burn {
        from: String,
        amount: Tokens,
    },
}
