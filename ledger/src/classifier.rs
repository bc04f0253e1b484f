//! Transaction classification.
//!
//! The ledger records transfers between account identifiers; it does not know
//! what a donation or a claim is. The classifier rebuilds that meaning from the
//! position of the subject account in the transfer and from keywords the
//! backend writes into the memo.
//!
//! Priority for transfers:
//! 1. subject is sender and memo mentions `claim` → [`TxKind::Claim`]
//! 2. memo mentions `fee` → [`TxKind::Fee`]
//! 3. memo mentions `donate` → [`TxKind::Donate`]
//! 4. subject is sender → [`TxKind::Withdraw`]
//! 5. subject is recipient → [`TxKind::Deposit`]
//!
//! Mints are always deposits and burns are always burns.

use factfund_types::{AccountId, E8s, TimestampMs};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::{Operation, TransactionWithId};

/// Counterparty shown for minted funds.
pub const MINTING_ACCOUNT: &str = "Minting Account";
/// Counterparty shown for burned funds.
pub const BURNING_ACCOUNT: &str = "Burning Account";
/// Placeholder address on records that failed to decode.
pub const ERROR_ACCOUNT: &str = "Error";

const CLAIM_KEYWORD: &str = "claim";
const FEE_KEYWORD: &str = "fee";
const DONATE_KEYWORD: &str = "donate";

/// Semantic type of a ledger transaction from the subject's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Donate,
    Claim,
    Fee,
    Deposit,
    Withdraw,
    Burn,
    Unknown,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donate => "donate",
            Self::Claim => "claim",
            Self::Fee => "fee",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Burn => "burn",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable label for history listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Donate => "Donate To Proposal",
            Self::Claim => "Funds Claim from Proposal",
            Self::Fee => "Fee",
            Self::Deposit => "Deposit",
            Self::Withdraw => "Withdraw",
            Self::Burn => "Burn",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized history entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassifiedTransaction {
    /// Ledger transaction id; `None` when the record was too broken to carry one.
    pub id: Option<u64>,
    pub kind: TxKind,
    pub from: String,
    pub to: String,
    pub amount: E8s,
    pub memo: String,
    pub timestamp: TimestampMs,
}

/// Classifies records relative to one subject account.
///
/// `now` is the fallback timestamp for records without one, fixed by the
/// caller so a batch is classified against a single instant.
pub struct Classifier<'a> {
    subject: &'a AccountId,
    now: TimestampMs,
}

impl<'a> Classifier<'a> {
    pub fn new(subject: &'a AccountId, now: TimestampMs) -> Self {
        Self { subject, now }
    }

    /// Classify a decoded record.
    pub fn classify(&self, record: &TransactionWithId) -> ClassifiedTransaction {
        let tx = &record.transaction;
        let memo = tx
            .icrc1_memo
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default();
        let timestamp = tx
            .timestamp
            .map(|ts| TimestampMs::from_nanos(ts.timestamp_nanos))
            .unwrap_or(self.now);

        let (kind, from, to, amount) = match &tx.operation {
            Operation::Transfer {
                from, to, amount, ..
            } => (
                self.transfer_kind(from, to, &memo),
                from.clone(),
                to.clone(),
                amount.e8s,
            ),
            Operation::Mint { to, amount } => (
                TxKind::Deposit,
                MINTING_ACCOUNT.to_string(),
                to.clone(),
                amount.e8s,
            ),
            Operation::Burn { from, amount } => (
                TxKind::Burn,
                from.clone(),
                BURNING_ACCOUNT.to_string(),
                amount.e8s,
            ),
        };

        ClassifiedTransaction {
            id: Some(record.id),
            kind,
            from,
            to,
            amount,
            memo,
            timestamp,
        }
    }

    /// Decode and classify one raw record. A record that does not decode
    /// yields an [`TxKind::Unknown`] placeholder instead of an error.
    pub fn classify_raw(&self, raw: &serde_json::Value) -> ClassifiedTransaction {
        match TransactionWithId::deserialize(raw) {
            Ok(record) => self.classify(&record),
            Err(e) => {
                let id = raw.get("id").and_then(serde_json::Value::as_u64);
                tracing::warn!(?id, "failed to decode ledger transaction: {e}");
                self.unknown(id)
            }
        }
    }

    /// Classify a whole page, isolating per-record failures.
    pub fn classify_all(&self, raws: &[serde_json::Value]) -> Vec<ClassifiedTransaction> {
        raws.iter().map(|raw| self.classify_raw(raw)).collect()
    }

    fn transfer_kind(&self, from: &str, to: &str, memo: &str) -> TxKind {
        let memo = memo.to_lowercase();
        let is_sender = self.subject.matches(from);

        if is_sender && memo.contains(CLAIM_KEYWORD) {
            TxKind::Claim
        } else if memo.contains(FEE_KEYWORD) {
            TxKind::Fee
        } else if memo.contains(DONATE_KEYWORD) {
            TxKind::Donate
        } else if is_sender {
            TxKind::Withdraw
        } else if self.subject.matches(to) {
            TxKind::Deposit
        } else {
            TxKind::Unknown
        }
    }

    fn unknown(&self, id: Option<u64>) -> ClassifiedTransaction {
        ClassifiedTransaction {
            id,
            kind: TxKind::Unknown,
            from: ERROR_ACCOUNT.to_string(),
            to: ERROR_ACCOUNT.to_string(),
            amount: E8s::ZERO,
            memo: String::new(),
            timestamp: self.now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ME: &str = "aa00000000000000000000000000000000000000000000000000000000000000";
    const OTHER: &str = "bb00000000000000000000000000000000000000000000000000000000000000";
    const NOW: TimestampMs = TimestampMs::new(1_700_000_000_000);

    fn transfer(from: &str, to: &str, e8s: u64, memo: Option<&str>) -> serde_json::Value {
        json!({
            "id": 11,
            "transaction": {
                "memo": 0,
                "icrc1_memo": memo.map(|m| vec![m.as_bytes().to_vec()]).unwrap_or_default(),
                "operation": {"Transfer": {
                    "from": from,
                    "to": to,
                    "amount": {"e8s": e8s},
                    "fee": {"e8s": 10_000}
                }},
                "timestamp": [{"timestamp_nanos": 1_690_000_000_000_000_000u64}]
            }
        })
    }

    fn classify(raw: serde_json::Value) -> ClassifiedTransaction {
        let me = AccountId::new(ME);
        Classifier::new(&me, NOW).classify_raw(&raw)
    }

    #[test]
    fn sender_with_claim_memo_is_claim() {
        let tx = classify(transfer(ME, OTHER, 500, Some("claim proposal 3")));
        assert_eq!(tx.kind, TxKind::Claim);
        assert_eq!(tx.id, Some(11));
        assert_eq!(tx.amount, E8s::new(500));
        assert_eq!(tx.memo, "claim proposal 3");
    }

    #[test]
    fn recipient_without_keyword_is_deposit() {
        let tx = classify(transfer(OTHER, ME, 500, None));
        assert_eq!(tx.kind, TxKind::Deposit);
        assert_eq!(tx.from, OTHER);
        assert_eq!(tx.to, ME);
    }

    #[test]
    fn claim_keyword_requires_subject_as_sender() {
        // Received claim payouts fall through to the generic rules.
        let tx = classify(transfer(OTHER, ME, 500, Some("claim")));
        assert_eq!(tx.kind, TxKind::Deposit);
    }

    #[test]
    fn fee_takes_priority_over_donate() {
        let tx = classify(transfer(ME, OTHER, 1, Some("donate fee")));
        assert_eq!(tx.kind, TxKind::Fee);
    }

    #[test]
    fn donate_keyword_matches_either_direction() {
        assert_eq!(
            classify(transfer(ME, OTHER, 1, Some("Donate"))).kind,
            TxKind::Donate
        );
        assert_eq!(
            classify(transfer(OTHER, ME, 1, Some("donate"))).kind,
            TxKind::Donate
        );
    }

    #[test]
    fn sender_without_keyword_is_withdraw() {
        assert_eq!(
            classify(transfer(ME, OTHER, 1, Some("rent"))).kind,
            TxKind::Withdraw
        );
    }

    #[test]
    fn unrelated_transfer_is_unknown() {
        let third = "cc00000000000000000000000000000000000000000000000000000000000000";
        assert_eq!(
            classify(transfer(OTHER, third, 1, None)).kind,
            TxKind::Unknown
        );
    }

    #[test]
    fn subject_matching_ignores_hex_case() {
        let tx = classify(transfer(&ME.to_uppercase(), OTHER, 1, None));
        assert_eq!(tx.kind, TxKind::Withdraw);
    }

    #[test]
    fn mint_and_burn_use_sentinel_accounts() {
        let mint = classify(json!({
            "id": 1,
            "transaction": {"operation": {"Mint": {"to": ME, "amount": {"e8s": 7}}}}
        }));
        assert_eq!(mint.kind, TxKind::Deposit);
        assert_eq!(mint.from, MINTING_ACCOUNT);
        assert_eq!(mint.to, ME);
        assert_eq!(mint.amount, E8s::new(7));

        let burn = classify(json!({
            "id": 2,
            "transaction": {"operation": {"Burn": {"from": ME, "amount": {"e8s": 3}}}}
        }));
        assert_eq!(burn.kind, TxKind::Burn);
        assert_eq!(burn.from, ME);
        assert_eq!(burn.to, BURNING_ACCOUNT);
    }

    #[test]
    fn timestamp_is_converted_to_millis() {
        let tx = classify(transfer(OTHER, ME, 1, None));
        assert_eq!(tx.timestamp, TimestampMs::new(1_690_000_000_000));
    }

    #[test]
    fn missing_timestamp_falls_back_to_now() {
        let tx = classify(json!({
            "id": 1,
            "transaction": {
                "operation": {"Mint": {"to": ME, "amount": {"e8s": 7}}},
                "timestamp": []
            }
        }));
        assert_eq!(tx.timestamp, NOW);
    }

    #[test]
    fn invalid_utf8_memo_is_decoded_lossily() {
        let mut raw = transfer(ME, OTHER, 1, None);
        raw["transaction"]["icrc1_memo"] = json!([[0xff, b'f', b'e', b'e']]);
        let tx = classify(raw);
        assert_eq!(tx.kind, TxKind::Fee);
        assert!(tx.memo.ends_with("fee"));
    }

    #[test]
    fn malformed_records_do_not_abort_the_batch() {
        let me = AccountId::new(ME);
        let raws = vec![
            transfer(OTHER, ME, 5, None),
            json!({"id": 12, "transaction": {"operation": {"Approve": {"from": ME}}}}),
            json!("garbage"),
            transfer(ME, OTHER, 6, Some("donate")),
        ];

        let txs = Classifier::new(&me, NOW).classify_all(&raws);

        assert_eq!(txs.len(), 4);
        assert_eq!(txs[0].kind, TxKind::Deposit);
        assert_eq!(txs[1].kind, TxKind::Unknown);
        assert_eq!(txs[1].id, Some(12));
        assert_eq!(txs[1].from, ERROR_ACCOUNT);
        assert_eq!(txs[1].amount, E8s::ZERO);
        assert_eq!(txs[1].timestamp, NOW);
        assert_eq!(txs[2].kind, TxKind::Unknown);
        assert_eq!(txs[2].id, None);
        assert_eq!(txs[3].kind, TxKind::Donate);
    }

    #[test]
    fn labels() {
        assert_eq!(TxKind::Claim.label(), "Funds Claim from Proposal");
        assert_eq!(TxKind::Donate.to_string(), "donate");
    }
}
