//! Records returned by the backend actor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amount::{E8s, Tokens};
use crate::error::FundError;
use crate::identity::{AccountId, Principal};

/// Sequential proposal identifier assigned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(u64);

impl ProposalId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl FromStr for ProposalId {
    type Err = FundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(Self)
            .map_err(|_| FundError::Validation(format!("invalid proposal id: {s:?}")))
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A funding proposal as stored by the backend.
///
/// The raised amount is deliberately absent: it is the ledger balance of
/// `account_id` and must be queried every time it is needed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(alias = "index")]
    pub id: ProposalId,
    pub created_by: Principal,
    #[serde(rename = "accountId")]
    pub account_id: AccountId,
    pub amount_required: E8s,
    #[serde(default)]
    pub claimed: bool,
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Vec<u8>,
    #[serde(default)]
    pub donations: Vec<DonationRecord>,
}

/// A donation the backend recorded against a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub account: String,
    pub amount: Tokens,
    pub transaction_id: u64,
}

/// The caller's user record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub principal: Principal,
    #[serde(rename = "accountId")]
    pub account_id: AccountId,
    /// Reserved against the account for proposal creation fees.
    #[serde(default)]
    pub locked_balance: E8s,
}

/// One entry of a proposal's attachment list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
}
