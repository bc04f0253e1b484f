//! Principals, account identifiers and subaccounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FundError;

/// Textual principal of an authenticated caller (e.g. `aaaaa-aa`).
///
/// Opaque to the client; only compared for equality in authorization checks.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Principal {
    type Err = FundError;

    /// Accepts the dashed lowercase base32 text form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let well_formed = !s.is_empty()
            && !s.starts_with('-')
            && !s.ends_with('-')
            && s.bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(FundError::Validation(format!("invalid principal: {s:?}")))
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ledger account identifier: 32 bytes, hex encoded.
///
/// Balances and transfers are tracked against these, including each
/// proposal's dedicated account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an identifier as received from a collaborator, without validation.
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Parse and validate a hex account identifier.
    pub fn from_hex(s: &str) -> Result<Self, FundError> {
        let s = s.trim();
        let bytes = hex::decode(s)
            .map_err(|e| FundError::Validation(format!("invalid account identifier: {e}")))?;
        if bytes.len() != 32 {
            return Err(FundError::Validation(format!(
                "account identifier must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(s.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a textual address from a ledger record names this account.
    pub fn matches(&self, address: &str) -> bool {
        self.0.eq_ignore_ascii_case(address)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 32-byte subaccount selecting one account under a principal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subaccount(pub [u8; 32]);

impl FromStr for Subaccount {
    type Err = FundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut bytes)
            .map_err(|e| FundError::Validation(format!("invalid subaccount: {e}")))?;
        Ok(Self(bytes))
    }
}
