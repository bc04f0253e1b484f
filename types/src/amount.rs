//! Ledger token amounts.
//!
//! Amounts are fixed-point integers in e8s (10^-8 of one token) to avoid
//! floating-point errors. Decimal token units only appear at the presentation
//! edge: `Display`, [`E8s::to_tokens`] and [`E8s::parse_tokens`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FundError;

/// Number of e8s in one whole token.
pub const E8S_PER_TOKEN: u64 = 100_000_000;

/// Fractional digits of a token amount.
const DECIMALS: usize = 8;

/// An amount of ledger tokens in e8s.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct E8s(u64);

impl E8s {
    pub const ZERO: Self = Self(0);

    pub const fn new(e8s: u64) -> Self {
        Self(e8s)
    }

    /// Whole tokens, saturating at `u64::MAX` e8s.
    pub const fn from_tokens(tokens: u64) -> Self {
        Self(tokens.saturating_mul(E8S_PER_TOKEN))
    }

    pub fn e8s(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Decimal token value for display only. Never compare or validate with it.
    pub fn to_tokens(&self) -> f64 {
        self.0 as f64 / E8S_PER_TOKEN as f64
    }

    /// The amount as a decimal token string with all eight fractional digits.
    pub fn to_decimal_string(&self) -> String {
        format!(
            "{}.{:0width$}",
            self.0 / E8S_PER_TOKEN,
            self.0 % E8S_PER_TOKEN,
            width = DECIMALS
        )
    }

    /// Parse a decimal token string (`"1"`, `"0.5"`, `".25"`, `"12.00000001"`)
    /// into e8s exactly. At most eight fractional digits are accepted.
    pub fn parse_tokens(input: &str) -> Result<Self, FundError> {
        let s = input.trim();
        let invalid = || FundError::Validation(format!("invalid token amount: {input:?}"));

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac.len() > DECIMALS {
            return Err(FundError::Validation(format!(
                "token amount {input:?} has more than {DECIMALS} decimal places"
            )));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_e8s: u64 = if frac.is_empty() {
            0
        } else {
            format!("{frac:0<width$}", width = DECIMALS)
                .parse()
                .map_err(|_| invalid())?
        };

        whole
            .checked_mul(E8S_PER_TOKEN)
            .and_then(|w| w.checked_add(frac_e8s))
            .map(Self)
            .ok_or_else(|| FundError::Validation(format!("token amount {input:?} is too large")))
    }
}

impl From<u64> for E8s {
    fn from(e8s: u64) -> Self {
        Self(e8s)
    }
}

impl FromStr for E8s {
    type Err = FundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_tokens(s)
    }
}

impl fmt::Display for E8s {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ICP", self.to_decimal_string())
    }
}

/// The ledger's record form of an amount: `{"e8s": n}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub e8s: E8s,
}

impl From<Tokens> for E8s {
    fn from(tokens: Tokens) -> Self {
        tokens.e8s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_tokens() {
        assert_eq!(E8s::parse_tokens("1").unwrap(), E8s::new(100_000_000));
        assert_eq!(E8s::parse_tokens("0.5").unwrap(), E8s::new(50_000_000));
        assert_eq!(E8s::parse_tokens(".25").unwrap(), E8s::new(25_000_000));
        assert_eq!(E8s::parse_tokens("1.").unwrap(), E8s::new(100_000_000));
        assert_eq!(E8s::parse_tokens("0.00000001").unwrap(), E8s::new(1));
        assert_eq!(
            E8s::parse_tokens(" 12.34567891 ").unwrap(),
            E8s::new(1_234_567_891)
        );
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", ".", "abc", "1.2.3", "-1", "1e8", "0.000000001", "1,5"] {
            let err = E8s::parse_tokens(bad).unwrap_err();
            assert!(matches!(err, FundError::Validation(_)), "{bad:?} accepted");
        }
    }

    #[test]
    fn rejects_overflowing_amounts() {
        assert!(E8s::parse_tokens("184467440737.09551616").is_err());
        assert_eq!(
            E8s::parse_tokens("184467440737.09551615").unwrap(),
            E8s::new(u64::MAX)
        );
    }

    #[test]
    fn saturating_arithmetic_never_wraps() {
        assert_eq!(E8s::new(u64::MAX).saturating_add(E8s::new(1)), E8s::new(u64::MAX));
        assert_eq!(E8s::new(1).saturating_sub(E8s::new(2)), E8s::ZERO);
        assert_eq!(E8s::new(2).saturating_add(E8s::new(3)), E8s::new(5));
    }

    #[test]
    fn display_uses_eight_decimals() {
        assert_eq!(E8s::new(150_000_000).to_string(), "1.50000000 ICP");
        assert_eq!(E8s::new(1).to_decimal_string(), "0.00000001");
        assert_eq!(E8s::ZERO.to_decimal_string(), "0.00000000");
    }

    #[test]
    fn saturating_sub_floors_at_zero() {
        assert_eq!(E8s::new(5).saturating_sub(E8s::new(9)), E8s::ZERO);
        assert_eq!(E8s::new(9).saturating_sub(E8s::new(5)), E8s::new(4));
    }

    #[test]
    fn tokens_record_deserializes() {
        let t: Tokens = serde_json::from_str(r#"{"e8s": 10000}"#).unwrap();
        assert_eq!(E8s::from(t), E8s::new(10_000));
    }
}
