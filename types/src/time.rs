//! Wall-clock timestamps in milliseconds.
//!
//! The ledger reports nanoseconds since the Unix epoch; the client works in
//! milliseconds, which is what display code expects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Milliseconds since the Unix epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimestampMs(u64);

impl TimestampMs {
    pub const EPOCH: Self = Self(0);

    pub const fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Truncating conversion from ledger nanoseconds.
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos / NANOS_PER_MILLI)
    }

    /// The current system time. A clock set before the epoch reads as `EPOCH`.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimestampMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
