//! Nullable collaborators for deterministic testing.
//!
//! In-memory stand-ins for the backend actor and the ledger index that:
//! - Keep balances and history in a single shared ledger
//! - Enforce the same rules the real backend does
//! - Record every call for assertions
//! - Can be told to fail a specific call
//!
//! Usage: build a [`NullLedger`], share it with a [`NullBackend`] and hand
//! both to a `FundingClient`.

pub mod backend;
pub mod ledger;
pub mod notifier;

pub use backend::NullBackend;
pub use ledger::NullLedger;
pub use notifier::RecordingNotifier;

use factfund_types::{AccountId, E8s, Principal, User};

/// A user record with a deterministic account derived from `seed`.
pub fn test_user(principal: &str, seed: u8) -> User {
    User {
        principal: Principal::new(principal),
        account_id: AccountId::new(format!("{seed:02x}").repeat(32)),
        locked_balance: E8s::ZERO,
    }
}
