//! The orchestration handle shared by every protocol.

use factfund_ledger::LedgerIndex;
use factfund_types::E8s;
use std::time::Duration;

use crate::backend::Backend;
use crate::config::ClientConfig;

// ── FundingClient ──────────────────────────────────────────────────────

/// Client over a backend actor and a ledger index.
///
/// The protocol operations live in their own modules (`donation`, `claim`,
/// `transfer`, ...) as inherent methods on this type. Nothing ledger-derived
/// is stored here.
pub struct FundingClient<B, L> {
    backend: B,
    ledger: L,
    settle_delay: Duration,
    pub(crate) proposal_fee: E8s,
    pub(crate) history_limit: u64,
}

impl<B: Backend, L: LedgerIndex> FundingClient<B, L> {
    pub fn new(backend: B, ledger: L, config: &ClientConfig) -> Self {
        Self {
            backend,
            ledger,
            settle_delay: config.settle_delay(),
            proposal_fee: config.proposal_fee_e8s,
            history_limit: config.history_limit,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Wait for ledger finality after a transfer.
    pub(crate) async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tracing::debug!(
                delay_ms = self.settle_delay.as_millis() as u64,
                "waiting for ledger to settle"
            );
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}
