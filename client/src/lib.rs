//! Client-side orchestration core for FactFund.
//!
//! Provides everything a front end needs on top of the backend actor and the
//! ledger index:
//! - Balance reconciliation (total / locked / available, always fresh)
//! - Donation and claim protocols with local precondition gates
//! - Chunked upload, download and deletion of proposal attachments
//! - Proposal creation and listing with ledger-derived raised amounts
//! - Withdrawal, profile and classified transaction history
//! - Pending/success/error lifecycle reporting
//!
//! The client never caches ledger state: every operation that needs a balance
//! queries it, and every operation that moves funds waits the settle delay
//! and queries again.

pub mod backend;
pub mod claim;
pub mod client;
pub mod config;
pub mod donation;
pub mod lifecycle;
pub mod profile;
pub mod proposal;
pub mod reconciler;
pub mod transfer;
pub mod withdraw;

pub use backend::{Backend, FileChunk, NewProposal};
pub use claim::{check_claim, ClaimOutcome, ClaimReceipt};
pub use client::FundingClient;
pub use config::ClientConfig;
pub use donation::{check_donation, DonationReceipt};
pub use lifecycle::{track, Notifier, OperationEvent, TracingNotifier};
pub use profile::Profile;
pub use proposal::{validate_draft, ClaimState, ImageUpload, ProposalDraft, ProposalView};
pub use reconciler::{reconcile, Balance};
pub use transfer::{DownloadedFile, FileUpload, UploadSummary, CHUNK_SIZE};
