//! Fundamental types for the FactFund client.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! e8s amounts, principals and account identifiers, proposal/user/file records,
//! the canonical tagged result and the error taxonomy.

pub mod amount;
pub mod error;
pub mod identity;
pub mod proposal;
pub mod result;
pub mod time;

pub use amount::{E8s, Tokens, E8S_PER_TOKEN};
pub use error::FundError;
pub use identity::{AccountId, Principal, Subaccount};
pub use proposal::{DonationRecord, FileMeta, Proposal, ProposalId, User};
pub use result::{deserialize_optional, ErrorPayload, TaggedResult};
pub use time::TimestampMs;
