//! Error taxonomy shared by every crate in the workspace.

use thiserror::Error;

use crate::amount::E8s;

/// Every failure an operation can return to its caller.
///
/// Local precondition failures (`Validation`, `InsufficientBalance`,
/// `Authorization`) are raised before any network call. Backend-signaled
/// errors keep the backend's message verbatim.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FundError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: E8s, available: E8s },

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("already claimed: {0}")]
    AlreadyClaimed(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("integrity error: chunk {index} of {total} missing for file {file:?}")]
    Integrity { file: String, index: u64, total: u64 },

    #[error("{0}")]
    Rejected(String),

    #[error("config error: {0}")]
    Config(String),
}

impl FundError {
    /// Map an error message returned by the backend onto the taxonomy.
    ///
    /// The message is carried through unchanged whatever the variant.
    pub fn from_backend_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("already claimed") {
            Self::AlreadyClaimed(message)
        } else if lower.contains("not found") {
            Self::NotFound(message)
        } else if lower.contains("unauthorized")
            || lower.contains("not authorized")
            || lower.contains("only the creator")
        {
            Self::Authorization(message)
        } else {
            Self::Rejected(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_messages_map_onto_taxonomy() {
        assert!(matches!(
            FundError::from_backend_message("Proposal already claimed"),
            FundError::AlreadyClaimed(_)
        ));
        assert!(matches!(
            FundError::from_backend_message("Proposal not found"),
            FundError::NotFound(_)
        ));
        assert!(matches!(
            FundError::from_backend_message("Only the creator can claim"),
            FundError::Authorization(_)
        ));
        assert_eq!(
            FundError::from_backend_message("Insufficient funds in account"),
            FundError::Rejected("Insufficient funds in account".into())
        );
    }

    #[test]
    fn rejected_display_is_verbatim() {
        let err = FundError::from_backend_message("Transfer failed: BadFee");
        assert_eq!(err.to_string(), "Transfer failed: BadFee");
    }

    #[test]
    fn integrity_display_names_the_chunk() {
        let err = FundError::Integrity {
            file: "plan.pdf".into(),
            index: 2,
            total: 5,
        };
        assert_eq!(
            err.to_string(),
            "integrity error: chunk 2 of 5 missing for file \"plan.pdf\""
        );
    }
}
