//! The backend actor collaborator.

use async_trait::async_trait;
use factfund_types::{
    E8s, FileMeta, FundError, Principal, Proposal, ProposalId, Subaccount, User,
};
use serde::Serialize;
use std::rc::Rc;

/// Calls the client makes on the backend actor.
///
/// Implementations normalize the backend's tagged results before returning,
/// so a backend-signaled failure arrives here as a [`FundError`] carrying the
/// backend's message verbatim. Transport failures are
/// [`FundError::Transport`].
#[async_trait(?Send)]
pub trait Backend {
    /// `getOrCreateUser`
    async fn get_or_create_user(&self) -> Result<User, FundError>;

    /// `createProposal`
    async fn create_proposal(&self, proposal: &NewProposal) -> Result<ProposalId, FundError>;

    /// `getProposal`
    async fn get_proposal(&self, id: ProposalId) -> Result<Proposal, FundError>;

    /// `getLatestProposals`
    async fn latest_proposals(&self, count: u64) -> Result<Vec<Proposal>, FundError>;

    /// `getLatestMyProposals`
    async fn latest_my_proposals(&self, count: u64) -> Result<Vec<Proposal>, FundError>;

    /// `donateToProposal`: ledger transfer from the caller into the proposal account.
    async fn donate_to_proposal(&self, id: ProposalId, amount: E8s) -> Result<(), FundError>;

    /// `claimProposal`: ledger transfer out of the proposal account to its creator.
    async fn claim_proposal(&self, id: ProposalId) -> Result<(), FundError>;

    /// `withdrawFromUserAccount`
    async fn withdraw_from_user_account(
        &self,
        amount: E8s,
        recipient: &Principal,
        subaccount: Option<Subaccount>,
    ) -> Result<(), FundError>;

    /// `uploadFileChunk`
    async fn upload_file_chunk(&self, chunk: &FileChunk<'_>) -> Result<(), FundError>;

    /// `getProposalFilesList`
    async fn proposal_files(&self, id: ProposalId) -> Result<Vec<FileMeta>, FundError>;

    /// `getProposalFileTotalChunks`
    async fn file_total_chunks(&self, id: ProposalId, file_name: &str) -> Result<u64, FundError>;

    /// `getProposalFileChunk`: `None` when the backend has no chunk at `index`.
    async fn file_chunk(
        &self,
        id: ProposalId,
        file_name: &str,
        index: u64,
    ) -> Result<Option<Vec<u8>>, FundError>;

    /// `deleteProposalFile`
    async fn delete_proposal_file(&self, id: ProposalId, file_name: &str)
        -> Result<(), FundError>;
}

/// Arguments of `createProposal`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewProposal {
    pub name: String,
    pub title: String,
    pub description: String,
    pub goal: E8s,
    pub image: Vec<u8>,
}

/// Arguments of `uploadFileChunk`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FileChunk<'a> {
    pub proposal_id: ProposalId,
    pub file_name: &'a str,
    pub bytes: &'a [u8],
    pub index: u64,
    pub mime_type: &'a str,
}

#[async_trait(?Send)]
impl<T: Backend + ?Sized> Backend for Rc<T> {
    async fn get_or_create_user(&self) -> Result<User, FundError> {
        (**self).get_or_create_user().await
    }

    async fn create_proposal(&self, proposal: &NewProposal) -> Result<ProposalId, FundError> {
        (**self).create_proposal(proposal).await
    }

    async fn get_proposal(&self, id: ProposalId) -> Result<Proposal, FundError> {
        (**self).get_proposal(id).await
    }

    async fn latest_proposals(&self, count: u64) -> Result<Vec<Proposal>, FundError> {
        (**self).latest_proposals(count).await
    }

    async fn latest_my_proposals(&self, count: u64) -> Result<Vec<Proposal>, FundError> {
        (**self).latest_my_proposals(count).await
    }

    async fn donate_to_proposal(&self, id: ProposalId, amount: E8s) -> Result<(), FundError> {
        (**self).donate_to_proposal(id, amount).await
    }

    async fn claim_proposal(&self, id: ProposalId) -> Result<(), FundError> {
        (**self).claim_proposal(id).await
    }

    async fn withdraw_from_user_account(
        &self,
        amount: E8s,
        recipient: &Principal,
        subaccount: Option<Subaccount>,
    ) -> Result<(), FundError> {
        (**self)
            .withdraw_from_user_account(amount, recipient, subaccount)
            .await
    }

    async fn upload_file_chunk(&self, chunk: &FileChunk<'_>) -> Result<(), FundError> {
        (**self).upload_file_chunk(chunk).await
    }

    async fn proposal_files(&self, id: ProposalId) -> Result<Vec<FileMeta>, FundError> {
        (**self).proposal_files(id).await
    }

    async fn file_total_chunks(&self, id: ProposalId, file_name: &str) -> Result<u64, FundError> {
        (**self).file_total_chunks(id, file_name).await
    }

    async fn file_chunk(
        &self,
        id: ProposalId,
        file_name: &str,
        index: u64,
    ) -> Result<Option<Vec<u8>>, FundError> {
        (**self).file_chunk(id, file_name, index).await
    }

    async fn delete_proposal_file(
        &self,
        id: ProposalId,
        file_name: &str,
    ) -> Result<(), FundError> {
        (**self).delete_proposal_file(id, file_name).await
    }
}
