//! Backend actor over the HTTP gateway.

use async_trait::async_trait;
use factfund_client::{Backend, FileChunk, NewProposal};
use factfund_types::{
    E8s, FileMeta, FundError, Principal, Proposal, ProposalId, Subaccount, User,
};
use serde::Serialize;
use serde_json::json;

use crate::client::GatewayClient;
use crate::wire::MaybeChunk;

pub struct HttpBackend {
    gateway: GatewayClient,
}

impl HttpBackend {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }
}

#[derive(Serialize)]
struct FileArgs<'a> {
    id: ProposalId,
    file_name: &'a str,
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn get_or_create_user(&self) -> Result<User, FundError> {
        self.gateway.call("getOrCreateUser", &json!({})).await
    }

    async fn create_proposal(&self, proposal: &NewProposal) -> Result<ProposalId, FundError> {
        self.gateway.call_result("createProposal", proposal).await
    }

    async fn get_proposal(&self, id: ProposalId) -> Result<Proposal, FundError> {
        self.gateway
            .call_result("getProposal", &json!({ "id": id }))
            .await
    }

    async fn latest_proposals(&self, count: u64) -> Result<Vec<Proposal>, FundError> {
        self.gateway
            .call_result("getLatestProposals", &json!({ "count": count }))
            .await
    }

    async fn latest_my_proposals(&self, count: u64) -> Result<Vec<Proposal>, FundError> {
        self.gateway
            .call_result("getLatestMyProposals", &json!({ "count": count }))
            .await
    }

    async fn donate_to_proposal(&self, id: ProposalId, amount: E8s) -> Result<(), FundError> {
        self.gateway
            .call_result("donateToProposal", &json!({ "id": id, "amount": amount }))
            .await
    }

    async fn claim_proposal(&self, id: ProposalId) -> Result<(), FundError> {
        self.gateway
            .call_result("claimProposal", &json!({ "id": id }))
            .await
    }

    async fn withdraw_from_user_account(
        &self,
        amount: E8s,
        recipient: &Principal,
        subaccount: Option<Subaccount>,
    ) -> Result<(), FundError> {
        let args = json!({
            "amount": amount,
            "recipient": recipient,
            "subaccount": subaccount,
        });
        self.gateway
            .call_result("withdrawFromUserAccount", &args)
            .await
    }

    async fn upload_file_chunk(&self, chunk: &FileChunk<'_>) -> Result<(), FundError> {
        self.gateway.call_result("uploadFileChunk", chunk).await
    }

    async fn proposal_files(&self, id: ProposalId) -> Result<Vec<FileMeta>, FundError> {
        self.gateway
            .call("getProposalFilesList", &json!({ "id": id }))
            .await
    }

    async fn file_total_chunks(&self, id: ProposalId, file_name: &str) -> Result<u64, FundError> {
        self.gateway
            .call("getProposalFileTotalChunks", &FileArgs { id, file_name })
            .await
    }

    async fn file_chunk(
        &self,
        id: ProposalId,
        file_name: &str,
        index: u64,
    ) -> Result<Option<Vec<u8>>, FundError> {
        let chunk: MaybeChunk = self
            .gateway
            .call(
                "getProposalFileChunk",
                &json!({ "id": id, "file_name": file_name, "index": index }),
            )
            .await?;
        Ok(chunk.into_bytes())
    }

    async fn delete_proposal_file(
        &self,
        id: ProposalId,
        file_name: &str,
    ) -> Result<(), FundError> {
        self.gateway
            .call_result("deleteProposalFile", &FileArgs { id, file_name })
            .await
    }
}
