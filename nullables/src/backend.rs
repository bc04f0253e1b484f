//! Nullable backend actor.
//!
//! Keeps proposals and attachments in memory and moves funds on a shared
//! [`NullLedger`], applying the same authoritative checks as the real
//! backend and answering with the same error messages.
//!
//! Creating a proposal locks the creation fee on the creator's account until
//! the proposal is claimed.

use async_trait::async_trait;
use factfund_client::{Backend, FileChunk, NewProposal};
use factfund_types::{
    AccountId, DonationRecord, E8s, FileMeta, FundError, Principal, Proposal, ProposalId,
    Subaccount, Tokens, User,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::ledger::NullLedger;

struct StoredFile {
    proposal: ProposalId,
    meta: FileMeta,
    chunks: Vec<Option<Vec<u8>>>,
}

/// An in-memory backend actor bound to one calling principal at a time.
pub struct NullBackend {
    ledger: Rc<NullLedger>,
    caller: RefCell<Principal>,
    users: RefCell<HashMap<Principal, User>>,
    proposals: RefCell<BTreeMap<ProposalId, Proposal>>,
    files: RefCell<Vec<StoredFile>>,
    next_proposal: Cell<u64>,
    calls: RefCell<Vec<String>>,
    fail_method: RefCell<Option<(String, FundError)>>,
    fail_chunk_at: Cell<Option<u64>>,
    claim_flips_flag: Cell<bool>,
    proposal_fee: Cell<E8s>,
    fee_locks: RefCell<HashMap<ProposalId, (Principal, E8s)>>,
}

impl NullBackend {
    /// A backend whose caller is `user`.
    pub fn new(ledger: Rc<NullLedger>, user: User) -> Self {
        let caller = user.principal.clone();
        let mut users = HashMap::new();
        users.insert(caller.clone(), user);
        Self {
            ledger,
            caller: RefCell::new(caller),
            users: RefCell::new(users),
            proposals: RefCell::new(BTreeMap::new()),
            files: RefCell::new(Vec::new()),
            next_proposal: Cell::new(0),
            calls: RefCell::new(Vec::new()),
            fail_method: RefCell::new(None),
            fail_chunk_at: Cell::new(None),
            claim_flips_flag: Cell::new(true),
            proposal_fee: Cell::new(E8s::from_tokens(1)),
            fee_locks: RefCell::new(HashMap::new()),
        }
    }

    pub fn ledger(&self) -> &NullLedger {
        &self.ledger
    }

    /// Register `user` (if new) and make them the caller.
    pub fn set_caller(&self, user: User) {
        let principal = user.principal.clone();
        self.users
            .borrow_mut()
            .entry(principal.clone())
            .or_insert(user);
        *self.caller.borrow_mut() = principal;
    }

    pub fn set_locked_balance(&self, principal: &Principal, locked: E8s) {
        if let Some(user) = self.users.borrow_mut().get_mut(principal) {
            user.locked_balance = locked;
        }
    }

    /// Fee locked by `createProposal`.
    pub fn set_proposal_fee(&self, fee: E8s) {
        self.proposal_fee.set(fee);
    }

    /// Insert a proposal directly, returning its id.
    pub fn seed_proposal(&self, creator: &Principal, required: E8s, title: &str) -> ProposalId {
        let id = self.allocate_id();
        let proposal = Proposal {
            id,
            created_by: creator.clone(),
            account_id: proposal_account(id),
            amount_required: required,
            claimed: false,
            name: creator.as_str().to_string(),
            title: title.to_string(),
            description: format!("{title} (seeded)"),
            image: Vec::new(),
            donations: Vec::new(),
        };
        self.proposals.borrow_mut().insert(id, proposal);
        id
    }

    pub fn stored_proposal(&self, id: ProposalId) -> Option<Proposal> {
        self.proposals.borrow().get(&id).cloned()
    }

    /// Make the next call to `method` fail with `error`.
    pub fn fail_method(&self, method: &str, error: FundError) {
        *self.fail_method.borrow_mut() = Some((method.to_string(), error));
    }

    /// Reject every upload of chunk `index`.
    pub fn fail_chunk_at(&self, index: Option<u64>) {
        self.fail_chunk_at.set(index);
    }

    /// When disabled, `claimProposal` moves the funds but leaves the claimed
    /// flag unset.
    pub fn claim_flips_flag(&self, enabled: bool) {
        self.claim_flips_flag.set(enabled);
    }

    /// Forget one stored chunk so a later download finds a gap.
    pub fn drop_chunk(&self, id: ProposalId, file_name: &str, index: u64) {
        let mut files = self.files.borrow_mut();
        if let Some(file) = files
            .iter_mut()
            .find(|f| f.proposal == id && f.meta.name == file_name)
        {
            if let Some(slot) = file.chunks.get_mut(index as usize) {
                *slot = None;
            }
        }
    }

    /// Method names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|m| *m == method).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn enter(&self, method: &str) -> Result<(), FundError> {
        self.calls.borrow_mut().push(method.to_string());
        let mut fail = self.fail_method.borrow_mut();
        if fail.as_ref().is_some_and(|(m, _)| m == method) {
            if let Some((_, error)) = fail.take() {
                tracing::debug!(method, %error, "injected failure");
                return Err(error);
            }
        }
        Ok(())
    }

    fn allocate_id(&self) -> ProposalId {
        let id = self.next_proposal.get();
        self.next_proposal.set(id + 1);
        ProposalId::new(id)
    }

    fn caller(&self) -> User {
        let principal = self.caller.borrow().clone();
        self.users
            .borrow_mut()
            .entry(principal.clone())
            .or_insert_with(|| User {
                account_id: AccountId::new(format!("{:0>64}", hex_of(principal.as_str()))),
                principal,
                locked_balance: E8s::ZERO,
            })
            .clone()
    }

    fn find(&self, id: ProposalId) -> Result<Proposal, FundError> {
        self.proposals
            .borrow()
            .get(&id)
            .cloned()
            .ok_or_else(|| FundError::from_backend_message("Proposal not found"))
    }
}

/// Dedicated ledger account of proposal `id`.
pub fn proposal_account(id: ProposalId) -> AccountId {
    AccountId::new(format!("{:064x}", (0xfu128 << 124) | id.get() as u128))
}

/// Deterministic account hex for a principal, at most 64 digits.
fn hex_of(text: &str) -> String {
    let hex: String = text.bytes().map(|b| format!("{b:02x}")).collect();
    hex.chars().take(64).collect()
}

fn rejected(message: &str) -> FundError {
    FundError::from_backend_message(message)
}

#[async_trait(?Send)]
impl Backend for NullBackend {
    async fn get_or_create_user(&self) -> Result<User, FundError> {
        self.enter("getOrCreateUser")?;
        Ok(self.caller())
    }

    async fn create_proposal(&self, proposal: &NewProposal) -> Result<ProposalId, FundError> {
        self.enter("createProposal")?;
        let creator = self.caller();
        let fee = self.proposal_fee.get();
        let available = self
            .ledger
            .balance_of(&creator.account_id)
            .saturating_sub(creator.locked_balance);
        if fee > available {
            return Err(rejected("Insufficient available balance"));
        }

        let id = self.allocate_id();
        self.set_locked_balance(
            &creator.principal,
            creator.locked_balance.saturating_add(fee),
        );
        self.fee_locks
            .borrow_mut()
            .insert(id, (creator.principal.clone(), fee));
        self.proposals.borrow_mut().insert(
            id,
            Proposal {
                id,
                created_by: creator.principal,
                account_id: proposal_account(id),
                amount_required: proposal.goal,
                claimed: false,
                name: proposal.name.clone(),
                title: proposal.title.clone(),
                description: proposal.description.clone(),
                image: proposal.image.clone(),
                donations: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn get_proposal(&self, id: ProposalId) -> Result<Proposal, FundError> {
        self.enter("getProposal")?;
        self.find(id)
    }

    async fn latest_proposals(&self, count: u64) -> Result<Vec<Proposal>, FundError> {
        self.enter("getLatestProposals")?;
        Ok(self
            .proposals
            .borrow()
            .values()
            .rev()
            .take(count as usize)
            .cloned()
            .collect())
    }

    async fn latest_my_proposals(&self, count: u64) -> Result<Vec<Proposal>, FundError> {
        self.enter("getLatestMyProposals")?;
        let caller = self.caller.borrow().clone();
        Ok(self
            .proposals
            .borrow()
            .values()
            .rev()
            .filter(|p| p.created_by == caller)
            .take(count as usize)
            .cloned()
            .collect())
    }

    async fn donate_to_proposal(&self, id: ProposalId, amount: E8s) -> Result<(), FundError> {
        self.enter("donateToProposal")?;
        let donor = self.caller();
        let proposal = self.find(id)?;
        if proposal.claimed {
            return Err(rejected("Proposal already claimed"));
        }
        let raised = self.ledger.balance_of(&proposal.account_id);
        if amount > proposal.amount_required.saturating_sub(raised) {
            return Err(rejected("Donation exceeds the remaining goal"));
        }

        let tx = self
            .ledger
            .transfer(&donor.account_id, &proposal.account_id, amount, "donate")?;
        if let Some(p) = self.proposals.borrow_mut().get_mut(&id) {
            p.donations.push(DonationRecord {
                account: donor.account_id.as_str().to_string(),
                amount: Tokens { e8s: amount },
                transaction_id: tx,
            });
        }
        Ok(())
    }

    async fn claim_proposal(&self, id: ProposalId) -> Result<(), FundError> {
        self.enter("claimProposal")?;
        let caller = self.caller();
        let proposal = self.find(id)?;
        if proposal.created_by != caller.principal {
            return Err(rejected("Only the creator can claim this proposal"));
        }
        if proposal.claimed {
            return Err(rejected("Proposal already claimed"));
        }
        let raised = self.ledger.balance_of(&proposal.account_id);
        if raised < proposal.amount_required || raised.is_zero() {
            return Err(rejected("Goal not reached yet"));
        }

        self.ledger
            .transfer(&proposal.account_id, &caller.account_id, raised, "claim")?;
        if self.claim_flips_flag.get() {
            if let Some(p) = self.proposals.borrow_mut().get_mut(&id) {
                p.claimed = true;
            }
        }
        let released = self.fee_locks.borrow_mut().remove(&id);
        if let Some((creator, fee)) = released {
            if let Some(user) = self.users.borrow_mut().get_mut(&creator) {
                user.locked_balance = user.locked_balance.saturating_sub(fee);
            }
        }
        Ok(())
    }

    async fn withdraw_from_user_account(
        &self,
        amount: E8s,
        recipient: &Principal,
        _subaccount: Option<Subaccount>,
    ) -> Result<(), FundError> {
        self.enter("withdrawFromUserAccount")?;
        let user = self.caller();
        let available = self
            .ledger
            .balance_of(&user.account_id)
            .saturating_sub(user.locked_balance);
        if amount > available {
            return Err(rejected("Insufficient available balance"));
        }
        let destination = AccountId::new(format!("{:0>64}", hex_of(recipient.as_str())));
        self.ledger
            .transfer(&user.account_id, &destination, amount, "")?;
        Ok(())
    }

    async fn upload_file_chunk(&self, chunk: &FileChunk<'_>) -> Result<(), FundError> {
        self.enter("uploadFileChunk")?;
        self.find(chunk.proposal_id)?;
        if self.fail_chunk_at.get() == Some(chunk.index) {
            return Err(rejected("Chunk upload failed"));
        }

        let mut files = self.files.borrow_mut();
        let position = files
            .iter()
            .position(|f| f.proposal == chunk.proposal_id && f.meta.name == chunk.file_name);
        let file = match position {
            Some(i) => &mut files[i],
            None => {
                files.push(StoredFile {
                    proposal: chunk.proposal_id,
                    meta: FileMeta {
                        name: chunk.file_name.to_string(),
                        file_type: chunk.mime_type.to_string(),
                    },
                    chunks: Vec::new(),
                });
                let last = files.len() - 1;
                &mut files[last]
            }
        };
        if chunk.index == 0 {
            file.chunks.clear();
            file.meta.file_type = chunk.mime_type.to_string();
        }
        let index = chunk.index as usize;
        if file.chunks.len() <= index {
            file.chunks.resize(index + 1, None);
        }
        file.chunks[index] = Some(chunk.bytes.to_vec());
        Ok(())
    }

    async fn proposal_files(&self, id: ProposalId) -> Result<Vec<FileMeta>, FundError> {
        self.enter("getProposalFilesList")?;
        Ok(self
            .files
            .borrow()
            .iter()
            .filter(|f| f.proposal == id)
            .map(|f| f.meta.clone())
            .collect())
    }

    async fn file_total_chunks(&self, id: ProposalId, file_name: &str) -> Result<u64, FundError> {
        self.enter("getProposalFileTotalChunks")?;
        Ok(self
            .files
            .borrow()
            .iter()
            .find(|f| f.proposal == id && f.meta.name == file_name)
            .map_or(0, |f| f.chunks.len() as u64))
    }

    async fn file_chunk(
        &self,
        id: ProposalId,
        file_name: &str,
        index: u64,
    ) -> Result<Option<Vec<u8>>, FundError> {
        self.enter("getProposalFileChunk")?;
        Ok(self
            .files
            .borrow()
            .iter()
            .find(|f| f.proposal == id && f.meta.name == file_name)
            .and_then(|f| f.chunks.get(index as usize).cloned().flatten()))
    }

    async fn delete_proposal_file(
        &self,
        id: ProposalId,
        file_name: &str,
    ) -> Result<(), FundError> {
        self.enter("deleteProposalFile")?;
        let mut files = self.files.borrow_mut();
        let before = files.len();
        files.retain(|f| !(f.proposal == id && f.meta.name == file_name));
        if files.len() == before {
            return Err(rejected("File not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_user;

    fn backend() -> NullBackend {
        NullBackend::new(Rc::new(NullLedger::new()), test_user("alice", 0xa1))
    }

    #[tokio::test]
    async fn injected_failure_targets_one_method_once() {
        let backend = backend();
        backend.fail_method("getOrCreateUser", FundError::Transport("down".into()));
        assert!(backend.get_or_create_user().await.is_err());
        assert!(backend.get_or_create_user().await.is_ok());
        assert_eq!(backend.call_count("getOrCreateUser"), 2);
    }

    #[tokio::test]
    async fn latest_proposals_are_newest_first() {
        let backend = backend();
        let alice = Principal::new("alice");
        let first = backend.seed_proposal(&alice, E8s::new(1), "first");
        let second = backend.seed_proposal(&alice, E8s::new(1), "second");
        let ids: Vec<ProposalId> = backend
            .latest_proposals(10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn restarting_an_upload_discards_old_chunks() {
        let backend = backend();
        let id = backend.seed_proposal(&Principal::new("alice"), E8s::new(1), "p");
        for index in 0..3 {
            let chunk = FileChunk {
                proposal_id: id,
                file_name: "a.bin",
                bytes: &[1, 2],
                index,
                mime_type: "application/octet-stream",
            };
            backend.upload_file_chunk(&chunk).await.unwrap();
        }
        let restart = FileChunk {
            proposal_id: id,
            file_name: "a.bin",
            bytes: &[9],
            index: 0,
            mime_type: "application/octet-stream",
        };
        backend.upload_file_chunk(&restart).await.unwrap();
        assert_eq!(backend.file_total_chunks(id, "a.bin").await.unwrap(), 1);
    }

    fn new_proposal() -> NewProposal {
        NewProposal {
            name: "Alice".into(),
            title: "Audit".into(),
            description: "Follow the money".into(),
            goal: E8s::from_tokens(2),
            image: vec![1],
        }
    }

    #[tokio::test]
    async fn creation_fee_stays_locked_until_the_claim() {
        let backend = backend();
        let alice = backend.get_or_create_user().await.unwrap();
        backend.ledger().set_balance(&alice.account_id, E8s::from_tokens(1));

        let id = backend.create_proposal(&new_proposal()).await.unwrap();
        let locked = backend.get_or_create_user().await.unwrap().locked_balance;
        assert_eq!(locked, E8s::from_tokens(1));

        backend
            .ledger()
            .set_balance(&proposal_account(id), E8s::from_tokens(2));
        backend.claim_proposal(id).await.unwrap();
        let locked = backend.get_or_create_user().await.unwrap().locked_balance;
        assert_eq!(locked, E8s::ZERO);
    }

    #[tokio::test]
    async fn creation_needs_the_fee_available() {
        let backend = backend();
        let err = backend.create_proposal(&new_proposal()).await.unwrap_err();
        assert_eq!(
            err,
            FundError::Rejected("Insufficient available balance".into())
        );
        assert!(backend.latest_proposals(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_creator_claim_is_unauthorized() {
        let backend = backend();
        let id = backend.seed_proposal(&Principal::new("bob"), E8s::new(1), "p");
        let err = backend.claim_proposal(id).await.unwrap_err();
        assert!(matches!(err, FundError::Authorization(_)));
    }
}
