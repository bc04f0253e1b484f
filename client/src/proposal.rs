//! Proposal creation, listing and the ledger-backed proposal view.

use factfund_ledger::LedgerIndex;
use factfund_types::{E8s, FundError, Principal, Proposal, ProposalId};

use crate::backend::{Backend, NewProposal};
use crate::claim::check_claim;
use crate::client::FundingClient;
use crate::reconciler::reconcile;

/// Smallest funding goal a proposal may ask for (0.5 token).
pub const MIN_GOAL: E8s = E8s::new(50_000_000);

/// Largest accepted cover image.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Local claim state of a proposal view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimState {
    Unclaimed,
    /// The claim call succeeded but the backend has not yet confirmed it.
    Pending,
    Committed,
}

impl ClaimState {
    fn from_flag(claimed: bool) -> Self {
        if claimed {
            Self::Committed
        } else {
            Self::Unclaimed
        }
    }
}

/// A proposal together with the raised amount read from the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalView {
    pub proposal: Proposal,
    /// Ledger balance of the proposal account when the view was built.
    pub raised: E8s,
    pub claim: ClaimState,
}

impl ProposalView {
    pub fn new(proposal: Proposal, raised: E8s) -> Self {
        let claim = ClaimState::from_flag(proposal.claimed);
        Self {
            proposal,
            raised,
            claim,
        }
    }

    pub fn id(&self) -> ProposalId {
        self.proposal.id
    }

    pub fn required(&self) -> E8s {
        self.proposal.amount_required
    }

    pub fn remaining(&self) -> E8s {
        self.required().saturating_sub(self.raised)
    }

    pub fn goal_reached(&self) -> bool {
        self.raised >= self.required()
    }

    /// Raised as a percentage of the goal, capped at 100.
    pub fn progress_percent(&self) -> u8 {
        let required = self.required().e8s() as u128;
        if required == 0 {
            return 100;
        }
        let percent = self.raised.e8s() as u128 * 100 / required;
        percent.min(100) as u8
    }

    pub fn is_creator(&self, caller: &Principal) -> bool {
        &self.proposal.created_by == caller
    }

    /// Whether a claim by `caller` would pass the local gate.
    pub fn can_claim(&self, caller: &Principal) -> bool {
        check_claim(self, caller).is_ok()
    }

    /// Claimed locally, either confirmed or awaiting confirmation.
    pub fn is_claimed(&self) -> bool {
        self.claim != ClaimState::Unclaimed
    }

    /// Replace the record with a refetched one, resetting the claim state to
    /// what the backend reports.
    pub(crate) fn refresh(&mut self, proposal: Proposal, raised: E8s) {
        *self = Self::new(proposal, raised);
    }
}

/// Cover image of a new proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Everything the creator enters for a new proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalDraft {
    pub name: String,
    pub title: String,
    pub description: String,
    pub goal: E8s,
    pub image: ImageUpload,
}

impl ProposalDraft {
    fn into_new_proposal(self) -> NewProposal {
        NewProposal {
            name: self.name.trim().to_string(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            goal: self.goal,
            image: self.image.bytes,
        }
    }
}

/// Local checks on a draft. The backend re-validates.
pub fn validate_draft(draft: &ProposalDraft) -> Result<(), FundError> {
    for (field, value) in [
        ("name", &draft.name),
        ("title", &draft.title),
        ("description", &draft.description),
    ] {
        if value.trim().is_empty() {
            return Err(FundError::Validation(format!("{field} must not be empty")));
        }
    }
    if draft.goal < MIN_GOAL {
        return Err(FundError::Validation(format!(
            "goal must be at least {MIN_GOAL}"
        )));
    }
    if !draft.image.mime_type.starts_with("image/") {
        return Err(FundError::Validation(format!(
            "cover must be an image, got {:?}",
            draft.image.mime_type
        )));
    }
    if draft.image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(FundError::Validation(format!(
            "cover image is {} bytes, limit is {MAX_IMAGE_BYTES}",
            draft.image.bytes.len()
        )));
    }
    Ok(())
}

impl<B: Backend, L: LedgerIndex> FundingClient<B, L> {
    /// Validate and submit a new proposal, returning its id.
    pub async fn create_proposal(&self, draft: ProposalDraft) -> Result<ProposalId, FundError> {
        validate_draft(&draft)?;

        let user = self.backend().get_or_create_user().await?;
        let balance = reconcile(self.ledger(), &user).await?;
        if balance.available < self.proposal_fee {
            return Err(FundError::InsufficientBalance {
                needed: self.proposal_fee,
                available: balance.available,
            });
        }

        let id = self
            .backend()
            .create_proposal(&draft.into_new_proposal())
            .await?;
        tracing::info!(proposal = %id, "proposal created");
        Ok(id)
    }

    /// Fetch a proposal and its current raised amount.
    pub async fn proposal(&self, id: ProposalId) -> Result<ProposalView, FundError> {
        let proposal = self.backend().get_proposal(id).await?;
        self.view_of(proposal).await
    }

    /// The `count` most recent proposals.
    pub async fn latest_proposals(&self, count: u64) -> Result<Vec<ProposalView>, FundError> {
        let proposals = self.backend().latest_proposals(count).await?;
        self.views_of(proposals).await
    }

    /// The caller's `count` most recent proposals.
    pub async fn my_latest_proposals(&self, count: u64) -> Result<Vec<ProposalView>, FundError> {
        let proposals = self.backend().latest_my_proposals(count).await?;
        self.views_of(proposals).await
    }

    pub(crate) async fn view_of(&self, proposal: Proposal) -> Result<ProposalView, FundError> {
        let raised = self.ledger().account_balance(&proposal.account_id).await?;
        Ok(ProposalView::new(proposal, raised))
    }

    async fn views_of(&self, proposals: Vec<Proposal>) -> Result<Vec<ProposalView>, FundError> {
        let mut views = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            views.push(self.view_of(proposal).await?);
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factfund_types::AccountId;

    fn proposal(required: u64, claimed: bool) -> Proposal {
        Proposal {
            id: ProposalId::new(1),
            created_by: Principal::new("creator"),
            account_id: AccountId::new("ab".repeat(32)),
            amount_required: E8s::new(required),
            claimed,
            name: "Ada".into(),
            title: "Fact-check the budget".into(),
            description: "Line by line.".into(),
            image: Vec::new(),
            donations: Vec::new(),
        }
    }

    fn draft() -> ProposalDraft {
        ProposalDraft {
            name: "Ada".into(),
            title: "Fact-check the budget".into(),
            description: "Line by line.".into(),
            goal: E8s::from_tokens(5),
            image: ImageUpload {
                mime_type: "image/png".into(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            },
        }
    }

    #[test]
    fn remaining_saturates_once_goal_is_passed() {
        let view = ProposalView::new(proposal(100, false), E8s::new(150));
        assert_eq!(view.remaining(), E8s::ZERO);
        assert!(view.goal_reached());
        assert_eq!(view.progress_percent(), 100);
    }

    #[test]
    fn progress_rounds_down() {
        let view = ProposalView::new(proposal(300, false), E8s::new(100));
        assert_eq!(view.progress_percent(), 33);
        assert_eq!(view.remaining(), E8s::new(200));
    }

    #[test]
    fn claim_state_follows_backend_flag() {
        assert_eq!(
            ProposalView::new(proposal(1, true), E8s::ZERO).claim,
            ClaimState::Committed
        );
        assert_eq!(
            ProposalView::new(proposal(1, false), E8s::ZERO).claim,
            ClaimState::Unclaimed
        );
    }

    #[test]
    fn creator_with_full_funding_can_claim() {
        let view = ProposalView::new(proposal(500_000_000, false), E8s::new(500_000_000));
        assert!(view.can_claim(&Principal::new("creator")));
        assert!(!view.can_claim(&Principal::new("someone-else")));
    }

    #[test]
    fn valid_draft_passes() {
        assert!(validate_draft(&draft()).is_ok());
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut d = draft();
        d.title = "   ".into();
        let err = validate_draft(&d).unwrap_err();
        assert_eq!(err, FundError::Validation("title must not be empty".into()));
    }

    #[test]
    fn goal_below_half_a_token_is_rejected() {
        let mut d = draft();
        d.goal = E8s::new(49_999_999);
        assert!(matches!(validate_draft(&d), Err(FundError::Validation(_))));
        d.goal = MIN_GOAL;
        assert!(validate_draft(&d).is_ok());
    }

    #[test]
    fn cover_must_be_a_small_image() {
        let mut d = draft();
        d.image.mime_type = "application/pdf".into();
        assert!(matches!(validate_draft(&d), Err(FundError::Validation(_))));

        let mut d = draft();
        d.image.bytes = vec![0; MAX_IMAGE_BYTES + 1];
        assert!(matches!(validate_draft(&d), Err(FundError::Validation(_))));
    }

    #[test]
    fn draft_fields_are_trimmed_for_submission() {
        let mut d = draft();
        d.name = "  Ada ".into();
        let new = d.into_new_proposal();
        assert_eq!(new.name, "Ada");
        assert_eq!(new.goal, E8s::from_tokens(5));
    }
}
