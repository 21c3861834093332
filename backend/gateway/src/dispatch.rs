//! Write dispatch.
//!
//! Every write follows the same path: fetch a fresh snapshot, derive the
//! view, re-check the action gate, forward exactly one request to the chain,
//! then fetch again so the caller sees what the contract actually did. A
//! failed write is reported as "action failed, state unchanged" whatever the
//! cause, and nothing local is patched either way.

use std::sync::Arc;

use ff_view_model::draft::ProposalDraft;
use ff_view_model::eligibility::validate_donation;
use ff_view_model::future_fund::{can_claim, DepositDraft, FutureFundView};
use ff_view_model::{
    derive_view, ensure_eligible, Action, Address, LifecyclePolicy, ProposalView, ViewError,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chain::{Chain, TxReceipt, WriteRequest};
use crate::errors::{GatewayError, Result};
use crate::snapshot::{unix_now, SnapshotLoader};

/// Body of `POST /proposals/:id/actions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: Action,
    pub sender: Address,
    /// Display units as typed, for `donate`.
    #[serde(default)]
    pub amount: Option<String>,
    /// For `submit_proof`.
    #[serde(default)]
    pub proof_link: Option<String>,
}

/// Receipt of an accepted write plus the state fetched right after it.
///
/// `refreshed` is `None` when the follow-up fetch failed; the write itself
/// still went through.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome<T> {
    pub receipt: TxReceipt,
    pub refreshed: Option<T>,
}

pub struct Dispatcher<C> {
    loader: Arc<SnapshotLoader<C>>,
    chain: Arc<C>,
    policy: LifecyclePolicy,
}

impl<C: Chain> Dispatcher<C> {
    pub fn new(loader: Arc<SnapshotLoader<C>>, policy: LifecyclePolicy) -> Self {
        let chain = Arc::clone(loader.chain());
        Self {
            loader,
            chain,
            policy,
        }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Fetch and derive the view of `proposal_id` for `viewer`.
    pub async fn view(&self, proposal_id: u64, viewer: Option<&Address>) -> Result<ProposalView> {
        let snap = self.loader.load(proposal_id, viewer).await?;
        Ok(derive_view(
            &snap.proposal,
            viewer,
            &snap.donor,
            snap.fetched_at,
            &self.policy,
        ))
    }

    /// Run one proposal action on behalf of `request.sender`.
    pub async fn dispatch(
        &self,
        proposal_id: u64,
        request: ActionRequest,
    ) -> Result<DispatchOutcome<ProposalView>> {
        require_sender(&request.sender)?;
        let sender = request.sender.clone();
        // Outside the per-viewer supersession: a page refresh must not cancel a write.
        let snap = self.loader.load_fresh(proposal_id, Some(&sender)).await?;
        let view = derive_view(
            &snap.proposal,
            Some(&sender),
            &snap.donor,
            snap.fetched_at,
            &self.policy,
        );

        if let Err(e) = ensure_eligible(&view.actions, request.action) {
            info!(
                "Rejected {} on proposal {proposal_id} by {}",
                request.action,
                sender.shortened()
            );
            return Err(e.into());
        }

        let write = match request.action {
            Action::Donate => {
                let amount = request.amount.as_deref().ok_or_else(|| {
                    ViewError::InvalidAmount("donation amount is required".to_string())
                })?;
                WriteRequest::Donate {
                    proposal_id,
                    amount: validate_donation(amount, &snap.proposal)?,
                }
            }
            Action::SubmitProof => {
                let link = request
                    .proof_link
                    .as_deref()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .ok_or_else(|| {
                        ViewError::InvalidInput("proof link is required".to_string())
                    })?;
                WriteRequest::SubmitProof {
                    proposal_id,
                    proof_link: link.to_string(),
                }
            }
            Action::VoteFor => WriteRequest::VoteMilestone {
                proposal_id,
                approve: true,
            },
            Action::VoteAgainst => WriteRequest::VoteMilestone {
                proposal_id,
                approve: false,
            },
            Action::ClaimMilestone => WriteRequest::ClaimMilestone { proposal_id },
            Action::RequestRefund => WriteRequest::RequestRefund { proposal_id },
        };

        let receipt = self.submit_once(&sender, &write).await?;
        let refreshed = match self.loader.load_fresh(proposal_id, Some(&sender)).await {
            Ok(snap) => Some(derive_view(
                &snap.proposal,
                Some(&sender),
                &snap.donor,
                snap.fetched_at,
                &self.policy,
            )),
            Err(e) => {
                warn!("Re-fetch after {} on proposal {proposal_id} failed: {e}", request.action);
                None
            }
        };
        Ok(DispatchOutcome { receipt, refreshed })
    }

    /// Validate a creation form and submit it.
    pub async fn create_proposal(
        &self,
        sender: &Address,
        draft: &ProposalDraft,
    ) -> Result<DispatchOutcome<u64>> {
        require_sender(sender)?;
        let validated = draft.validate().map_err(GatewayError::Draft)?;
        let receipt = self
            .submit_once(sender, &WriteRequest::CreateProposal(validated))
            .await?;
        let refreshed = match self.chain.proposals_length().await {
            Ok(length) => Some(length),
            Err(e) => {
                warn!("Re-fetch of proposal count after create failed: {e}");
                None
            }
        };
        Ok(DispatchOutcome { receipt, refreshed })
    }

    /// Future Self deposits where `owner` is a beneficiary.
    pub async fn future_funds(&self, owner: &Address) -> Result<Vec<FutureFundView>> {
        let now = unix_now();
        let funds = self
            .chain
            .future_funds(owner)
            .await
            .map_err(GatewayError::into_unavailable)?;
        Ok(funds
            .iter()
            .map(|f| FutureFundView::of(f, Some(owner), now))
            .collect())
    }

    pub async fn fund_future_self(
        &self,
        sender: &Address,
        draft: &DepositDraft,
    ) -> Result<DispatchOutcome<Vec<FutureFundView>>> {
        require_sender(sender)?;
        let deposit = draft.validate(unix_now())?;
        let receipt = self
            .submit_once(sender, &WriteRequest::FundFutureSelf(deposit))
            .await?;
        Ok(DispatchOutcome {
            receipt,
            refreshed: self.refetch_funds(sender).await,
        })
    }

    /// Claim a matured deposit. The deposit is re-read first; it is never
    /// marked claimed locally.
    pub async fn claim_future_self(
        &self,
        sender: &Address,
        fund_id: u64,
    ) -> Result<DispatchOutcome<Vec<FutureFundView>>> {
        let funds = self
            .chain
            .future_funds(sender)
            .await
            .map_err(GatewayError::into_unavailable)?;
        let fund = funds.iter().find(|f| f.id == fund_id).ok_or_else(|| {
            GatewayError::View(ViewError::DataUnavailable(format!(
                "future fund {fund_id} not found"
            )))
        })?;
        if !can_claim(fund, Some(sender), unix_now()) {
            return Err(GatewayError::NotClaimable(fund_id));
        }

        let receipt = self
            .submit_once(sender, &WriteRequest::ClaimFutureSelf { fund_id })
            .await?;
        Ok(DispatchOutcome {
            receipt,
            refreshed: self.refetch_funds(sender).await,
        })
    }

    async fn refetch_funds(&self, owner: &Address) -> Option<Vec<FutureFundView>> {
        match self.future_funds(owner).await {
            Ok(views) => Some(views),
            Err(e) => {
                warn!("Re-fetch of future funds for {} failed: {e}", owner.shortened());
                None
            }
        }
    }

    /// Forward `request` exactly once.
    async fn submit_once(&self, sender: &Address, request: &WriteRequest) -> Result<TxReceipt> {
        info!("Submitting {} for {}", request.method(), sender.shortened());
        match self.chain.submit(sender, request).await {
            Ok(receipt) => {
                info!("{} accepted: tx {}", request.method(), receipt.tx_id);
                Ok(receipt)
            }
            Err(e) => {
                warn!("{} failed: {e}", request.method());
                Err(GatewayError::WriteFailed(e.to_string()))
            }
        }
    }
}

fn require_sender(sender: &Address) -> Result<()> {
    if sender.as_str().trim().is_empty() {
        return Err(ViewError::InvalidInput("sender address is required".to_string()).into());
    }
    Ok(())
}
