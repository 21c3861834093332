//! Contracts of the external chain collaborators.
//!
//! The proposal contract is the authority on every piece of state. Readers
//! return snapshots; writers forward a single request and report the outcome.
//! Neither side is retried or patched here beyond what [`crate::rpc`] does
//! for transient read failures.

use std::future::Future;

use ff_view_model::draft::ValidatedDraft;
use ff_view_model::future_fund::ValidatedDeposit;
use ff_view_model::{Address, DonationRecord, FutureFund, Proposal};
use serde::Serialize;

use crate::errors::Result;

/// Read side of the proposal contract.
pub trait ChainReader: Send + Sync + 'static {
    fn proposals_length(&self) -> impl Future<Output = Result<u64>> + Send;

    /// `Ok(None)` when no proposal exists under `id`.
    fn proposal(&self, id: u64) -> impl Future<Output = Result<Option<Proposal>>> + Send;

    /// Total donated by `donor`, atomic units; `Ok(None)` for non-donors.
    fn donation_amount(
        &self,
        id: u64,
        donor: &Address,
    ) -> impl Future<Output = Result<Option<u64>>> + Send;

    /// Addresses that voted on the milestone currently under vote.
    fn voted_addresses(&self, id: u64) -> impl Future<Output = Result<Vec<Address>>> + Send;

    fn all_donations(&self) -> impl Future<Output = Result<Vec<DonationRecord>>> + Send;

    /// Future Self deposits where `owner` is primary or backup.
    fn future_funds(&self, owner: &Address) -> impl Future<Output = Result<Vec<FutureFund>>> + Send;
}

/// One state-changing call on the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteRequest {
    CreateProposal(ValidatedDraft),
    Donate { proposal_id: u64, amount: u64 },
    SubmitProof { proposal_id: u64, proof_link: String },
    VoteMilestone { proposal_id: u64, approve: bool },
    ClaimMilestone { proposal_id: u64 },
    RequestRefund { proposal_id: u64 },
    FundFutureSelf(ValidatedDeposit),
    ClaimFutureSelf { fund_id: u64 },
}

impl WriteRequest {
    /// Contract method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateProposal(_) => "createProposal",
            Self::Donate { .. } => "donateProposal",
            Self::SubmitProof { .. } => "submitProof",
            Self::VoteMilestone { .. } => "voteMilestone",
            Self::ClaimMilestone { .. } => "claimMilestone",
            Self::RequestRefund { .. } => "refund",
            Self::FundFutureSelf(_) => "fundFutureSelf",
            Self::ClaimFutureSelf { .. } => "claimFutureSelf",
        }
    }
}

/// Acknowledgement of a submitted write. Does not imply the state changed;
/// only a subsequent fetch confirms that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_id: String,
}

/// Write side of the contract. Signing happens behind this boundary.
pub trait ChainWriter: Send + Sync + 'static {
    fn submit(
        &self,
        sender: &Address,
        request: &WriteRequest,
    ) -> impl Future<Output = Result<TxReceipt>> + Send;
}

/// Both halves, as the gateway needs them.
pub trait Chain: ChainReader + ChainWriter {}

impl<T: ChainReader + ChainWriter> Chain for T {}
