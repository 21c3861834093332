//! # Types
//!
//! Read-only snapshots of on-chain records, exactly as the chain read client
//! returns them after normalisation.
//!
//! ## Design decisions
//!
//! ### Snapshots, not entities
//!
//! A [`Proposal`] is fetched fresh before every derivation and never mutated
//! afterwards. Nothing in this crate holds a proposal across fetches, so there
//! is no cache to invalidate and no optimistic patching after a write.
//!
//! ### Atomic units everywhere
//!
//! Every currency field in this module is an integer count of atomic units
//! (10^6 per display unit). Conversion to display units happens only when the
//! view model is assembled, see [`crate::units`].
//!
//! ### Lifecycle of a milestone
//!
//! ```text
//! NotReached ──► AwaitingFunding ──► AwaitingProof ──► VotingOpen
//!                                         ▲                │
//!                                         │                ▼
//!                              VotingClosedFailed ◄── (vote ends) ──► VotingClosedPassed ──► Claimed
//! ```
//!
//! The contract owns every transition; this crate only classifies where a
//! snapshot currently sits (see [`crate::milestone`]).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Account address as reported by the wallet and the chain client.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `ABCDEF...WXYZ` form used in compact listings.
    pub fn shortened(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// One funded sub-goal of a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub name: String,
    /// Target payout in atomic units.
    pub amount: u64,
    /// Empty until the creator submits proof.
    pub proof_link: String,
    /// Weighted sum of approving votes.
    pub votes_for: u64,
    /// Weighted sum of rejecting votes.
    pub votes_against: u64,
    pub total_voters: u64,
    pub claimed: bool,
    /// Unix seconds, `0` when unset.
    pub proof_submitted_time: u64,
    /// Unix seconds, `0` when unset.
    pub voting_end_time: u64,
}

impl Milestone {
    pub fn has_proof(&self) -> bool {
        !self.proof_link.is_empty()
    }
}

/// Root aggregate: a crowdfunding campaign split into milestones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: u64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub created_by: Address,
    /// Unix seconds.
    pub created_at: u64,
    /// Funding goal in atomic units.
    pub amount_required: u64,
    /// Amount raised so far in atomic units. May exceed the goal.
    pub amount_raised: u64,
    pub no_of_donations: u64,
    pub no_of_unique_donors: u64,
    /// Index into `milestones`; equals `milestones.len()` once every milestone is claimed.
    pub current_milestone: usize,
    pub milestones: Vec<Milestone>,
}

impl Proposal {
    /// Milestone the contract currently points at, if any remain.
    pub fn current(&self) -> Option<&Milestone> {
        self.milestones.get(self.current_milestone)
    }

    pub fn is_complete(&self) -> bool {
        self.current_milestone >= self.milestones.len()
    }

    pub fn is_creator(&self, viewer: &Address) -> bool {
        &self.created_by == viewer
    }
}

/// What the chain knows about one viewer's relationship to one proposal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorContext {
    /// Total donated in atomic units; `None` when the viewer never donated.
    pub donated_amount: Option<u64>,
    /// Whether the viewer already voted on the milestone currently under vote.
    pub has_voted: bool,
}

impl DonorContext {
    /// Build the context from the two raw reads the chain client performs.
    pub fn from_reads(
        donated_amount: Option<u64>,
        voted_addresses: &[Address],
        viewer: Option<&Address>,
    ) -> Self {
        let has_voted = viewer
            .map(|v| voted_addresses.iter().any(|a| a == v))
            .unwrap_or(false);
        Self {
            donated_amount,
            has_voted,
        }
    }

    pub fn has_donated(&self) -> bool {
        self.donated_amount.is_some_and(|a| a > 0)
    }
}

/// A single `(proposal, donor, amount)` record, as used for the leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    pub proposal_id: u64,
    pub donor: Address,
    /// Atomic units.
    pub amount: u64,
}

/// A time-locked "future self" deposit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureFund {
    pub id: u64,
    pub primary: Address,
    pub backup: Address,
    /// Unix seconds after which the deposit may be released.
    pub unlock_time: u64,
    /// Atomic units.
    pub amount: u64,
    pub claimed: bool,
}
