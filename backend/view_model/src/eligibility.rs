//! # Action eligibility gate
//!
//! [`available_actions`] is the single source of truth for what a viewer may
//! do with a proposal right now. The presentation layer disables everything
//! else, and every write path calls [`ensure_eligible`] again before it
//! dispatches.
//!
//! | Action            | Who      | When                                                      |
//! |-------------------|----------|-----------------------------------------------------------|
//! | `Donate`          | non-creator | not fully funded, something left to donate             |
//! | `SubmitProof`     | creator  | fully funded, current milestone awaiting proof or failed   |
//! | `VoteFor/Against` | donor    | current milestone voting open, donated ≥ 1, not yet voted  |
//! | `ClaimMilestone`  | creator  | current milestone passed its vote                          |
//! | `RequestRefund`   | donor    | no activity for longer than the expiration window          |
//!
//! A viewer without a connected wallet gets no actions at all.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::Funding;
use crate::errors::{Result, ViewError};
use crate::milestone::{classify, MilestoneState};
use crate::types::{Address, DonorContext, Proposal};
use crate::units::{format_display_amount, parse_display_amount, ATOMIC_SCALE};
use crate::voting::can_vote;

/// Default inactivity window after which donors may request a refund: 90 days.
pub const DEFAULT_EXPIRATION_WINDOW_SECS: u64 = 90 * 24 * 60 * 60;

/// A write the presentation layer may offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Donate,
    SubmitProof,
    VoteFor,
    VoteAgainst,
    ClaimMilestone,
    RequestRefund,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donate => "donate",
            Self::SubmitProof => "submit_proof",
            Self::VoteFor => "vote_for",
            Self::VoteAgainst => "vote_against",
            Self::ClaimMilestone => "claim_milestone",
            Self::RequestRefund => "request_refund",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship of the viewer to a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    /// No wallet connected.
    Anonymous,
    Creator,
    Donor,
    Visitor,
}

impl ViewerRole {
    pub fn of(viewer: Option<&Address>, proposal: &Proposal, donor: &DonorContext) -> Self {
        match viewer {
            None => Self::Anonymous,
            Some(v) if proposal.is_creator(v) => Self::Creator,
            Some(_) if donor.has_donated() => Self::Donor,
            Some(_) => Self::Visitor,
        }
    }
}

/// Knobs that mirror contract-side constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Seconds without a proof submission after which refunds open up.
    pub expiration_window_secs: u64,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            expiration_window_secs: DEFAULT_EXPIRATION_WINDOW_SECS,
        }
    }
}

/// Latest of creation and every proof submission.
pub fn last_activity(proposal: &Proposal) -> u64 {
    proposal
        .milestones
        .iter()
        .map(|m| m.proof_submitted_time)
        .fold(proposal.created_at, u64::max)
}

/// Whether the locally observed inactivity exceeds the policy window.
///
/// The contract keeps the authoritative timer and may still reject when
/// clocks disagree.
pub fn is_inactive(proposal: &Proposal, now: u64, policy: &LifecyclePolicy) -> bool {
    now.saturating_sub(last_activity(proposal)) > policy.expiration_window_secs
}

/// Every action `viewer` may request on `proposal` at `now`.
pub fn available_actions(
    viewer: Option<&Address>,
    proposal: &Proposal,
    donor: &DonorContext,
    now: u64,
    policy: &LifecyclePolicy,
) -> BTreeSet<Action> {
    let mut actions = BTreeSet::new();
    let Some(address) = viewer else {
        return actions;
    };

    let is_creator = proposal.is_creator(address);
    let funding = Funding::of(proposal);
    let current_state = (!proposal.is_complete())
        .then(|| classify(proposal, proposal.current_milestone, now));

    if !is_creator && !funding.is_fully_funded && funding.remaining_donatable > 0 {
        actions.insert(Action::Donate);
    }

    if is_creator
        && funding.is_fully_funded
        && matches!(
            current_state,
            Some(MilestoneState::AwaitingProof | MilestoneState::VotingClosedFailed)
        )
    {
        actions.insert(Action::SubmitProof);
    }

    if can_vote(viewer, proposal, current_state, donor) {
        actions.insert(Action::VoteFor);
        actions.insert(Action::VoteAgainst);
    }

    if is_creator && current_state == Some(MilestoneState::VotingClosedPassed) {
        actions.insert(Action::ClaimMilestone);
    }

    if !is_creator
        && donor.has_donated()
        && !proposal.is_complete()
        && is_inactive(proposal, now, policy)
    {
        actions.insert(Action::RequestRefund);
    }

    actions
}

/// Re-check performed immediately before dispatching a write.
pub fn ensure_eligible(actions: &BTreeSet<Action>, action: Action) -> Result<()> {
    if actions.contains(&action) {
        Ok(())
    } else {
        Err(ViewError::ActionNotEligible(action))
    }
}

/// Validate a typed donation against what the proposal can still absorb.
///
/// Returns the amount in atomic units.
pub fn validate_donation(input: &str, proposal: &Proposal) -> Result<u64> {
    let amount = parse_display_amount(input)?;
    if amount < ATOMIC_SCALE {
        return Err(ViewError::InvalidAmount(
            "donations must be at least 1".to_string(),
        ));
    }
    let remaining = Funding::of(proposal).remaining_donatable;
    if amount > remaining {
        return Err(ViewError::InvalidAmount(format!(
            "at most {} can be donated",
            format_display_amount(remaining)
        )));
    }
    Ok(amount)
}
