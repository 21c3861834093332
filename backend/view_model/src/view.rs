//! Assembly of the immutable view model handed to the presentation layer.
//!
//! [`derive_view`] runs the whole pipeline (units, milestone states, voting
//! weight, funding aggregate, action gate) against one snapshot. The result
//! owns copies of everything it needs and is never patched; the next fetch
//! produces a new one.

use std::collections::BTreeSet;

use chrono::DateTime;
use serde::Serialize;

use crate::aggregate::{completed_milestones, Funding, ProgressTier};
use crate::eligibility::{available_actions, last_activity, Action, LifecyclePolicy, ViewerRole};
use crate::milestone::{classify_all, format_time_remaining, MilestoneState, VoteTally};
use crate::types::{Address, DonorContext, Proposal};
use crate::units::to_display_units;
use crate::voting::weight_of;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneView {
    pub index: usize,
    pub name: String,
    pub amount: f64,
    pub state: MilestoneState,
    pub is_current: bool,
    pub proof_link: Option<String>,
    pub tally: VoteTally,
    pub voting_end_time: Option<u64>,
    /// Countdown text while voting is open.
    pub time_remaining: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerView {
    pub address: Option<Address>,
    pub role: ViewerRole,
    pub donated_amount: Option<f64>,
    pub voting_weight: u64,
    pub has_voted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalView {
    pub id: u64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub created_by: Address,
    pub created_at: u64,
    pub created_on: String,
    pub amount_required: f64,
    pub amount_raised: f64,
    pub remaining_donatable: f64,
    pub percent_funded: u8,
    pub progress_tier: ProgressTier,
    pub is_fully_funded: bool,
    pub no_of_donations: u64,
    pub no_of_unique_donors: u64,
    pub completed_milestones: usize,
    pub total_milestones: usize,
    /// `None` once every milestone is claimed.
    pub current_milestone: Option<usize>,
    pub last_activity: u64,
    pub milestones: Vec<MilestoneView>,
    pub viewer: ViewerView,
    pub actions: BTreeSet<Action>,
}

impl ProposalView {
    pub fn can(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    pub fn current_state(&self) -> Option<MilestoneState> {
        self.current_milestone
            .and_then(|i| self.milestones.get(i))
            .map(|m| m.state)
    }
}

/// Derive the full view for `viewer` from one proposal snapshot.
pub fn derive_view(
    proposal: &Proposal,
    viewer: Option<&Address>,
    donor: &DonorContext,
    now: u64,
    policy: &LifecyclePolicy,
) -> ProposalView {
    let states = classify_all(proposal, now);
    let funding = Funding::of(proposal);

    let milestones = proposal
        .milestones
        .iter()
        .zip(&states)
        .enumerate()
        .map(|(index, (m, state))| MilestoneView {
            index,
            name: m.name.clone(),
            amount: to_display_units(m.amount),
            state: *state,
            is_current: index == proposal.current_milestone,
            proof_link: m.has_proof().then(|| m.proof_link.clone()),
            tally: VoteTally::of(m),
            voting_end_time: (m.voting_end_time > 0).then_some(m.voting_end_time),
            time_remaining: (*state == MilestoneState::VotingOpen)
                .then(|| format_time_remaining(m.voting_end_time, now)),
        })
        .collect();

    ProposalView {
        id: proposal.id,
        name: proposal.name.clone(),
        title: proposal.title.clone(),
        description: proposal.description.clone(),
        category: proposal.category.clone(),
        created_by: proposal.created_by.clone(),
        created_at: proposal.created_at,
        created_on: format_date(proposal.created_at),
        amount_required: to_display_units(proposal.amount_required),
        amount_raised: to_display_units(proposal.amount_raised),
        remaining_donatable: to_display_units(funding.remaining_donatable),
        percent_funded: funding.percent_funded,
        progress_tier: funding.tier,
        is_fully_funded: funding.is_fully_funded,
        no_of_donations: proposal.no_of_donations,
        no_of_unique_donors: proposal.no_of_unique_donors,
        completed_milestones: completed_milestones(&states),
        total_milestones: proposal.milestones.len(),
        current_milestone: (!proposal.is_complete()).then_some(proposal.current_milestone),
        last_activity: last_activity(proposal),
        milestones,
        viewer: ViewerView {
            address: viewer.cloned(),
            role: ViewerRole::of(viewer, proposal, donor),
            donated_amount: donor.donated_amount.map(to_display_units),
            voting_weight: weight_of(donor),
            has_voted: donor.has_voted,
        },
        actions: available_actions(viewer, proposal, donor, now, policy),
    }
}

/// `"January 5, 2024"` for a unix timestamp; empty when out of range.
pub fn format_date(unix_secs: u64) -> String {
    i64::try_from(unix_secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%B %-d, %Y").to_string())
        .unwrap_or_default()
}
