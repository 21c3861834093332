//! Milestone state classification.
//!
//! [`classify`] is the only place a milestone's lifecycle position is
//! computed. Rendering code reads the resulting [`MilestoneState`] instead of
//! re-deriving it from raw fields.

use serde::Serialize;

use crate::types::{Milestone, Proposal};

/// Where a milestone sits in its lifecycle at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneState {
    /// Funding order has not reached this milestone yet.
    NotReached,
    /// Paid out to the creator. Terminal.
    Claimed,
    /// Current milestone, proposal not fully funded.
    AwaitingFunding,
    /// Current milestone, funded, creator has not submitted proof.
    AwaitingProof,
    /// Proof submitted, voting window still open.
    VotingOpen,
    /// Voting window closed with more weight for than against.
    VotingClosedPassed,
    /// Voting window closed with a tie or more weight against.
    VotingClosedFailed,
}

/// Classify milestone `index` of `proposal` at unix time `now`.
///
/// Total over every `(proposal, index, now)`: an out-of-range index is past
/// `current_milestone` and therefore `NotReached`.
pub fn classify(proposal: &Proposal, index: usize, now: u64) -> MilestoneState {
    if index > proposal.current_milestone {
        return MilestoneState::NotReached;
    }
    let Some(milestone) = proposal.milestones.get(index) else {
        return MilestoneState::NotReached;
    };
    if milestone.claimed {
        return MilestoneState::Claimed;
    }
    // The contract only moves past a milestone by paying it out.
    if index < proposal.current_milestone {
        return MilestoneState::Claimed;
    }

    if proposal.amount_raised < proposal.amount_required {
        return MilestoneState::AwaitingFunding;
    }
    if !milestone.has_proof() {
        return MilestoneState::AwaitingProof;
    }
    if now < milestone.voting_end_time {
        return MilestoneState::VotingOpen;
    }
    if milestone.votes_for > milestone.votes_against {
        MilestoneState::VotingClosedPassed
    } else {
        MilestoneState::VotingClosedFailed
    }
}

/// Classify every milestone of `proposal`, in order.
pub fn classify_all(proposal: &Proposal, now: u64) -> Vec<MilestoneState> {
    (0..proposal.milestones.len())
        .map(|i| classify(proposal, i, now))
        .collect()
}

/// Weighted vote counts with the percentages shown next to them.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub votes_for: u64,
    pub votes_against: u64,
    pub total_voters: u64,
    pub for_percent: f64,
    pub against_percent: f64,
}

impl VoteTally {
    pub fn of(milestone: &Milestone) -> Self {
        let total = milestone.votes_for as f64 + milestone.votes_against as f64;
        let share = |part: u64| {
            if total > 0.0 {
                part as f64 / total * 100.0
            } else {
                0.0
            }
        };
        Self {
            votes_for: milestone.votes_for,
            votes_against: milestone.votes_against,
            total_voters: milestone.total_voters,
            for_percent: share(milestone.votes_for),
            against_percent: share(milestone.votes_against),
        }
    }
}

/// Human-readable countdown to `end`, e.g. `"2d 3h remaining"`.
pub fn format_time_remaining(end: u64, now: u64) -> String {
    if end <= now {
        return "Voting ended".to_string();
    }
    let remaining = end - now;
    let days = remaining / 86_400;
    let hours = (remaining % 86_400) / 3_600;
    let minutes = (remaining % 3_600) / 60;

    if days > 0 {
        format!("{days}d {hours}h remaining")
    } else if hours > 0 {
        format!("{hours}h {minutes}m remaining")
    } else {
        format!("{minutes}m remaining")
    }
}
