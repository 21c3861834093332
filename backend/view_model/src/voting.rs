//! Donor voting weight and vote eligibility.
//!
//! Weight grows with the square root of the donation so that large donors do
//! not dominate linearly. Tallies themselves are kept by the contract; nothing
//! here accumulates votes.

use crate::milestone::MilestoneState;
use crate::types::{Address, DonorContext, Proposal};
use crate::units::ATOMIC_SCALE;

/// `floor(sqrt(donated display units))`, exact on integers.
///
/// `floor(sqrt(x)) == floor(sqrt(floor(x)))` for `x >= 0`, so the atomic
/// amount is truncated to whole display units first.
pub fn voting_weight(donated_atomic: u64) -> u64 {
    isqrt(donated_atomic / ATOMIC_SCALE)
}

/// Weight of the viewer described by `donor`; zero for non-donors.
pub fn weight_of(donor: &DonorContext) -> u64 {
    donor.donated_amount.map(voting_weight).unwrap_or(0)
}

/// Whether `viewer` may vote on the milestone whose state is `state`.
pub fn can_vote(
    viewer: Option<&Address>,
    proposal: &Proposal,
    state: Option<MilestoneState>,
    donor: &DonorContext,
) -> bool {
    let Some(viewer) = viewer else {
        return false;
    };
    if proposal.is_creator(viewer) {
        return false;
    }
    let donated_enough = donor
        .donated_amount
        .is_some_and(|amount| amount >= ATOMIC_SCALE);
    donated_enough && state == Some(MilestoneState::VotingOpen) && !donor.has_voted
}

fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // Newton's method from an upper bound; converges monotonically downward.
    let mut x = n / 2 + 1;
    let mut y = (x + n / x) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}
