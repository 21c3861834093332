//! Proposal-level funding progress.

use serde::Serialize;

use crate::milestone::MilestoneState;
use crate::types::Proposal;

/// Progress-bar colour band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTier {
    /// Below 30%.
    Low,
    /// 30% to 69%.
    Mid,
    /// 70% and above.
    High,
}

impl ProgressTier {
    pub fn for_percent(percent: u8) -> Self {
        match percent {
            0..=29 => Self::Low,
            30..=69 => Self::Mid,
            _ => Self::High,
        }
    }
}

/// Funding facts derived from a single snapshot. All amounts atomic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Funding {
    pub percent_funded: u8,
    pub is_fully_funded: bool,
    pub remaining_donatable: u64,
    pub tier: ProgressTier,
}

impl Funding {
    pub fn of(proposal: &Proposal) -> Self {
        let percent_funded = percent_funded(proposal.amount_raised, proposal.amount_required);
        Self {
            percent_funded,
            is_fully_funded: proposal.amount_raised >= proposal.amount_required,
            remaining_donatable: proposal
                .amount_required
                .saturating_sub(proposal.amount_raised),
            tier: ProgressTier::for_percent(percent_funded),
        }
    }
}

/// `round(100 * raised / required)` clamped to `0..=100`, half rounds up.
///
/// A zero goal counts as fully funded.
pub fn percent_funded(raised: u64, required: u64) -> u8 {
    if required == 0 {
        return 100;
    }
    let raised = raised as u128;
    let required = required as u128;
    let rounded = (200 * raised + required) / (2 * required);
    rounded.min(100) as u8
}

/// Number of milestones already paid out.
pub fn completed_milestones(states: &[MilestoneState]) -> usize {
    states
        .iter()
        .filter(|s| **s == MilestoneState::Claimed)
        .count()
}
