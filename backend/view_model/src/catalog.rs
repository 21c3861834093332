//! Proposal listing, search and the creator/donor leaderboard.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::types::{Address, DonationRecord, Proposal};
use crate::units::to_display_units;

/// Categories a proposal may be filed under.
pub const CATEGORIES: [&str; 8] = [
    "Technology",
    "Healthcare",
    "Education",
    "Environment",
    "Social Impact",
    "Arts & Culture",
    "Research & Development",
    "Community Projects",
];

pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

/// Proposals whose title or description contains `search` (case-insensitive)
/// and whose category equals `category`. Empty filters match everything.
pub fn filter_proposals<'a>(
    proposals: &'a [Proposal],
    search: &str,
    category: &str,
) -> Vec<&'a Proposal> {
    let needle = search.trim().to_lowercase();
    proposals
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.title.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        })
        .filter(|p| category.is_empty() || p.category == category)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorEntry {
    pub address: Address,
    pub total_raised: f64,
    pub campaign_count: usize,
    pub successful_campaigns: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorEntry {
    pub address: Address,
    pub total_donated: f64,
    pub campaigns_supported: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    pub creators: Vec<CreatorEntry>,
    pub donors: Vec<DonorEntry>,
}

impl Leaderboard {
    /// Rank creators by total raised and donors by total donated, both
    /// descending, ties broken by address.
    pub fn build(proposals: &[Proposal], donations: &[DonationRecord]) -> Self {
        #[derive(Default)]
        struct CreatorAcc {
            raised: u128,
            campaigns: usize,
            successful: usize,
        }
        let mut creators: BTreeMap<&Address, CreatorAcc> = BTreeMap::new();
        for p in proposals {
            let acc = creators.entry(&p.created_by).or_default();
            acc.raised += p.amount_raised as u128;
            acc.campaigns += 1;
            if p.amount_raised >= p.amount_required {
                acc.successful += 1;
            }
        }

        let mut donors: BTreeMap<&Address, (u128, BTreeSet<u64>)> = BTreeMap::new();
        for d in donations.iter().filter(|d| d.amount > 0) {
            let (total, campaigns) = donors.entry(&d.donor).or_default();
            *total += d.amount as u128;
            campaigns.insert(d.proposal_id);
        }

        let mut creator_rows: Vec<(u128, CreatorEntry)> = creators
            .into_iter()
            .map(|(address, acc)| {
                (
                    acc.raised,
                    CreatorEntry {
                        address: address.clone(),
                        total_raised: atomic_to_display(acc.raised),
                        campaign_count: acc.campaigns,
                        successful_campaigns: acc.successful,
                    },
                )
            })
            .collect();
        // BTreeMap iteration is address-ordered and sort_by is stable.
        creator_rows.sort_by(|a, b| b.0.cmp(&a.0));

        let mut donor_rows: Vec<(u128, DonorEntry)> = donors
            .into_iter()
            .map(|(address, (total, campaigns))| {
                (
                    total,
                    DonorEntry {
                        address: address.clone(),
                        total_donated: atomic_to_display(total),
                        campaigns_supported: campaigns.len(),
                    },
                )
            })
            .collect();
        donor_rows.sort_by(|a, b| b.0.cmp(&a.0));

        Self {
            creators: creator_rows.into_iter().map(|(_, e)| e).collect(),
            donors: donor_rows.into_iter().map(|(_, e)| e).collect(),
        }
    }
}

fn atomic_to_display(total: u128) -> f64 {
    match u64::try_from(total) {
        Ok(v) => to_display_units(v),
        Err(_) => total as f64 / crate::units::ATOMIC_SCALE as f64,
    }
}
