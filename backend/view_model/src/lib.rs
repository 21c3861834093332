//! # Fact Fund view model
//!
//! Pure derivation layer between the proposal contract's raw state and the
//! presentation layer. Given one fetched snapshot it produces the facts and
//! permissions a page needs:
//!
//! | Stage                | Module            | Entry point(s)                              |
//! |----------------------|-------------------|---------------------------------------------|
//! | Unit conversion      | [`units`]         | `to_display_units`, `to_atomic_units`       |
//! | Milestone state      | [`milestone`]     | [`classify`], `classify_all`                |
//! | Voting               | [`voting`]        | [`voting_weight`], [`can_vote`]             |
//! | Funding aggregate    | [`aggregate`]     | `Funding::of`, `percent_funded`             |
//! | Action gate          | [`eligibility`]   | [`available_actions`], [`ensure_eligible`]  |
//! | Assembly             | [`view`]          | [`derive_view`]                             |
//! | Listing, leaderboard | [`catalog`]       | `filter_proposals`, `Leaderboard::build`    |
//! | Creation form        | [`draft`]         | `ProposalDraft::validate`                   |
//! | Future Self fund     | [`future_fund`]   | `FutureFundView::of`, `DepositDraft::validate` |
//!
//! ## Architecture
//!
//! Every function here is synchronous and side-effect free. Nothing caches a
//! snapshot or mutates one after a write: callers re-fetch and derive again.
//! Fetching, cancellation and write dispatch live in the gateway crate.

pub mod aggregate;
pub mod catalog;
pub mod draft;
pub mod eligibility;
pub mod errors;
pub mod future_fund;
pub mod milestone;
pub mod types;
pub mod units;
pub mod view;
pub mod voting;

#[cfg(test)]
mod test_eligibility;
#[cfg(test)]
mod test_lifecycle;

pub use eligibility::{available_actions, ensure_eligible, Action, LifecyclePolicy, ViewerRole};
pub use errors::{Result, ViewError};
pub use milestone::{classify, MilestoneState};
pub use types::{Address, DonationRecord, DonorContext, FutureFund, Milestone, Proposal};
pub use view::{derive_view, ProposalView};
pub use voting::{can_vote, voting_weight};
