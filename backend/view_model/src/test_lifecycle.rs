use crate::eligibility::{Action, LifecyclePolicy};
use crate::invariants::assert_all_view_invariants;
use crate::milestone::{classify, classify_all, MilestoneState};
use crate::test_fixtures::*;
use crate::types::{DonorContext, Proposal};
use crate::view::derive_view;
use crate::voting::voting_weight;

fn creator_view(p: &Proposal) -> crate::view::ProposalView {
    let view = derive_view(
        p,
        Some(&addr(CREATOR)),
        &DonorContext::default(),
        NOW,
        &LifecyclePolicy::default(),
    );
    assert_all_view_invariants(p, &view, NOW);
    view
}

fn donor_view(p: &Proposal, ctx: &DonorContext) -> crate::view::ProposalView {
    let view = derive_view(p, Some(&addr(DONOR)), ctx, NOW, &LifecyclePolicy::default());
    assert_all_view_invariants(p, &view, NOW);
    view
}

#[test]
fn test_unfunded_proposal_awaits_funding() {
    let p = proposal();
    assert_eq!(classify(&p, 0, NOW), MilestoneState::AwaitingFunding);
    assert_eq!(classify(&p, 1, NOW), MilestoneState::NotReached);

    let view = donor_view(&p, &DonorContext::default());
    assert!(view.can(Action::Donate));
    assert_eq!(view.percent_funded, 0);
    assert_eq!(view.remaining_donatable, 100.0);
}

#[test]
fn test_funded_without_proof_awaits_proof() {
    let p = funded(proposal());
    assert_eq!(classify(&p, 0, NOW), MilestoneState::AwaitingProof);

    let view = creator_view(&p);
    assert!(view.can(Action::SubmitProof));
    assert!(!view.can(Action::ClaimMilestone));
    assert!(!view.can(Action::Donate));
    assert_eq!(view.percent_funded, 100);
}

#[test]
fn test_voting_open_until_end_time() {
    let p = with_proof(funded(proposal()), 3_600, 0, 0);
    assert_eq!(classify(&p, 0, NOW), MilestoneState::VotingOpen);

    let view = donor_view(&p, &donor(25));
    assert!(view.can(Action::VoteFor));
    assert!(view.can(Action::VoteAgainst));
    assert_eq!(view.viewer.voting_weight, 5);
    assert_eq!(
        view.milestones[0].time_remaining.as_deref(),
        Some("1h 0m remaining")
    );

    let creator = creator_view(&p);
    assert!(!creator.can(Action::SubmitProof));
    assert!(!creator.can(Action::ClaimMilestone));
}

#[test]
fn test_voting_end_boundary_is_closed() {
    let p = with_proof(funded(proposal()), 0, 1, 0);
    assert_eq!(classify(&p, 0, NOW), MilestoneState::VotingClosedPassed);
    assert_eq!(classify(&p, 0, NOW - 1), MilestoneState::VotingOpen);
}

#[test]
fn test_passed_vote_allows_claim() {
    let p = with_proof(funded(proposal()), -10, 5, 3);
    assert_eq!(classify(&p, 0, NOW), MilestoneState::VotingClosedPassed);

    let view = creator_view(&p);
    assert!(view.can(Action::ClaimMilestone));
    assert!(!view.can(Action::SubmitProof));

    let backer = donor_view(&p, &donor(9));
    assert!(!backer.can(Action::VoteFor));
}

#[test]
fn test_tie_counts_as_failed_and_allows_resubmission() {
    let p = with_proof(funded(proposal()), -10, 4, 4);
    assert_eq!(classify(&p, 0, NOW), MilestoneState::VotingClosedFailed);

    let view = creator_view(&p);
    assert!(view.can(Action::SubmitProof));
    assert!(!view.can(Action::ClaimMilestone));
}

#[test]
fn test_after_claim_next_milestone_becomes_current() {
    let mut p = with_proof(funded(proposal()), -10, 5, 3);
    p.milestones[0].claimed = true;
    p.current_milestone = 1;

    assert_eq!(
        classify_all(&p, NOW),
        vec![MilestoneState::Claimed, MilestoneState::AwaitingProof]
    );
    let view = creator_view(&p);
    assert_eq!(view.completed_milestones, 1);
    assert_eq!(view.current_milestone, Some(1));
    assert!(view.can(Action::SubmitProof));
}

#[test]
fn test_all_claimed_proposal_is_complete() {
    let mut p = funded(proposal());
    for m in &mut p.milestones {
        m.proof_link = "https://example.org/proof".to_string();
        m.claimed = true;
    }
    p.current_milestone = p.milestones.len();

    let view = creator_view(&p);
    assert_eq!(view.current_milestone, None);
    assert_eq!(view.completed_milestones, 2);
    assert!(view.actions.is_empty());

    let backer = donor_view(&p, &donor(50));
    assert!(!backer.can(Action::RequestRefund));
}

#[test]
fn test_unclaimed_milestone_behind_pointer_is_settled() {
    let mut p = funded(proposal());
    p.current_milestone = 1;
    assert_eq!(classify(&p, 0, NOW), MilestoneState::Claimed);
}

#[test]
fn test_broken_sum_invariant_does_not_panic() {
    let mut p = funded(proposal());
    p.milestones[0].amount = 1;
    p.amount_required = 0;
    p.amount_raised = 0;
    let view = creator_view(&p);
    assert_eq!(view.percent_funded, 100);
    assert!(view.is_fully_funded);

    let mut empty = proposal();
    empty.milestones.clear();
    let view = creator_view(&empty);
    assert_eq!(view.current_milestone, None);
    assert_eq!(view.total_milestones, 0);
}

#[test]
fn test_voting_weight_scenario() {
    assert_eq!(voting_weight(units(4)), 2);
    let view = donor_view(&proposal(), &donor(4));
    assert_eq!(view.viewer.voting_weight, 2);
    assert_eq!(view.viewer.donated_amount, Some(4.0));
}

#[test]
fn test_classification_is_total_over_grid() {
    let bases = [
        proposal(),
        funded(proposal()),
        with_proof(funded(proposal()), 600, 2, 1),
        with_proof(funded(proposal()), -600, 2, 1),
        with_proof(funded(proposal()), -600, 1, 2),
    ];
    for base in bases {
        for current in 0..=base.milestones.len() {
            let mut p = base.clone();
            p.current_milestone = current;
            for now in [0, NOW - 601, NOW, NOW + 601, u64::MAX] {
                for who in [CREATOR, DONOR, STRANGER] {
                    let view = derive_view(
                        &p,
                        Some(&addr(who)),
                        &donor(16),
                        now,
                        &LifecyclePolicy::default(),
                    );
                    assert_all_view_invariants(&p, &view, now);
                }
            }
        }
    }
}

#[test]
fn test_view_serialises_camel_case() {
    let view = creator_view(&funded(proposal()));
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["percentFunded"], 100);
    assert_eq!(json["progressTier"], "high");
    assert_eq!(json["milestones"][0]["state"], "awaiting_proof");
    assert_eq!(json["actions"][0], "submit_proof");
    assert_eq!(json["viewer"]["role"], "creator");
}
