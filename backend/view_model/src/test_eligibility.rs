use crate::eligibility::{
    available_actions, ensure_eligible, is_inactive, last_activity, validate_donation, Action,
    LifecyclePolicy, ViewerRole,
};
use crate::errors::ViewError;
use crate::test_fixtures::*;
use crate::types::{Address, DonorContext};
use crate::units::ATOMIC_SCALE;
use crate::voting::can_vote;

fn policy(window: u64) -> LifecyclePolicy {
    LifecyclePolicy {
        expiration_window_secs: window,
    }
}

#[test]
fn test_anonymous_viewer_gets_nothing() {
    let p = with_proof(funded(proposal()), 600, 0, 0);
    let actions = available_actions(None, &p, &donor(100), NOW, &LifecyclePolicy::default());
    assert!(actions.is_empty());

    let unfunded = proposal();
    let actions = available_actions(None, &unfunded, &DonorContext::default(), NOW, &policy(0));
    assert!(!actions.contains(&Action::Donate));
}

#[test]
fn test_creator_never_donates_or_votes() {
    let creator = addr(CREATOR);
    let states = [
        proposal(),
        funded(proposal()),
        with_proof(funded(proposal()), 600, 1, 0),
        with_proof(funded(proposal()), -600, 1, 0),
    ];
    for p in states {
        // Even a creator who somehow holds a donation record.
        for ctx in [DonorContext::default(), donor(400)] {
            let actions = available_actions(Some(&creator), &p, &ctx, NOW, &policy(0));
            assert!(!actions.contains(&Action::Donate));
            assert!(!actions.contains(&Action::VoteFor));
            assert!(!actions.contains(&Action::VoteAgainst));
        }
    }
}

#[test]
fn test_donate_requires_remaining_room() {
    let stranger = addr(STRANGER);
    let mut p = proposal();
    p.amount_raised = units(99);
    let actions = available_actions(Some(&stranger), &p, &DonorContext::default(), NOW, &policy(u64::MAX));
    assert!(actions.contains(&Action::Donate));

    // Over-funded: raised exceeds goal.
    p.amount_raised = units(140);
    let actions = available_actions(Some(&stranger), &p, &DonorContext::default(), NOW, &policy(u64::MAX));
    assert!(!actions.contains(&Action::Donate));
}

#[test]
fn test_vote_requires_one_whole_unit() {
    let p = with_proof(funded(proposal()), 600, 0, 0);
    let viewer = addr(DONOR);
    let state = Some(crate::milestone::classify(&p, 0, NOW));

    let small = DonorContext {
        donated_amount: Some(ATOMIC_SCALE - 1),
        has_voted: false,
    };
    assert!(!can_vote(Some(&viewer), &p, state, &small));

    let exact = DonorContext {
        donated_amount: Some(ATOMIC_SCALE),
        has_voted: false,
    };
    assert!(can_vote(Some(&viewer), &p, state, &exact));

    let voted = DonorContext {
        has_voted: true,
        ..exact
    };
    assert!(!can_vote(Some(&viewer), &p, state, &voted));

    assert!(!can_vote(Some(&viewer), &p, state, &DonorContext::default()));
    assert!(!can_vote(None, &p, state, &exact));
}

#[test]
fn test_has_voted_comes_from_voted_addresses() {
    let viewer = addr(DONOR);
    let voted = vec![addr(STRANGER), addr(DONOR)];
    let ctx = DonorContext::from_reads(Some(units(4)), &voted, Some(&viewer));
    assert!(ctx.has_voted);

    let ctx = DonorContext::from_reads(Some(units(4)), &voted[..1], Some(&viewer));
    assert!(!ctx.has_voted);

    let ctx = DonorContext::from_reads(None, &voted, None);
    assert!(!ctx.has_voted);
}

#[test]
fn test_refund_after_inactivity_window() {
    let p = funded(proposal());
    let viewer = addr(DONOR);
    let window = 600;

    assert_eq!(last_activity(&p), p.created_at);
    let just_inside = p.created_at + window;
    assert!(!is_inactive(&p, just_inside, &policy(window)));
    assert!(is_inactive(&p, just_inside + 1, &policy(window)));

    let actions = available_actions(Some(&viewer), &p, &donor(10), just_inside + 1, &policy(window));
    assert!(actions.contains(&Action::RequestRefund));

    // Non-donors have nothing to refund.
    let actions = available_actions(
        Some(&viewer),
        &p,
        &DonorContext::default(),
        just_inside + 1,
        &policy(window),
    );
    assert!(!actions.contains(&Action::RequestRefund));
}

#[test]
fn test_proof_submission_resets_inactivity() {
    let p = with_proof(funded(proposal()), -10, 0, 3);
    let submitted = p.milestones[0].proof_submitted_time;
    assert_eq!(last_activity(&p), submitted);

    let viewer = addr(DONOR);
    let actions = available_actions(Some(&viewer), &p, &donor(10), submitted + 600, &policy(600));
    assert!(!actions.contains(&Action::RequestRefund));
    let actions = available_actions(Some(&viewer), &p, &donor(10), submitted + 601, &policy(600));
    assert!(actions.contains(&Action::RequestRefund));
}

#[test]
fn test_clock_behind_creation_is_not_inactive() {
    let p = proposal();
    assert!(!is_inactive(&p, 0, &policy(0)));
}

#[test]
fn test_ensure_eligible_reports_missing_action() {
    let p = proposal();
    let actions = available_actions(Some(&addr(CREATOR)), &p, &DonorContext::default(), NOW, &policy(u64::MAX));
    assert_eq!(
        ensure_eligible(&actions, Action::Donate),
        Err(ViewError::ActionNotEligible(Action::Donate))
    );

    let actions = available_actions(Some(&addr(DONOR)), &p, &DonorContext::default(), NOW, &policy(u64::MAX));
    assert_eq!(ensure_eligible(&actions, Action::Donate), Ok(()));
}

#[test]
fn test_viewer_roles() {
    let p = proposal();
    assert_eq!(ViewerRole::of(None, &p, &donor(5)), ViewerRole::Anonymous);
    assert_eq!(ViewerRole::of(Some(&addr(CREATOR)), &p, &donor(5)), ViewerRole::Creator);
    assert_eq!(ViewerRole::of(Some(&addr(DONOR)), &p, &donor(5)), ViewerRole::Donor);
    assert_eq!(
        ViewerRole::of(Some(&Address::new("X")), &p, &DonorContext::default()),
        ViewerRole::Visitor
    );
}

#[test]
fn test_donation_input_validation() {
    let mut p = proposal();
    p.amount_raised = units(97) + 500_000;

    assert_eq!(validate_donation("1", &p).unwrap(), units(1));
    assert_eq!(validate_donation("2.5", &p).unwrap(), 2_500_000);
    assert!(matches!(
        validate_donation("0.5", &p),
        Err(ViewError::InvalidAmount(_))
    ));
    assert!(matches!(
        validate_donation("2.500001", &p),
        Err(ViewError::InvalidAmount(_))
    ));
    assert!(matches!(
        validate_donation("abc", &p),
        Err(ViewError::InvalidAmount(_))
    ));
}
