//! In-memory chain used by the gateway tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use ff_view_model::types::Milestone;
use ff_view_model::units::ATOMIC_SCALE;
use ff_view_model::{Address, DonationRecord, FutureFund, Proposal};

use crate::chain::{ChainReader, ChainWriter, TxReceipt, WriteRequest};
use crate::errors::{GatewayError, Result};
use crate::snapshot::unix_now;

pub const CREATOR: &str = "CREATOR";

/// Goal of 100 split 60 + 40, created an hour ago, nothing raised.
pub fn sample_proposal(id: u64) -> Proposal {
    let milestone = |name: &str, display: u64| Milestone {
        name: name.to_string(),
        amount: display * ATOMIC_SCALE,
        proof_link: String::new(),
        votes_for: 0,
        votes_against: 0,
        total_voters: 0,
        claimed: false,
        proof_submitted_time: 0,
        voting_end_time: 0,
    };
    Proposal {
        id,
        name: "Ada".to_string(),
        title: format!("Campaign {id}"),
        description: "Panels for the village school".to_string(),
        category: "Education".to_string(),
        created_by: Address::new(CREATOR),
        created_at: unix_now() - 3_600,
        amount_required: 100 * ATOMIC_SCALE,
        amount_raised: 0,
        no_of_donations: 0,
        no_of_unique_donors: 0,
        current_milestone: 0,
        milestones: vec![milestone("Buy panels", 60), milestone("Install", 40)],
    }
}

#[derive(Default)]
struct State {
    proposals: HashMap<u64, Proposal>,
    length: Option<u64>,
    donations: HashMap<(u64, Address), u64>,
    votes: HashMap<u64, Vec<Address>>,
    funds: Vec<FutureFund>,
    fail_reads: bool,
    fail_writes: bool,
    next_read_delay: Option<Duration>,
    read_delay: Option<Duration>,
    active_reads: usize,
    peak_reads: usize,
    submitted: Vec<(Address, WriteRequest)>,
    write_attempts: usize,
}

/// Applies accepted writes to its own state so follow-up reads observe them.
#[derive(Default)]
pub struct FakeChain {
    state: Mutex<State>,
}

impl FakeChain {
    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn put_proposal(&self, p: Proposal) {
        self.with(|s| {
            s.proposals.insert(p.id, p);
        });
    }

    pub fn put_donation(&self, id: u64, donor: &str, amount: u64) {
        self.with(|s| {
            s.donations.insert((id, Address::new(donor)), amount);
        });
    }

    pub fn put_vote(&self, id: u64, voter: &str) {
        self.with(|s| s.votes.entry(id).or_default().push(Address::new(voter)));
    }

    pub fn put_fund(&self, fund: FutureFund) {
        self.with(|s| s.funds.push(fund));
    }

    pub fn set_length(&self, length: u64) {
        self.with(|s| s.length = Some(length));
    }

    pub fn fail_reads(&self, fail: bool) {
        self.with(|s| s.fail_reads = fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.with(|s| s.fail_writes = fail);
    }

    /// Hold the next `proposal` read for `delay`.
    pub fn delay_next_read(&self, delay: Duration) {
        self.with(|s| s.next_read_delay = Some(delay));
    }

    /// Hold every `proposal` read for `delay`.
    pub fn delay_reads(&self, delay: Duration) {
        self.with(|s| s.read_delay = Some(delay));
    }

    /// Most `proposal` reads observed running at the same time.
    pub fn peak_reads(&self) -> usize {
        self.with(|s| s.peak_reads)
    }

    pub fn submitted(&self) -> Vec<(Address, WriteRequest)> {
        self.with(|s| s.submitted.clone())
    }

    pub fn write_attempts(&self) -> usize {
        self.with(|s| s.write_attempts)
    }

    fn check_reads(&self) -> Result<()> {
        if self.with(|s| s.fail_reads) {
            return Err(GatewayError::Rpc {
                code: -32000,
                message: "node unreachable".to_string(),
            });
        }
        Ok(())
    }
}

impl ChainReader for FakeChain {
    async fn proposals_length(&self) -> Result<u64> {
        self.check_reads()?;
        Ok(self.with(|s| s.length.unwrap_or(s.proposals.len() as u64)))
    }

    async fn proposal(&self, id: u64) -> Result<Option<Proposal>> {
        self.check_reads()?;
        let delay = self.with(|s| {
            s.active_reads += 1;
            s.peak_reads = s.peak_reads.max(s.active_reads);
            s.next_read_delay.take().or(s.read_delay)
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.with(|s| {
            s.active_reads -= 1;
            s.proposals.get(&id).cloned()
        }))
    }

    async fn donation_amount(&self, id: u64, donor: &Address) -> Result<Option<u64>> {
        self.check_reads()?;
        Ok(self.with(|s| s.donations.get(&(id, donor.clone())).copied()))
    }

    async fn voted_addresses(&self, id: u64) -> Result<Vec<Address>> {
        self.check_reads()?;
        Ok(self.with(|s| s.votes.get(&id).cloned().unwrap_or_default()))
    }

    async fn all_donations(&self) -> Result<Vec<DonationRecord>> {
        self.check_reads()?;
        Ok(self.with(|s| {
            let mut records: Vec<DonationRecord> = s
                .donations
                .iter()
                .map(|((id, donor), amount)| DonationRecord {
                    proposal_id: *id,
                    donor: donor.clone(),
                    amount: *amount,
                })
                .collect();
            records.sort_by(|a, b| (a.proposal_id, &a.donor).cmp(&(b.proposal_id, &b.donor)));
            records
        }))
    }

    async fn future_funds(&self, owner: &Address) -> Result<Vec<FutureFund>> {
        self.check_reads()?;
        Ok(self.with(|s| {
            s.funds
                .iter()
                .filter(|f| &f.primary == owner || &f.backup == owner)
                .cloned()
                .collect()
        }))
    }
}

impl ChainWriter for FakeChain {
    async fn submit(&self, sender: &Address, request: &WriteRequest) -> Result<TxReceipt> {
        self.with(|s| {
            s.write_attempts += 1;
            if s.fail_writes {
                return Err(GatewayError::Rpc {
                    code: -32000,
                    message: "transaction rejected".to_string(),
                });
            }
            s.submitted.push((sender.clone(), request.clone()));
            apply(s, sender, request);
            Ok(TxReceipt {
                tx_id: format!("tx-{}", s.write_attempts),
            })
        })
    }
}

fn apply(s: &mut State, sender: &Address, request: &WriteRequest) {
    match request {
        WriteRequest::Donate {
            proposal_id,
            amount,
        } => {
            if let Some(p) = s.proposals.get_mut(proposal_id) {
                p.amount_raised += amount;
                p.no_of_donations += 1;
            }
            *s.donations
                .entry((*proposal_id, sender.clone()))
                .or_default() += amount;
        }
        WriteRequest::ClaimFutureSelf { fund_id } => {
            if let Some(f) = s.funds.iter_mut().find(|f| f.id == *fund_id) {
                f.claimed = true;
            }
        }
        WriteRequest::CreateProposal(draft) => {
            let id = s.proposals.len() as u64;
            let mut p = sample_proposal(id);
            p.title = draft.title.clone();
            p.created_by = sender.clone();
            s.proposals.insert(id, p);
        }
        _ => {}
    }
}
