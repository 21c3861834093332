//! Fetching of proposal snapshots, one fresh read per derivation.
//!
//! Each fetch is keyed by `(proposal id, viewer)`. Starting a new fetch for a
//! key cancels the one already in flight, which then resolves as
//! [`GatewayError::Superseded`]. Results are never merged or cached: the
//! last fetch wins and the view model is derived from it alone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use ff_view_model::{Address, DonorContext, Proposal, ViewError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::chain::ChainReader;
use crate::errors::{GatewayError, Result};

/// Current wall-clock time in unix seconds.
pub fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// Everything one derivation needs, read in one go.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub proposal: Proposal,
    pub donor: DonorContext,
    /// Unix seconds at which the reads completed.
    pub fetched_at: u64,
}

/// Upper bound on proposal reads in flight during [`SnapshotLoader::load_all`].
pub const MAX_CONCURRENT_READS: usize = 8;

/// Ids past this are not listed, whatever the contract reports.
pub const MAX_LISTED_PROPOSALS: u64 = 10_000;

type FetchKey = (u64, Option<Address>);
type InFlightMap = HashMap<FetchKey, (u64, CancellationToken)>;

pub struct SnapshotLoader<C> {
    chain: Arc<C>,
    in_flight: Mutex<InFlightMap>,
    generation: AtomicU64,
}

impl<C: ChainReader> SnapshotLoader<C> {
    pub fn new(chain: Arc<C>) -> Self {
        Self {
            chain,
            in_flight: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch the proposal and the viewer's donor context, superseding any
    /// older fetch for the same key.
    pub async fn load(&self, proposal_id: u64, viewer: Option<&Address>) -> Result<Snapshot> {
        let key: FetchKey = (proposal_id, viewer.cloned());
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let previous = self
            .lock()
            .insert(key.clone(), (generation, token.clone()));
        if let Some((_, previous)) = previous {
            debug!("Superseding in-flight fetch for proposal {proposal_id}");
            previous.cancel();
        }
        // Removes the entry on every exit, including when this future is dropped.
        let _registration = Registration {
            in_flight: &self.in_flight,
            key,
            generation,
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(GatewayError::Superseded),
            res = self.fetch(proposal_id, viewer) => res,
        }
    }

    /// Fetch without taking part in supersession. Used ahead of writes, which
    /// a concurrent page refresh must not cancel.
    pub async fn load_fresh(&self, proposal_id: u64, viewer: Option<&Address>) -> Result<Snapshot> {
        self.fetch(proposal_id, viewer).await
    }

    async fn fetch(&self, proposal_id: u64, viewer: Option<&Address>) -> Result<Snapshot> {
        let donation = async {
            match viewer {
                Some(address) => self.chain.donation_amount(proposal_id, address).await,
                None => Ok(None),
            }
        };

        let (proposal, voted, donated) = tokio::try_join!(
            self.chain.proposal(proposal_id),
            self.chain.voted_addresses(proposal_id),
            donation,
        )
        .map_err(GatewayError::into_unavailable)?;

        let proposal = proposal.ok_or_else(|| {
            GatewayError::View(ViewError::DataUnavailable(format!(
                "proposal {proposal_id} not found"
            )))
        })?;

        Ok(Snapshot {
            proposal,
            donor: DonorContext::from_reads(donated, &voted, viewer),
            fetched_at: unix_now(),
        })
    }

    /// Every proposal the contract knows about. Unreadable entries are skipped.
    ///
    /// At most [`MAX_CONCURRENT_READS`] reads run at once.
    pub async fn load_all(&self) -> Result<Vec<Proposal>> {
        let reported = self
            .chain
            .proposals_length()
            .await
            .map_err(GatewayError::into_unavailable)?;
        let length = if reported > MAX_LISTED_PROPOSALS {
            warn!(
                "Contract reports {reported} proposals, listing the first {MAX_LISTED_PROPOSALS}"
            );
            MAX_LISTED_PROPOSALS
        } else {
            reported
        };

        let mut ids = 0..length;
        let mut set = JoinSet::new();
        let mut proposals = Vec::new();
        loop {
            while set.len() < MAX_CONCURRENT_READS {
                let Some(id) = ids.next() else { break };
                let chain = Arc::clone(&self.chain);
                set.spawn(async move { (id, chain.proposal(id).await) });
            }
            let Some(joined) = set.join_next().await else {
                break;
            };
            match joined {
                Ok((_, Ok(Some(p)))) => proposals.push(p),
                Ok((id, Ok(None))) => debug!("Proposal {id} absent, skipping"),
                Ok((id, Err(e))) => warn!("Proposal {id} unavailable: {e}"),
                Err(e) => warn!("Proposal fetch task failed: {e}"),
            }
        }
        proposals.sort_by_key(|p| p.id);
        Ok(proposals)
    }

    pub fn chain(&self) -> &Arc<C> {
        &self.chain
    }

    fn lock(&self) -> MutexGuard<'_, InFlightMap> {
        lock_map(&self.in_flight)
    }
}

fn lock_map(map: &Mutex<InFlightMap>) -> MutexGuard<'_, InFlightMap> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One fetch's entry in the in-flight map. Dropping it removes the entry
/// unless a newer fetch has taken the key over.
struct Registration<'a> {
    in_flight: &'a Mutex<InFlightMap>,
    key: FetchKey,
    generation: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let mut map = lock_map(self.in_flight);
        if map.get(&self.key).is_some_and(|(g, _)| *g == self.generation) {
            map.remove(&self.key);
        }
    }
}
