//! JSON-RPC chain client: reads proposal state and forwards writes.
//!
//! ## Resilience
//!
//! * Reads back off exponentially on transport errors, rate limiting and
//!   soft RPC errors, up to `max_backoff` between attempts and `max_retries`
//!   attempts in total.
//! * Writes are sent exactly once. A failed write is reported, never retried.

use std::time::Duration;

use ff_view_model::{Address, DonationRecord, FutureFund, Milestone, Proposal};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::chain::{ChainReader, ChainWriter, TxReceipt, WriteRequest};
use crate::config::Config;
use crate::errors::{GatewayError, Result};

const INITIAL_BACKOFF_SECS: u64 = 1;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Milestone tuple as stored by the contract:
/// `(name, amount, proofLink, votesFor, votesAgainst, totalVoters, claimed,
/// proofSubmittedTime, votingEndTime)`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMilestone(
    pub String,
    pub u64,
    pub String,
    pub u64,
    pub u64,
    pub u64,
    pub bool,
    pub u64,
    pub u64,
);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProposal {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub amount_required: u64,
    pub created_by: String,
    pub amount_raised: u64,
    #[serde(default)]
    pub no_of_donations: u64,
    #[serde(default)]
    pub no_of_unique_donors: u64,
    pub current_milestone: u64,
    pub created_at: u64,
    pub milestones: Vec<RawMilestone>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDonation {
    pub proposal_id: u64,
    pub donor: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFutureFund {
    pub id: u64,
    pub primary: String,
    pub backup: String,
    pub unlock_time: u64,
    pub amount: u64,
    pub claimed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    tx_id: String,
}

// ─────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RpcChain {
    client: Client,
    rpc_url: String,
    app_id: u64,
    max_retries: u32,
    max_backoff: Duration,
}

impl RpcChain {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            rpc_url: config.rpc_url.clone(),
            app_id: config.app_id,
            max_retries: config.read_retries,
            max_backoff: Duration::from_secs(config.max_backoff_secs),
        }
    }

    /// Read call with back-off. `Ok(None)` when the node answers `null`.
    async fn read<T: DeserializeOwned>(&self, method: &str, args: Value) -> Result<Option<T>> {
        let mut backoff = Duration::from_secs(INITIAL_BACKOFF_SECS);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let outcome = self.call::<T>(method, build_params(self.app_id, None, args.clone())).await;

            let err = match outcome {
                Ok(value) => {
                    debug!("{method} answered (attempt {attempt})");
                    return Ok(value);
                }
                Err(e) if !is_retryable(&e) => return Err(e),
                Err(e) => e,
            };

            if attempt > self.max_retries {
                return Err(err);
            }
            warn!("{method} failed (will retry in {}s): {err}", backoff.as_secs());
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(self.max_backoff);
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>> {
        let resp = self
            .client
            .post(&self.rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GatewayError::Rpc {
                code: 429,
                message: "rate limited".to_string(),
            });
        }

        let body: RpcResponse<T> = resp.json().await?;
        if let Some(err) = body.error {
            return Err(GatewayError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(body.result)
    }
}

fn build_params(app_id: u64, sender: Option<&Address>, args: Value) -> Value {
    let mut params = json!({
        "appId": app_id,
        "args": args,
    });
    if let Some(sender) = sender {
        params["sender"] = json!(sender.as_str());
    }
    params
}

/// Code -32600 / -32601 / -32602 are hard failures; everything else transient.
fn is_retryable(err: &GatewayError) -> bool {
    match err {
        GatewayError::Http(_) => true,
        GatewayError::Rpc { code, .. } => !matches!(*code, -32602..=-32600),
        _ => false,
    }
}

impl ChainReader for RpcChain {
    async fn proposals_length(&self) -> Result<u64> {
        Ok(self
            .read::<u64>("getProposalsLength", json!({}))
            .await?
            .unwrap_or(0))
    }

    async fn proposal(&self, id: u64) -> Result<Option<Proposal>> {
        self.read::<RawProposal>("getProposal", json!({ "proposalId": id }))
            .await?
            .map(|raw| decode_proposal(id, raw))
            .transpose()
    }

    async fn donation_amount(&self, id: u64, donor: &Address) -> Result<Option<u64>> {
        self.read::<u64>(
            "getDonationAmount",
            json!({ "proposalId": id, "donor": donor.as_str() }),
        )
        .await
    }

    async fn voted_addresses(&self, id: u64) -> Result<Vec<Address>> {
        let raw = self
            .read::<Vec<String>>("getVotedAddresses", json!({ "proposalId": id }))
            .await?
            .unwrap_or_default();
        Ok(raw.into_iter().map(Address::new).collect())
    }

    async fn all_donations(&self) -> Result<Vec<DonationRecord>> {
        let raw = self
            .read::<Vec<RawDonation>>("getAllDonations", json!({}))
            .await?
            .unwrap_or_default();
        Ok(raw.into_iter().map(decode_donation).collect())
    }

    async fn future_funds(&self, owner: &Address) -> Result<Vec<FutureFund>> {
        let raw = self
            .read::<Vec<RawFutureFund>>("getFutureFunds", json!({ "owner": owner.as_str() }))
            .await?
            .unwrap_or_default();
        Ok(raw.into_iter().map(decode_future_fund).collect())
    }
}

impl ChainWriter for RpcChain {
    async fn submit(&self, sender: &Address, request: &WriteRequest) -> Result<TxReceipt> {
        let args = serde_json::to_value(request)?;
        let params = build_params(self.app_id, Some(sender), args);
        let receipt = self
            .call::<RawReceipt>(request.method(), params)
            .await?
            .ok_or_else(|| GatewayError::Decode(format!("{} returned no receipt", request.method())))?;
        Ok(TxReceipt {
            tx_id: receipt.tx_id,
        })
    }
}

// ─────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────

pub fn decode_proposal(id: u64, raw: RawProposal) -> Result<Proposal> {
    let current_milestone = usize::try_from(raw.current_milestone).map_err(|_| {
        GatewayError::Decode(format!(
            "proposal {id}: current milestone {} out of range",
            raw.current_milestone
        ))
    })?;

    let milestones = raw
        .milestones
        .into_iter()
        .map(|m| Milestone {
            name: m.0,
            amount: m.1,
            proof_link: m.2,
            votes_for: m.3,
            votes_against: m.4,
            total_voters: m.5,
            claimed: m.6,
            proof_submitted_time: m.7,
            voting_end_time: m.8,
        })
        .collect();

    Ok(Proposal {
        id,
        name: raw.name,
        title: raw.title,
        description: raw.description,
        category: raw.category,
        created_by: Address::new(raw.created_by),
        created_at: raw.created_at,
        amount_required: raw.amount_required,
        amount_raised: raw.amount_raised,
        no_of_donations: raw.no_of_donations,
        no_of_unique_donors: raw.no_of_unique_donors,
        current_milestone,
        milestones,
    })
}

fn decode_donation(raw: RawDonation) -> DonationRecord {
    DonationRecord {
        proposal_id: raw.proposal_id,
        donor: Address::new(raw.donor),
        amount: raw.amount,
    }
}

fn decode_future_fund(raw: RawFutureFund) -> FutureFund {
    FutureFund {
        id: raw.id,
        primary: Address::new(raw.primary),
        backup: Address::new(raw.backup),
        unlock_time: raw.unlock_time,
        amount: raw.amount,
        claimed: raw.claimed,
    }
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
