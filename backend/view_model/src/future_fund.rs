//! Future Self fund: time-locked deposits released to a primary or backup
//! address once the unlock time passes.
//!
//! Unrelated to the proposal lifecycle. Like proposals, deposits are never
//! patched locally after a claim; the caller re-fetches.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ViewError};
use crate::types::{Address, FutureFund};
use crate::units::{format_display_amount, parse_display_amount, to_display_units};
use crate::view::format_date;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FutureFundStatus {
    Locked,
    Matured,
    Claimed,
}

pub fn status(fund: &FutureFund, now: u64) -> FutureFundStatus {
    if fund.claimed {
        FutureFundStatus::Claimed
    } else if now >= fund.unlock_time {
        FutureFundStatus::Matured
    } else {
        FutureFundStatus::Locked
    }
}

/// Matured, unclaimed, and `viewer` is one of the two beneficiaries.
pub fn can_claim(fund: &FutureFund, viewer: Option<&Address>, now: u64) -> bool {
    let Some(viewer) = viewer else {
        return false;
    };
    status(fund, now) == FutureFundStatus::Matured
        && (&fund.primary == viewer || &fund.backup == viewer)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureFundView {
    pub id: u64,
    pub primary: Address,
    pub backup: Address,
    pub unlock_time: u64,
    pub unlocks_on: String,
    pub amount: f64,
    pub amount_text: String,
    pub status: FutureFundStatus,
    pub claimable: bool,
}

impl FutureFundView {
    pub fn of(fund: &FutureFund, viewer: Option<&Address>, now: u64) -> Self {
        Self {
            id: fund.id,
            primary: fund.primary.clone(),
            backup: fund.backup.clone(),
            unlock_time: fund.unlock_time,
            unlocks_on: format_date(fund.unlock_time),
            amount: to_display_units(fund.amount),
            amount_text: format_display_amount(fund.amount),
            status: status(fund, now),
            claimable: can_claim(fund, viewer, now),
        }
    }
}

/// Deposit form as submitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositDraft {
    pub primary: String,
    pub backup: String,
    pub unlock_time: u64,
    /// Display units as typed.
    pub amount: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedDeposit {
    pub primary: Address,
    pub backup: Address,
    pub unlock_time: u64,
    pub amount: u64,
}

impl DepositDraft {
    pub fn validate(&self, now: u64) -> Result<ValidatedDeposit> {
        let primary = self.primary.trim();
        let backup = self.backup.trim();
        if primary.is_empty() || backup.is_empty() {
            return Err(ViewError::InvalidInput(
                "primary and backup addresses are required".to_string(),
            ));
        }
        if primary == backup {
            return Err(ViewError::InvalidInput(
                "backup address must differ from primary".to_string(),
            ));
        }
        if self.unlock_time <= now {
            return Err(ViewError::InvalidInput(
                "unlock time must be in the future".to_string(),
            ));
        }
        let amount = parse_display_amount(&self.amount)?;
        if amount == 0 {
            return Err(ViewError::InvalidAmount(
                "deposit must be greater than 0".to_string(),
            ));
        }
        Ok(ValidatedDeposit {
            primary: Address::new(primary),
            backup: Address::new(backup),
            unlock_time: self.unlock_time,
            amount,
        })
    }
}
