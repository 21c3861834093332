//! Error taxonomy shared by the derivation layer and its callers.

use thiserror::Error;

use crate::eligibility::Action;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// Fetch failed or the record is absent. Rendered as an empty state.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Malformed currency input, rejected before any contract call.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed non-currency form input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The action is not in the viewer's current action set.
    #[error("Action not eligible: {0}")]
    ActionNotEligible(Action),
}

pub type Result<T> = std::result::Result<T, ViewError>;
