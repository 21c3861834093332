//! Application-wide error types.

use ff_view_model::draft::DraftErrors;
use ff_view_model::ViewError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("Invalid proposal draft")]
    Draft(DraftErrors),

    #[error("Future fund {0} cannot be claimed by this address")]
    NotClaimable(u64),

    /// A newer fetch for the same proposal and viewer replaced this one.
    #[error("Superseded by a newer fetch")]
    Superseded,

    /// Network failure and contract rejection are deliberately not told apart.
    #[error("Action failed, state unchanged: {0}")]
    WriteFailed(String),
}

impl GatewayError {
    /// Collapse any read failure into the view layer's "temporarily
    /// unavailable" category. Validation and gating errors pass through.
    pub fn into_unavailable(self) -> Self {
        match self {
            Self::Http(_) | Self::Json(_) | Self::Rpc { .. } | Self::Decode(_) => {
                Self::View(ViewError::DataUnavailable(self.to_string()))
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
