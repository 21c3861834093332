//! Application configuration loaded from environment variables.

use ff_view_model::eligibility::DEFAULT_EXPIRATION_WINDOW_SECS;

use crate::errors::{GatewayError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint of the node/relay fronting the proposal contract
    pub rpc_url: String,
    /// Application id of the deployed proposal contract
    pub app_id: u64,
    /// Port for the REST API server
    pub api_port: u16,
    /// Inactivity window after which donors may request refunds; must match the contract
    pub expiration_window_secs: u64,
    /// Per-request timeout for RPC calls
    pub rpc_timeout_secs: u64,
    /// Upper bound for exponential back-off between read retries
    pub max_backoff_secs: u64,
    /// How many times a failed read is retried before giving up
    pub read_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            rpc_url: env_var("RPC_URL").map_err(|_| {
                GatewayError::Config("RPC_URL environment variable is required".to_string())
            })?,
            app_id: env_var("APP_ID")
                .map_err(|_| {
                    GatewayError::Config("APP_ID environment variable is required".to_string())
                })?
                .parse()
                .map_err(|_| GatewayError::Config("Invalid APP_ID".to_string()))?,
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid API_PORT".to_string()))?,
            expiration_window_secs: env_var("EXPIRATION_WINDOW_SECS")
                .unwrap_or_else(|_| DEFAULT_EXPIRATION_WINDOW_SECS.to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid EXPIRATION_WINDOW_SECS".to_string()))?,
            rpc_timeout_secs: env_var("RPC_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid RPC_TIMEOUT_SECS".to_string()))?,
            max_backoff_secs: env_var("MAX_BACKOFF_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid MAX_BACKOFF_SECS".to_string()))?,
            read_retries: env_var("READ_RETRIES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid READ_RETRIES".to_string()))?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| GatewayError::Config(format!("Missing env var: {key}")))
}
