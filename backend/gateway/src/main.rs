//! Fact Fund gateway: entry point.
//!
//! Reads proposal state from the contract over JSON-RPC, derives view models
//! for the presentation layer and forwards writes only after re-checking the
//! eligibility gate against freshly fetched state.

mod api;
mod chain;
mod config;
mod dispatch;
mod errors;
mod rpc;
mod snapshot;

#[cfg(test)]
mod fake;

use std::sync::Arc;
use std::time::Duration;

use ff_view_model::LifecyclePolicy;
use reqwest::Client;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::AppState;
use config::Config;
use rpc::RpcChain;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    info!(
        "Contract app {} via {} (refund window {}s)",
        config.app_id, config.rpc_url, config.expiration_window_secs
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(config.rpc_timeout_secs))
        .build()?;
    let chain = Arc::new(RpcChain::new(client, &config));

    let policy = LifecyclePolicy {
        expiration_window_secs: config.expiration_window_secs,
    };
    let state = Arc::new(AppState::new(chain, policy));

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
