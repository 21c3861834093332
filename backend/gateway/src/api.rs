//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ff_view_model::catalog::{filter_proposals, Leaderboard};
use ff_view_model::draft::{DraftErrors, ProposalDraft};
use ff_view_model::future_fund::{DepositDraft, FutureFundView};
use ff_view_model::{derive_view, Address, LifecyclePolicy, ProposalView, ViewError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chain::Chain;
use crate::dispatch::{ActionRequest, DispatchOutcome, Dispatcher};
use crate::errors::{GatewayError, Result};
use crate::snapshot::{unix_now, SnapshotLoader};

pub struct AppState<C> {
    pub loader: Arc<SnapshotLoader<C>>,
    pub dispatcher: Dispatcher<C>,
}

impl<C: Chain> AppState<C> {
    pub fn new(chain: Arc<C>, policy: LifecyclePolicy) -> Self {
        let loader = Arc::new(SnapshotLoader::new(chain));
        let dispatcher = Dispatcher::new(Arc::clone(&loader), policy);
        Self { loader, dispatcher }
    }
}

pub fn router<C: Chain>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/proposals",
            get(list_proposals::<C>).post(create_proposal::<C>),
        )
        .route("/proposals/:id", get(get_proposal::<C>))
        .route("/proposals/:id/actions", post(post_action::<C>))
        .route("/leaderboard", get(get_leaderboard::<C>))
        .route(
            "/future-funds",
            get(list_future_funds::<C>).post(fund_future_self::<C>),
        )
        .route("/future-funds/:id/claim", post(claim_future_fund::<C>))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewerQuery {
    pub viewer: Option<String>,
}

impl ViewerQuery {
    /// An empty `viewer` means no wallet is connected.
    fn address(&self) -> Option<Address> {
        self.viewer
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(Address::new)
    }
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner: Address,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    pub sender: Address,
    #[serde(flatten)]
    pub draft: ProposalDraft,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundRequest {
    pub sender: Address,
    #[serde(flatten)]
    pub deposit: DepositDraft,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub sender: Address,
}

#[derive(Serialize)]
pub struct ProposalsResponse {
    pub count: usize,
    pub proposals: Vec<ProposalView>,
}

#[derive(Serialize)]
pub struct FutureFundsResponse {
    pub count: usize,
    pub funds: Vec<FutureFundView>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Whether trying the same request again may succeed.
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<DraftErrors>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let err = self.into_unavailable();
        let (status, retryable) = match &err {
            GatewayError::View(ViewError::DataUnavailable(_)) => (StatusCode::NOT_FOUND, true),
            GatewayError::View(ViewError::InvalidAmount(_) | ViewError::InvalidInput(_))
            | GatewayError::Draft(_) => (StatusCode::BAD_REQUEST, false),
            GatewayError::View(ViewError::ActionNotEligible(_)) | GatewayError::NotClaimable(_) => {
                (StatusCode::FORBIDDEN, false)
            }
            GatewayError::Superseded => (StatusCode::CONFLICT, true),
            GatewayError::WriteFailed(_) => (StatusCode::BAD_GATEWAY, true),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, false),
        };
        let fields = match &err {
            GatewayError::Draft(errors) => Some(errors.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            error: err.to_string(),
            retryable,
            fields,
        };
        (status, Json(body)).into_response()
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /proposals?search=&category=`
///
/// Anonymous views of every readable proposal. An unreachable chain yields
/// an empty list rather than an error.
pub async fn list_proposals<C: Chain>(
    State(state): State<Arc<AppState<C>>>,
    Query(query): Query<ListQuery>,
) -> Json<ProposalsResponse> {
    let all = match state.loader.load_all().await {
        Ok(all) => all,
        Err(e) => {
            warn!("Proposal list unavailable: {e}");
            Vec::new()
        }
    };
    let now = unix_now();
    let policy = state.dispatcher.policy();
    let proposals: Vec<ProposalView> = filter_proposals(&all, &query.search, &query.category)
        .into_iter()
        .map(|p| derive_view(p, None, &Default::default(), now, policy))
        .collect();
    Json(ProposalsResponse {
        count: proposals.len(),
        proposals,
    })
}

/// `GET /proposals/:id?viewer=`
pub async fn get_proposal<C: Chain>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<u64>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<ProposalView>> {
    let viewer = query.address();
    let view = state.dispatcher.view(id, viewer.as_ref()).await?;
    Ok(Json(view))
}

/// `POST /proposals`
pub async fn create_proposal<C: Chain>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<CreateProposalRequest>,
) -> Result<Json<DispatchOutcome<u64>>> {
    info!("Create proposal requested by {}", body.sender.shortened());
    let outcome = state
        .dispatcher
        .create_proposal(&body.sender, &body.draft)
        .await?;
    Ok(Json(outcome))
}

/// `POST /proposals/:id/actions`
pub async fn post_action<C: Chain>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<u64>,
    Json(body): Json<ActionRequest>,
) -> Result<Json<DispatchOutcome<ProposalView>>> {
    info!("{} requested on proposal {id}", body.action);
    let outcome = state.dispatcher.dispatch(id, body).await?;
    Ok(Json(outcome))
}

/// `GET /leaderboard`
pub async fn get_leaderboard<C: Chain>(State(state): State<Arc<AppState<C>>>) -> Json<Leaderboard> {
    let chain = state.loader.chain();
    let (proposals, donations) = tokio::join!(state.loader.load_all(), chain.all_donations());
    match (proposals, donations) {
        (Ok(proposals), Ok(donations)) => Json(Leaderboard::build(&proposals, &donations)),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Leaderboard unavailable: {e}");
            Json(Leaderboard::default())
        }
    }
}

/// `GET /future-funds?owner=`
pub async fn list_future_funds<C: Chain>(
    State(state): State<Arc<AppState<C>>>,
    Query(query): Query<OwnerQuery>,
) -> Json<FutureFundsResponse> {
    let funds = match state.dispatcher.future_funds(&query.owner).await {
        Ok(funds) => funds,
        Err(e) => {
            warn!("Future funds for {} unavailable: {e}", query.owner.shortened());
            Vec::new()
        }
    };
    Json(FutureFundsResponse {
        count: funds.len(),
        funds,
    })
}

/// `POST /future-funds`
pub async fn fund_future_self<C: Chain>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<FundRequest>,
) -> Result<Json<DispatchOutcome<Vec<FutureFundView>>>> {
    let outcome = state
        .dispatcher
        .fund_future_self(&body.sender, &body.deposit)
        .await?;
    Ok(Json(outcome))
}

/// `POST /future-funds/:id/claim`
pub async fn claim_future_fund<C: Chain>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<u64>,
    Json(body): Json<ClaimRequest>,
) -> Result<Json<DispatchOutcome<Vec<FutureFundView>>>> {
    let outcome = state
        .dispatcher
        .claim_future_self(&body.sender, id)
        .await?;
    Ok(Json(outcome))
}
