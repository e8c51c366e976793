//! JSON API for the pricing engine.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::AppState;

use super::errors::PricingError;
use super::requests::QuoteRequest;
use super::responses::{PolicySummaryResponse, PricingErrorResponse, QuoteResponse};
use super::services;

/// Pricing API routes, mounted under `/api/pricing`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/policies", get(list_policies))
        .route("/policies/:name", get(get_policy))
        .route("/quote", post(create_quote))
}

/// Pricing error rendered as a JSON body
pub struct ApiError(PricingError);

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PricingError::InvalidOption(_) => StatusCode::BAD_REQUEST,
            PricingError::UnknownPolicy { .. } => StatusCode::NOT_FOUND,
            PricingError::Policy(e) => {
                tracing::error!("Policy configuration error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(PricingErrorResponse::from(&self.0))).into_response()
    }
}

/// List every policy and the options it offers
async fn list_policies(State(state): State<AppState>) -> Json<Vec<PolicySummaryResponse>> {
    let set = state.policies.snapshot();
    let default = set.default_name();
    Json(
        set.policies()
            .map(|p| PolicySummaryResponse::new(p, p.name == default))
            .collect(),
    )
}

async fn get_policy(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PolicySummaryResponse>, ApiError> {
    let set = state.policies.snapshot();
    let policy = set.resolve(Some(name.as_str()))?;
    Ok(Json(PolicySummaryResponse::new(
        &policy,
        policy.name == set.default_name(),
    )))
}

/// Price the submitted options
async fn create_quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let quote = services::quote(&state.policies, &request)?;
    Ok(Json(QuoteResponse::new(&quote.policy, &quote.breakdown)))
}
