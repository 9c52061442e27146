use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use interfaces_linkedin_rapidapi::{RapidApiError, RawReply};
use serde::Deserialize;
use serde_json::Value;

use crate::endpoints::non_blank;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/linkedin/company-by-domain", get(company_by_domain))
        .route("/api/linkedin/profile", get(profile))
}

#[derive(Deserialize)]
pub struct DomainQuery {
    domain: Option<String>,
}

#[derive(Deserialize)]
pub struct ProfileQuery {
    url: Option<String>,
}

fn relay(result: Result<RawReply, RapidApiError>) -> Result<Json<Value>, ApiError> {
    let reply = result.map_err(|err| ApiError::internal("Request failed")(err.to_string()))?;
    if !reply.is_success() {
        return Err(ApiError::Upstream {
            status: reply.status,
            error: "Upstream error",
            details: reply.into_json(),
        });
    }
    Ok(Json(reply.into_json()))
}

async fn company_by_domain(State(state): State<AppState>, Query(params): Query<DomainQuery>) -> Result<Json<Value>, ApiError> {
    let domain = non_blank(params.domain).ok_or_else(|| ApiError::bad_request("Missing domain"))?;
    let api = state
        .linkedin_data
        .as_ref()
        .ok_or(ApiError::NotConfigured { what: "RAPIDAPI_KEY" })?;
    relay(api.company_by_domain(&domain).await)
}

async fn profile(State(state): State<AppState>, Query(params): Query<ProfileQuery>) -> Result<Json<Value>, ApiError> {
    let url = non_blank(params.url).ok_or_else(|| ApiError::bad_request("Missing url"))?;
    let api = state
        .linkedin_data
        .as_ref()
        .ok_or(ApiError::NotConfigured { what: "RAPIDAPI_KEY" })?;
    relay(api.profile(&url).await)
}
