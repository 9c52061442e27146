use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::endpoints::non_blank;
use crate::extract::BearerToken;
use crate::recommendations::{cache_key, curated_candidates, recommend, with_companies, Candidate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/recommendations/{username}", get(recommendations))
}

#[derive(Deserialize)]
pub struct RecommendationQuery {
    company: Option<String>,
    langs: Option<String>,
}

/// People to connect with. Falls back to the curated list, so it never fails.
async fn recommendations(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<RecommendationQuery>,
    token: BearerToken,
) -> Json<Vec<Candidate>> {
    let company = non_blank(params.company);
    let langs = non_blank(params.langs);
    let key = cache_key(&username, company.as_deref(), langs.as_deref());

    if let Some(cached) = state.recommendations.get(&key) {
        debug!(%key, "recommendations cache hit");
        return Json(cached);
    }

    let token = token.or_fallback(state.config.github.fallback_token.as_deref());

    if state.config.use_dummy_data {
        return Json(with_companies(&state.github, curated_candidates(), token).await);
    }

    match recommend(&state.github, &username, company.as_deref(), langs.as_deref(), token).await {
        Ok(candidates) => {
            state.recommendations.insert(key, candidates.clone());
            Json(candidates)
        }
        Err(err) => {
            warn!(%username, error = %err, "recommendations fell back to curated list");
            Json(with_companies(&state.github, curated_candidates(), token).await)
        }
    }
}
