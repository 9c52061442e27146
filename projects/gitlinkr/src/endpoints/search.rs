use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use interfaces_github_rest::models::UserSummary;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::{post::queries as posts, product::models::Product, product::queries as products};
use crate::discovery::categories::{load_categories, Categories};
use crate::discovery::startups::find_startups;
use crate::discovery::{parse_window_days, since_date, RepoCard};
use crate::endpoints::{non_blank, query};
use crate::error::ApiError;
use crate::extract::BearerToken;
use crate::state::AppState;

const TRENDING_LIMIT: i64 = 10;
const TRENDING_DAYS: i64 = 7;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/search/company", get(company))
        .route("/api/search/trending", get(trending))
        .route("/api/search/startups", get(startups))
        .route("/api/search/categories", get(categories))
}

#[derive(Deserialize)]
pub struct CompanyQuery {
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct WindowQuery {
    window: Option<String>,
    saas: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrendingDeveloper {
    login: String,
    score: i64,
}

#[derive(Debug, Default, Serialize)]
pub struct Trending {
    developers: Vec<TrendingDeveloper>,
    products: Vec<Product>,
}

#[derive(Serialize)]
pub struct StartupList {
    items: Vec<RepoCard>,
}

async fn company(
    State(state): State<AppState>,
    Query(params): Query<CompanyQuery>,
    token: BearerToken,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let name = non_blank(params.name).ok_or_else(|| ApiError::bad_request("name query required"))?;
    Ok(Json(state.github.search_users_by_company(&name, token.as_deref()).await))
}

/// Busiest posters of the last week and the highest-MRR products.
async fn trending(State(state): State<AppState>) -> Json<Trending> {
    let mut trending = Trending::default();

    match query(&state, "Failed to rank products", |conn| {
        products::list_top_by_mrr(conn, TRENDING_LIMIT)
    })
    .await
    {
        Ok(rows) => trending.products = rows,
        Err(err) => warn!(error = %err, "trending products unavailable"),
    }

    let since = Utc::now() - Duration::days(TRENDING_DAYS);
    match query(&state, "Failed to rank developers", move |conn| {
        posts::post_counts_since(conn, since, TRENDING_LIMIT)
    })
    .await
    {
        Ok(rows) => {
            trending.developers = rows
                .into_iter()
                .map(|(login, score)| TrendingDeveloper { login, score })
                .collect()
        }
        Err(err) => warn!(error = %err, "trending developers unavailable"),
    }

    Json(trending)
}

async fn startups(State(state): State<AppState>, Query(params): Query<WindowQuery>, token: BearerToken) -> Json<StartupList> {
    let days = parse_window_days(params.window.as_deref());
    let Some(since) = since_date(Utc::now(), days) else {
        warn!(days, "startup window out of range");
        return Json(StartupList { items: Vec::new() });
    };
    let saas_only = params.saas.as_deref() == Some("true");
    let token = token.or_fallback(state.config.github.fallback_token.as_deref());

    let items = find_startups(&state.github, &since, saas_only, token).await;
    Json(StartupList { items })
}

async fn categories(State(state): State<AppState>, Query(params): Query<WindowQuery>, token: BearerToken) -> Json<Categories> {
    let days = parse_window_days(params.window.as_deref());
    let Some(since) = since_date(Utc::now(), days) else {
        warn!(days, "category window out of range");
        return Json(Categories::default());
    };
    let token = token.or_fallback(state.config.github.fallback_token.as_deref());

    Json(load_categories(&state.github, &since, token).await)
}
