use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use interfaces_github_rest::models::Repository;
use serde::Serialize;
use serde_json::{json, Value};

use crate::dummy;
use crate::error::ApiError;
use crate::extract::BearerToken;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/github/repos/{username}", get(repos))
        .route("/api/github/contacts", get(contacts))
        .route("/api/profile/{username}", get(profile))
}

/// Repository card without GitHub's passthrough fields.
#[derive(Debug, Serialize)]
pub struct RepoSummary {
    id: u64,
    name: String,
    full_name: String,
    html_url: String,
    description: Option<String>,
    language: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
}

impl From<Repository> for RepoSummary {
    fn from(repo: Repository) -> Self {
        Self {
            id: repo.id,
            name: repo.name,
            full_name: repo.full_name,
            html_url: repo.html_url,
            description: repo.description,
            language: repo.language,
            stargazers_count: repo.stargazers_count,
            forks_count: repo.forks_count,
        }
    }
}

async fn repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
    token: BearerToken,
) -> Result<Json<Vec<RepoSummary>>, ApiError> {
    let token = token.or_fallback(state.config.github.fallback_token.as_deref());
    let repos = state
        .github
        .fetch_user_repos(token, &username)
        .await
        .map_err(|err| ApiError::internal("Failed to list repos")(err.to_string()))?;
    Ok(Json(repos.into_iter().map(RepoSummary::from).collect()))
}

async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    token: BearerToken,
) -> Result<Json<Value>, ApiError> {
    if state.config.use_dummy_data {
        return Ok(Json(dummy::profile_response()));
    }

    let token = token.or_fallback(state.config.github.fallback_token.as_deref());
    let failed = |err: interfaces_github_rest::GitHubRequestError| {
        ApiError::internal("Failed to fetch GitHub data")(err.to_string())
    };
    let user = state.github.fetch_public_profile(&username, token).await.map_err(failed)?;
    let repos = state.github.fetch_user_repos(token, &username).await.map_err(failed)?;

    Ok(Json(json!({ "user": user, "repos": repos })))
}

/// Followers and following of the token's owner.
async fn contacts(State(state): State<AppState>, token: BearerToken) -> Result<Json<Value>, ApiError> {
    let token = token.as_deref().ok_or(ApiError::Unauthorized {
        message: "Missing token".to_string(),
    })?;

    let (followers, following) = tokio::join!(state.github.fetch_followers(token), state.github.fetch_following(token));
    match (followers, following) {
        (Ok(followers), Ok(following)) => Ok(Json(json!({ "followers": followers, "following": following }))),
        (Err(err), _) | (_, Err(err)) => Err(ApiError::internal("GitHub contacts fetch failed")(err.to_string())),
    }
}
