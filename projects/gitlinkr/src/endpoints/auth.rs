use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::dummy;
use crate::endpoints::non_blank;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/github", get(github_start))
        .route("/auth/github/callback", get(github_callback))
        .route("/auth/linkedin", get(linkedin_start))
        .route("/auth/linkedin/callback", get(linkedin_callback))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
}

async fn github_start(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let app = state.github_oauth.as_ref().ok_or(ApiError::NotConfigured {
        what: "GitHub OAuth env vars",
    })?;
    Ok(Redirect::to(&app.authorize_url()))
}

/// Exchanges the code, then answers with the token, the user and their repositories.
async fn github_callback(State(state): State<AppState>, Query(params): Query<CallbackQuery>) -> Result<Json<Value>, ApiError> {
    if state.config.use_dummy_data {
        return Ok(Json(dummy::auth_response()));
    }

    let code = non_blank(params.code).ok_or_else(|| ApiError::bad_request("Missing ?code parameter"))?;
    let app = state.github_oauth.as_ref().ok_or(ApiError::NotConfigured {
        what: "GitHub OAuth env vars",
    })?;
    let failed = ApiError::internal("OAuth flow failed");

    let token = app
        .exchange_code_for_token(&code)
        .await
        .map_err(|err| failed(err.to_string()))?;

    let (user, repos) = async {
        let user = state.github.fetch_authenticated_user(&token).await?;
        let login = user.get("login").and_then(Value::as_str).unwrap_or_default();
        let repos = state.github.fetch_user_repos(Some(&token), login).await?;
        Ok::<_, interfaces_github_rest::GitHubRequestError>((user, repos))
    }
    .await
    .map_err(|err| ApiError::internal("OAuth flow failed")(err.to_string()))?;

    let login = user.get("login").and_then(|login| login.as_str()).unwrap_or_default();
    info!(login, "GitHub sign-in");
    Ok(Json(json!({ "token": token, "user": user, "repos": repos })))
}

async fn linkedin_start(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let app = state.linkedin_oauth.as_ref().ok_or(ApiError::NotConfigured {
        what: "LinkedIn OAuth env vars",
    })?;
    Ok(Redirect::to(&app.authorize_url(&Uuid::new_v4().to_string())))
}

async fn linkedin_callback(State(state): State<AppState>, Query(params): Query<CallbackQuery>) -> Result<Json<Value>, ApiError> {
    let code = non_blank(params.code).ok_or_else(|| ApiError::bad_request("Missing code"))?;
    let app = state.linkedin_oauth.as_ref().ok_or(ApiError::NotConfigured {
        what: "LinkedIn OAuth env vars",
    })?;

    let result = async {
        let token = app.exchange_code_for_token(&code).await?;
        let profile = app.fetch_profile(&token).await?;
        Ok::<_, interfaces_linkedin_oauth::LinkedInError>((token, profile))
    }
    .await;

    let (token, profile) = result.map_err(|err| ApiError::internal("LinkedIn OAuth failed")(err.to_string()))?;
    Ok(Json(json!({ "token": token, "profile": profile })))
}
