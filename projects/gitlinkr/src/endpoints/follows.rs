use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::db::follow::{models::NewFollow, queries};
use crate::endpoints::{non_blank, query};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/follow", post(follow).delete(unfollow))
        .route("/api/followers/{username}", get(followers))
        .route("/api/following/{username}", get(following))
}

#[derive(Deserialize)]
pub struct FollowBody {
    follower: Option<String>,
    target: Option<String>,
}

impl FollowBody {
    fn pair(self) -> Result<(String, String), ApiError> {
        match (non_blank(self.follower), non_blank(self.target)) {
            (Some(follower), Some(target)) => Ok((follower, target)),
            _ => Err(ApiError::bad_request("follower and target are required")),
        }
    }
}

async fn follow(State(state): State<AppState>, Json(body): Json<FollowBody>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (follower, target) = body.pair()?;
    if follower == target {
        return Err(ApiError::bad_request("cannot follow self"));
    }

    query(&state, "Failed to follow", move |conn| {
        let row = NewFollow {
            follower_github_login: &follower,
            target_github_login: &target,
        };
        queries::insert_follows(conn, &[row])
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "ok": true }))))
}

async fn unfollow(State(state): State<AppState>, Json(body): Json<FollowBody>) -> Result<StatusCode, ApiError> {
    let (follower, target) = body.pair()?;
    query(&state, "Failed to unfollow", move |conn| {
        queries::delete_follow(conn, &follower, &target)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn followers(State(state): State<AppState>, Path(username): Path<String>) -> Json<Vec<String>> {
    let result = query(&state, "Failed to list followers", move |conn| {
        queries::followers_of(conn, &username)
    })
    .await;
    Json(logins_or_empty(result))
}

async fn following(State(state): State<AppState>, Path(username): Path<String>) -> Json<Vec<String>> {
    let result = query(&state, "Failed to list following", move |conn| {
        queries::following_of(conn, &username)
    })
    .await;
    Json(logins_or_empty(result))
}

fn logins_or_empty(result: Result<Vec<String>, ApiError>) -> Vec<String> {
    result.unwrap_or_else(|err| {
        warn!(error = %err, "follow list unavailable");
        Vec::new()
    })
}
