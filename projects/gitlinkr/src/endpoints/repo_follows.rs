use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::db::repo_follow::{models::NewRepoFollow, queries};
use crate::endpoints::{non_blank, query};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/repo-follows", post(add).delete(remove))
        .route("/api/repo-follows/{username}", get(list))
}

#[derive(Deserialize)]
pub struct RepoFollowBody {
    user: Option<String>,
    repo: Option<String>,
}

impl RepoFollowBody {
    fn pair(self) -> Result<(String, String), ApiError> {
        match (non_blank(self.user), non_blank(self.repo)) {
            (Some(user), Some(repo)) => Ok((user, repo)),
            _ => Err(ApiError::bad_request("user and repo required")),
        }
    }
}

async fn list(State(state): State<AppState>, Path(username): Path<String>) -> Json<Vec<String>> {
    let user = username.clone();
    match query(&state, "Failed to list repo follows", move |conn| {
        queries::repos_followed_by(conn, &user)
    })
    .await
    {
        Ok(repos) => Json(repos),
        Err(err) => {
            warn!(error = %err, "repo_follows table unavailable, using memory store");
            Json(state.repo_follows.list(&username))
        }
    }
}

async fn add(State(state): State<AppState>, Json(body): Json<RepoFollowBody>) -> Result<StatusCode, ApiError> {
    let (user, repo) = body.pair()?;

    let (u, r) = (user.clone(), repo.clone());
    let stored = query(&state, "Failed to follow repo", move |conn| {
        let row = NewRepoFollow {
            follower_github_login: &u,
            repo_full_name: &r,
        };
        queries::insert_repo_follow(conn, &row)
    })
    .await;

    if let Err(err) = stored {
        warn!(error = %err, "repo_follows table unavailable, using memory store");
        state.repo_follows.add(&user, &repo);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(State(state): State<AppState>, Json(body): Json<RepoFollowBody>) -> Result<StatusCode, ApiError> {
    let (user, repo) = body.pair()?;

    let (u, r) = (user.clone(), repo.clone());
    let deleted = query(&state, "Failed to unfollow repo", move |conn| {
        queries::delete_repo_follow(conn, &u, &r)
    })
    .await;

    if let Err(err) = deleted {
        warn!(error = %err, "repo_follows table unavailable, using memory store");
        state.repo_follows.remove(&user, &repo);
    }
    Ok(StatusCode::NO_CONTENT)
}
