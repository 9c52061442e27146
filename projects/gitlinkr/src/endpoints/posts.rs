use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::db::follow::{models::NewFollow, queries as follows};
use crate::db::DbError;
use crate::db::post::{
    models::{NewPost, Post},
    queries,
};
use crate::endpoints::{non_blank, query};
use crate::error::ApiError;
use crate::feed::item::Artifact;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", post(create))
        .route("/api/posts/{username}", get(list))
        .route("/api/dev/seed-posts", post(seed))
}

#[derive(Deserialize)]
pub struct CreatePost {
    author: Option<String>,
    title: Option<String>,
    body: Option<String>,
    #[serde(default)]
    artifacts: Vec<Value>,
}

#[derive(Deserialize)]
pub struct SeedRequest {
    username: Option<String>,
}

async fn list(State(state): State<AppState>, Path(username): Path<String>) -> Result<Json<Vec<Post>>, ApiError> {
    let rows = query(&state, "Failed to list posts", move |conn| {
        queries::list_by_author(conn, &username)
    })
    .await?;
    Ok(Json(rows))
}

async fn create(State(state): State<AppState>, Json(body): Json<CreatePost>) -> Result<(StatusCode, Json<Post>), ApiError> {
    let (Some(author), Some(title)) = (non_blank(body.author), non_blank(body.title)) else {
        return Err(ApiError::bad_request("author and title are required"));
    };
    let row = NewPost {
        author_github_login: author,
        title,
        body: non_blank(body.body),
        artifacts: Value::Array(body.artifacts),
        created_at: None,
    };

    let mut inserted = query(&state, "Failed to create post", move |conn| {
        queries::insert_posts(conn, &[row])
    })
    .await?;

    inserted
        .pop()
        .map(|post| (StatusCode::CREATED, Json(post)))
        .ok_or_else(|| ApiError::internal("Failed to create post")("no row returned".to_string()))
}

const SAMPLE_AUTHORS: [&str; 2] = ["octocat", "torvalds"];

/// Three demo posts spread over the user and two well-known accounts, one hour apart.
fn sample_posts(username: &str, now: DateTime<Utc>) -> Vec<NewPost> {
    let authors = [username, SAMPLE_AUTHORS[0], SAMPLE_AUTHORS[1]];
    let samples = [
        (
            "Shipped caching layer v1.2",
            "Optimized cold-starts, added LRU + background revalidation. Benchmarks show ~35% latency drop.",
            Artifact::new("pr", "https://github.com/example/repo/pull/42"),
        ),
        (
            "RFC: plugin system for builders",
            "Seeking feedback on the new plugin API. Looking for early adopters this week.",
            Artifact::new("issue", "https://github.com/example/repo/issues/128"),
        ),
        (
            "Release v0.9 beta",
            "First public beta is live. Includes dark mode, offline support, and typed SDK.",
            Artifact::new("release", "https://github.com/example/repo/releases/tag/v0.9.0"),
        ),
    ];

    samples
        .into_iter()
        .enumerate()
        .map(|(i, (title, body, artifact))| NewPost {
            author_github_login: authors[i % authors.len()].to_string(),
            title: title.to_string(),
            body: Some(body.to_string()),
            artifacts: json!([artifact]),
            created_at: Some(now - Duration::hours(i as i64)),
        })
        .collect()
}

async fn seed(State(state): State<AppState>, Json(body): Json<SeedRequest>) -> Result<Json<Value>, ApiError> {
    if !state.config.seeding_allowed() {
        return Err(ApiError::Forbidden {
            message: "Seeding disabled".to_string(),
        });
    }
    let username = non_blank(body.username).ok_or_else(|| ApiError::bad_request("username required"))?;

    let rows = sample_posts(&username, Utc::now());
    let inserted = query(&state, "Failed to seed posts", move |conn| {
        let sample_follows: Vec<NewFollow> = SAMPLE_AUTHORS
            .iter()
            .filter(|author| **author != username)
            .map(|author| NewFollow {
                follower_github_login: &username,
                target_github_login: author,
            })
            .collect();
        follows::insert_follows(conn, &sample_follows)?;
        let posts = queries::insert_posts(conn, &rows)?;
        Ok::<_, DbError>(posts)
    })
    .await?;

    info!(inserted = inserted.len(), "seeded sample posts");
    Ok(Json(json!({ "inserted": inserted.len() })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn samples_rotate_authors_and_step_back_hourly() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let rows = sample_posts("ada", now);

        let authors: Vec<&str> = rows.iter().map(|r| r.author_github_login.as_str()).collect();
        assert_eq!(authors, vec!["ada", "octocat", "torvalds"]);
        assert_eq!(rows[2].created_at, Some(now - Duration::hours(2)));
        assert_eq!(rows[0].artifacts[0]["type"], "pr");
    }
}
