use std::collections::HashMap;

use axum::{
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use interfaces_github_rest::GitHubApi;
use serde_json::json;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn search_users(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let q = params.get("q").cloned().unwrap_or_default();
    let items = if q == "org:acme" {
        json!([{ "login": "wile", "avatar_url": "a", "html_url": "h" }])
    } else if q.starts_with("language:") {
        return (StatusCode::FORBIDDEN, Json(json!({ "message": "rate limited" }))).into_response();
    } else {
        json!([])
    };
    Json(json!({ "total_count": 0, "items": items })).into_response()
}

fn mock_github() -> Router {
    Router::new()
        .route("/search/users", get(search_users))
        .route(
            "/orgs/{org}/members",
            get(|| async { StatusCode::NOT_FOUND }),
        )
        .route(
            "/users/{login}/events/public",
            get(|| async {
                Json(json!([
                    { "id": "1", "type": "WatchEvent", "actor": { "login": "octocat" }, "repo": { "name": "octo/app" }, "payload": { "action": "started" }, "created_at": "2024-05-01T10:00:00Z" },
                    { "id": 2, "type": "broken" },
                    { "id": "3", "type": "ForkEvent", "repo": { "name": "octo/app" }, "payload": { "forkee": { "full_name": "me/app" } }, "created_at": "2024-05-02T10:00:00Z" }
                ]))
            }),
        )
}

#[tokio::test]
async fn company_search_falls_back_to_org_search() {
    let base = spawn(mock_github()).await;
    let api = GitHubApi::new(reqwest::Client::new(), base);

    let users = api.search_users_by_company("acme", None).await;
    let logins: Vec<_> = users.iter().map(|u| u.login.as_str()).collect();
    assert_eq!(logins, vec!["wile"]);
}

#[tokio::test]
async fn company_search_without_slug_does_not_fall_back() {
    let base = spawn(mock_github()).await;
    let api = GitHubApi::new(reqwest::Client::new(), base);

    assert!(api.search_users_by_company("Acme Corp", None).await.is_empty());
}

#[tokio::test]
async fn language_search_degrades_to_empty() {
    let base = spawn(mock_github()).await;
    let api = GitHubApi::new(reqwest::Client::new(), base);

    assert!(api.search_users_by_language("rust", Some("token")).await.is_empty());
}

#[tokio::test]
async fn public_events_skip_undecodable_entries() {
    let base = spawn(mock_github()).await;
    let api = GitHubApi::new(reqwest::Client::new(), base);

    let events = api.fetch_public_events("octocat", None).await.unwrap();
    let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}
