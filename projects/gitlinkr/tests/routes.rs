mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{get, send, test_app};

#[tokio::test]
async fn service_info_and_health() {
    let app = test_app(&[]);

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "GitLinkr backend");

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn validation_runs_before_the_database() {
    let app = test_app(&[]);

    let (status, body) = send(&app, Method::POST, "/api/connections", Some(json!({ "requester": "ada" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Requester and recipient are required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/connections",
        Some(json!({ "requester": "ada", "recipient": "ada" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot send connection request to yourself");

    let (status, body) = send(&app, Method::POST, "/api/follow", Some(json!({ "follower": "ada", "target": "ada" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cannot follow self");

    let (status, body) = get(&app, "/api/invitations/mine").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "inviter query required");

    let (status, body) = get(&app, "/api/search/company").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name query required");
}

#[tokio::test]
async fn missing_database_reads_as_not_configured() {
    let app = test_app(&[]);

    let (status, body) = get(&app, "/api/posts/ada").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Database not configured" }));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/connections",
        Some(json!({ "requester": "ada", "recipient": "grace" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Database not configured");
}

#[tokio::test]
async fn malformed_product_ids_are_not_found() {
    let app = test_app(&[]);

    let (status, body) = get(&app, "/api/products/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn follower_lists_degrade_to_empty() {
    let app = test_app(&[]);

    let (status, body) = get(&app, "/api/followers/ada").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn reactions_fall_back_to_memory() {
    let app = test_app(&[]);
    let like = json!({ "item_id": "post-1", "type": "like", "user": "ada" });

    let (status, _) = send(&app, Method::POST, "/api/reactions", Some(like.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/reactions",
        Some(json!({ "item_id": "post-1", "type": "like", "user": "grace" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = get(&app, "/api/reactions?ids=post-1,post-2").await;
    assert_eq!(body, json!({ "post-1": { "like": 2 } }));

    send(&app, Method::DELETE, "/api/reactions", Some(like)).await;
    let (_, body) = get(&app, "/api/reactions?ids=post-1").await;
    assert_eq!(body, json!({ "post-1": { "like": 1 } }));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/reactions",
        Some(json!({ "item_id": "post-1", "type": "rocket", "user": "ada" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = get(&app, "/api/reactions?ids=post-1").await;
    assert_eq!(body, json!({ "post-1": { "like": 1, "rocket": 1 } }));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/reactions",
        Some(json!({ "item_id": "post-1", "type": "", "user": "ada" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "item_id, type, user required");
}

#[tokio::test]
async fn repo_follows_fall_back_to_memory() {
    let app = test_app(&[]);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/repo-follows",
        Some(json!({ "user": "ada", "repo": "rust-lang/rust" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = get(&app, "/api/repo-follows/ada").await;
    assert_eq!(body, json!(["rust-lang/rust"]));

    let (status, body) = send(&app, Method::POST, "/api/repo-follows", Some(json!({ "user": "ada" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user and repo required");
}

#[tokio::test]
async fn dummy_mode_serves_canned_profiles() {
    let app = test_app(&[("USE_DUMMY_DATA", "true")]);

    let (status, body) = get(&app, "/api/profile/anyone").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["login"], "octocat");
    assert_eq!(body["repos"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn seeding_is_refused_in_production() {
    let app = test_app(&[("APP_ENV", "production")]);

    let (status, body) = send(&app, Method::POST, "/api/dev/seed-posts", Some(json!({ "username": "ada" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Seeding disabled");
}

#[tokio::test]
async fn unconfigured_integrations_answer_500() {
    let app = test_app(&[]);

    let (status, body) = get(&app, "/api/apify/runs").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "APIFY_TOKEN not configured");

    let (status, body) = get(&app, "/api/linkedin/profile?url=https://linkedin.com/in/ada").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "RAPIDAPI_KEY not configured");

    let (status, body) = get(&app, "/api/github/contacts").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing token");
}

#[tokio::test]
async fn out_of_range_search_windows_are_empty() {
    let app = test_app(&[]);

    let (status, body) = get(&app, "/api/search/startups?window=100000000d").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "items": [] }));

    let (status, body) = get(&app, "/api/search/categories?window=100000000d").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body
        .as_object()
        .unwrap()
        .values()
        .all(|bucket| bucket.as_array().is_some_and(Vec::is_empty)));
}
