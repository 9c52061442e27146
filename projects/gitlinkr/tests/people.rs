mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use common::{send, test_app};

/// Actor inputs received by the mock, in order.
type Inputs = Arc<Mutex<Vec<Value>>>;

async fn search_users(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    let logins: &[&str] = if q.starts_with("company:") {
        &["co"]
    } else if q.starts_with("language:") {
        &["polyglot", "co"]
    } else {
        &[]
    };
    let items: Vec<Value> = logins.iter().map(|login| json!({ "login": login })).collect();
    Json(json!({ "items": items }))
}

async fn start_run(State(inputs): State<Inputs>, Json(input): Json<Value>) -> Json<Value> {
    inputs.lock().unwrap().push(input);
    Json(json!({ "data": { "id": "run-1", "status": "READY" } }))
}

async fn get_run() -> Json<Value> {
    Json(json!({ "data": { "id": "run-1", "status": "SUCCEEDED", "defaultDatasetId": "ds-1" } }))
}

async fn dataset_items() -> Json<Value> {
    Json(json!([
        { "fullName": "Ada Lovelace", "headline": "Engineer", "linkedinUrl": "https://linkedin.com/in/ada" },
        { "basic_info": { "fullname": "Grace Hopper", "location": { "full": "Arlington" } } },
    ]))
}

/// GitHub user search and the Apify actor API on one listener.
async fn mock_upstreams(inputs: Inputs) -> String {
    let router = Router::new()
        .route("/search/users", get(search_users))
        .route("/acts/{actor}/runs", post(start_run))
        .route("/actor-runs/{run_id}", get(get_run))
        .route("/datasets/{dataset_id}/items", get(dataset_items))
        .with_state(inputs);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn search_combines_github_and_linkedin() {
    let inputs = Inputs::default();
    let base = mock_upstreams(inputs.clone()).await;
    let app = test_app(&[
        ("GITHUB_API_URL", base.as_str()),
        ("APIFY_BASE_URL", base.as_str()),
        ("APIFY_TOKEN", "tkn"),
    ]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/people/search",
        Some(json!({ "keywords": "rust", "company": "acme", "lang": "Rust", "maxResults": "25" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let users: Vec<(&str, i64)> = body["github"]["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| (u["login"].as_str().unwrap(), u["score"].as_i64().unwrap()))
        .collect();
    assert_eq!(users, vec![("co", 3), ("polyglot", 1)]);

    let linkedin = &body["linkedin"];
    assert_eq!(linkedin["status"], "SUCCEEDED");
    assert_eq!(linkedin["items"][0]["fullName"], "Ada Lovelace");
    assert_eq!(linkedin["items"][0]["profileUrl"], "https://linkedin.com/in/ada");
    assert_eq!(linkedin["items"][1]["fullName"], "Grace Hopper");
    assert_eq!(linkedin["items"][1]["location"], "Arlington");
    assert_eq!(linkedin["rawItems"].as_array().map(Vec::len), Some(2));

    let sent = inputs.lock().unwrap().clone();
    assert_eq!(sent, vec![json!({ "keywords": "rust", "company": "acme", "maxResults": 25 })]);
}

#[tokio::test]
async fn search_without_linkedin_terms_skips_the_actor() {
    let inputs = Inputs::default();
    let base = mock_upstreams(inputs.clone()).await;
    let app = test_app(&[
        ("GITHUB_API_URL", base.as_str()),
        ("APIFY_BASE_URL", base.as_str()),
        ("APIFY_TOKEN", "tkn"),
    ]);

    let (status, body) = send(&app, Method::POST, "/api/people/search", Some(json!({ "lang": "Go" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["linkedin"], json!({ "status": "SKIPPED", "items": [] }));
    assert_eq!(body["github"]["users"][0]["login"], "polyglot");
    assert!(inputs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn enrich_waits_for_the_dataset() {
    let inputs = Inputs::default();
    let base = mock_upstreams(inputs.clone()).await;
    let app = test_app(&[("APIFY_BASE_URL", base.as_str()), ("APIFY_TOKEN", "tkn")]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/people/enrich",
        Some(json!({ "name": "Ada", "company": "Acme", "maxResults": 1.9 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SUCCEEDED");
    assert_eq!(body["runId"], "run-1");
    assert_eq!(body["items"].as_array().map(Vec::len), Some(2));

    let sent = inputs.lock().unwrap().clone();
    assert_eq!(sent, vec![json!({ "keywords": "Ada Acme", "maxResults": 1 })]);

    let (status, body) = send(&app, Method::POST, "/api/people/enrich", Some(json!({ "location": "Paris" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Provide at least one of name, vanity, or company");
}
