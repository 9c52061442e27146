use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(info))
        .route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "GitLinkr backend",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_sec": state.started_at.elapsed().as_secs(),
        "docs": {
            "categories": "/api/search/categories",
            "people_search": "POST /api/people/search",
        },
    }))
}
