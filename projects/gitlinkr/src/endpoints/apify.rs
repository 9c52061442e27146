use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use interfaces_apify_actors::{ActorRun, ApifyClient, ApifyError, ApifyReply, PollOptions};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::{AppState, State as Shared};

const RUN_LIST_LIMIT: u32 = 25;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/apify/runs", get(list_runs))
        .route("/api/apify/run", post(start_run))
        .route("/api/apify/run/{run_id}", get(get_run))
        .route("/api/apify/dataset/{dataset_id}", get(dataset))
        .route("/api/apify/search", post(search))
}

#[derive(Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    input: Option<Value>,
    #[serde(default)]
    wait: bool,
}

pub(crate) fn client(state: &Shared) -> Result<&ApifyClient, ApiError> {
    state
        .apify
        .as_ref()
        .ok_or(ApiError::NotConfigured { what: "APIFY_TOKEN" })
}

/// Non-2xx answers keep Apify's status and body.
pub(crate) fn upstream(status: axum::http::StatusCode, body: Value) -> ApiError {
    ApiError::Upstream {
        status,
        error: "Apify error",
        details: body,
    }
}

fn relay(context: &'static str, result: Result<ApifyReply, ApifyError>) -> Result<Json<Value>, ApiError> {
    let reply = result.map_err(|err| ApiError::internal(context)(err.to_string()))?;
    if !reply.is_success() {
        return Err(upstream(reply.status, reply.body));
    }
    Ok(Json(reply.body))
}

async fn list_runs(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let apify = client(&state)?;
    relay("Failed to list runs", apify.list_runs(RUN_LIST_LIMIT).await)
}

async fn start_run(State(state): State<AppState>, body: Option<Json<Value>>) -> Result<Json<Value>, ApiError> {
    let apify = client(&state)?;
    let input = body.map(|Json(input)| input).unwrap_or_else(|| json!({}));
    relay("Failed to start run", apify.start_run(&input).await)
}

async fn get_run(State(state): State<AppState>, Path(run_id): Path<String>) -> Result<Json<Value>, ApiError> {
    let apify = client(&state)?;
    relay("Failed to get run", apify.get_run(&run_id).await)
}

async fn dataset(State(state): State<AppState>, Path(dataset_id): Path<String>) -> Result<Json<Value>, ApiError> {
    let apify = client(&state)?;
    relay("Failed to get dataset items", apify.dataset_items(&dataset_id).await)
}

/// Starts the actor and, with `wait`, blocks until it finishes or two minutes pass.
async fn search(State(state): State<AppState>, Json(body): Json<SearchBody>) -> Result<Json<Value>, ApiError> {
    let apify = client(&state)?;
    let input = body.input.unwrap_or_else(|| json!({}));
    let wait = body.wait.then(PollOptions::default);

    let run = apify.run_actor(&input, wait).await.map_err(|err| match err {
        ApifyError::Upstream { status, body } => upstream(status, body),
        ApifyError::MissingRunId => ApiError::server("Missing run id from Apify"),
        other => ApiError::internal("Apify search failed")(other.to_string()),
    })?;

    Ok(Json(match run {
        ActorRun::Started { start, .. } => start,
        ActorRun::Finished { status, run, .. } => json!({ "status": status, "run": run }),
        ActorRun::Succeeded { status, run, items, .. } => json!({ "status": status, "run": run, "items": items }),
        ActorRun::PollTimeout { run_id } => json!({ "status": "POLL_TIMEOUT", "runId": run_id }),
    }))
}
