use axum::{extract::State, routing::post, Json, Router};
use interfaces_apify_actors::{ActorRun, ApifyError, PollOptions};
use serde::Serialize;
use serde_json::{json, Value};

use crate::endpoints::apify::{client, upstream};
use crate::error::ApiError;
use crate::extract::BearerToken;
use crate::people::{boost, search_linkedin, GitHubPerson, LinkedInSection, PeopleEnrich, PeopleSearch, COMPANY_WEIGHT, LANGUAGE_WEIGHT};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/people/search", post(search))
        .route("/api/people/enrich", post(enrich))
}

#[derive(Serialize)]
pub struct GitHubSection {
    users: Vec<GitHubPerson>,
}

#[derive(Serialize)]
pub struct PeopleResults {
    linkedin: LinkedInSection,
    github: GitHubSection,
}

/// GitHub company and language searches run alongside the LinkedIn actor.
async fn search(State(state): State<AppState>, token: BearerToken, Json(body): Json<PeopleSearch>) -> Json<PeopleResults> {
    let token = token.as_deref();
    let github = &state.github;

    let by_company = async {
        match body.company() {
            Some(company) => github.search_users_by_company(company, token).await,
            None => Vec::new(),
        }
    };
    let by_language = async {
        match body.lang() {
            Some(lang) => github.search_users_by_language(lang, token).await,
            None => Vec::new(),
        }
    };
    let linkedin = search_linkedin(state.apify.as_ref(), &body);

    let (company_users, language_users, linkedin) = tokio::join!(by_company, by_language, linkedin);

    let users = boost(&[
        (company_users.as_slice(), COMPANY_WEIGHT),
        (language_users.as_slice(), LANGUAGE_WEIGHT),
    ]);

    Json(PeopleResults {
        linkedin,
        github: GitHubSection { users },
    })
}

/// Looks one person up on LinkedIn and waits for the actor's dataset.
async fn enrich(State(state): State<AppState>, Json(body): Json<PeopleEnrich>) -> Result<Json<Value>, ApiError> {
    let apify = client(&state)?;
    let input = body
        .actor_input()
        .ok_or_else(|| ApiError::bad_request("Provide at least one of name, vanity, or company"))?;

    let run = apify
        .run_actor(&input, Some(PollOptions::default()))
        .await
        .map_err(|err| match err {
            ApifyError::Upstream { status, body } => upstream(status, body),
            ApifyError::MissingRunId => ApiError::server("missing run id"),
            other => ApiError::internal("people enrich failed")(other.to_string()),
        })?;

    let items = match &run {
        ActorRun::Succeeded { items, .. } => items.clone(),
        _ => json!([]),
    };
    Ok(Json(json!({
        "status": run.status(),
        "runId": run.run_id(),
        "items": items,
    })))
}
