use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::db::project_story::{models::ProjectStory, queries};
use crate::endpoints::query;
use crate::extract::BearerToken;
use crate::state::AppState;
use crate::stories::{build_stories, Story, MAX_STORIES};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/stories/{username}", get(stories))
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum Stories {
    Cached(Vec<ProjectStory>),
    Fresh(Vec<Story>),
}

/// Unexpired stored stories, else freshly generated ones. Never fails.
async fn stories(State(state): State<AppState>, Path(username): Path<String>, token: BearerToken) -> Json<Stories> {
    let now = Utc::now();

    let user = username.clone();
    match query(&state, "Failed to load stories", move |conn| {
        queries::list_fresh(conn, &user, now, MAX_STORIES as i64)
    })
    .await
    {
        Ok(cached) if !cached.is_empty() => return Json(Stories::Cached(cached)),
        Ok(_) => {}
        Err(err) => warn!(error = %err, "stories cache unavailable"),
    }

    let mut stories = match build_stories(&state.github, &state.summarizer, &username, token.as_deref(), now).await {
        Ok(stories) => stories,
        Err(err) => {
            warn!(%username, error = %err, "stories could not be built");
            return Json(Stories::Fresh(Vec::new()));
        }
    };

    if !stories.is_empty() && state.pool().is_some() {
        let rows: Vec<_> = stories.iter().map(Story::to_row).collect();
        if let Err(err) = query(&state, "Failed to store stories", move |conn| queries::upsert_stories(conn, &rows)).await {
            warn!(error = %err, "stories not persisted");
        }
    }

    stories.truncate(MAX_STORIES);
    Json(Stories::Fresh(stories))
}
